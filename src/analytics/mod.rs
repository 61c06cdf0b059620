//! Analytics module - shaping records for display
//!
//! Features:
//! - Relative-date buckets for history
//! - First-vs-last weight progress for charts

pub mod buckets;
pub mod progress;

pub use buckets::{BucketLabel, DateGroup, Timestamped, bucket_label, group_by_bucket};
pub use progress::{ChartPoint, Progress, chart_points, compute_progress, window_start};
