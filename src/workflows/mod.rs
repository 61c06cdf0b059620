//! Workflows - one per screen / command
//!
//! Every workflow runs the session guard first and talks to the backend only
//! through the [`crate::backend::Backend`] traits.

pub mod auth;
pub mod body;
pub mod chart;
pub mod guard;
pub mod history;
pub mod plans;
pub mod record;
pub mod today;

pub use auth::{AuthFlow, SignUpOutcome};
pub use body::BodyEntry;
pub use chart::{ChartData, ProgressChart};
pub use guard::{Authenticated, require_session};
pub use history::{HistoryListing, share_record, share_record_with};
pub use plans::PlanBrowser;
pub use record::RecordEntry;
pub use today::{TodaySummary, TodayView, local_midnight};
