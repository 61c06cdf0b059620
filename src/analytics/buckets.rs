//! Relative-date buckets for history listings

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::models::{BodyMeasurement, WorkoutRecord};

/// Heading a record is listed under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BucketLabel {
    Today,
    Yesterday,
    /// 2 to 6 whole days back
    DaysAgo(i64),
    /// Local calendar date, for anything a week or older
    Date(NaiveDate),
}

impl fmt::Display for BucketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketLabel::Today => f.write_str("today"),
            BucketLabel::Yesterday => f.write_str("yesterday"),
            BucketLabel::DaysAgo(n) => write!(f, "{} days ago", n),
            BucketLabel::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Label for a timestamp relative to `now`.
///
/// The day count is the raw difference truncated to whole days, not a
/// comparison of calendar days: 23 hours ago is still "today".
pub fn bucket_label(created_at: DateTime<Utc>, now: DateTime<Utc>) -> BucketLabel {
    match (now - created_at).num_days() {
        // Future timestamps (clock skew) count as today
        d if d <= 0 => BucketLabel::Today,
        1 => BucketLabel::Yesterday,
        d @ 2..=6 => BucketLabel::DaysAgo(d),
        _ => BucketLabel::Date(created_at.with_timezone(&Local).date_naive()),
    }
}

/// Anything that can be bucketed by creation time
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

impl Timestamped for WorkoutRecord {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for BodyMeasurement {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup<T> {
    pub label: BucketLabel,
    pub items: Vec<T>,
}

/// Group records under their bucket label.
///
/// Groups come out in the order their label is first seen and each group
/// keeps the order records were received in.
pub fn group_by_bucket<T: Timestamped>(items: Vec<T>, now: DateTime<Utc>) -> Vec<DateGroup<T>> {
    let mut groups: Vec<DateGroup<T>> = Vec::new();
    let mut index: HashMap<BucketLabel, usize> = HashMap::new();

    for item in items {
        let label = bucket_label(item.created_at(), now);
        match index.get(&label) {
            Some(&i) => groups[i].items.push(item),
            None => {
                index.insert(label.clone(), groups.len());
                groups.push(DateGroup {
                    label,
                    items: vec![item],
                });
            }
        }
    }

    groups
}
