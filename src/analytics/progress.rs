//! Weight progress over a time-ordered series

use chrono::{DateTime, Duration, Local, Utc};

use crate::models::WorkoutRecord;

/// Days of history the progress chart covers
pub const CHART_WINDOW_DAYS: i64 = 30;

/// Start of the chart window ending at `now`
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(CHART_WINDOW_DAYS)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub at: DateTime<Utc>,
    pub weight: f64,
}

impl ChartPoint {
    /// Axis label, local month/day
    pub fn label(&self) -> String {
        self.at.with_timezone(&Local).format("%m/%d").to_string()
    }
}

/// Chart series from records already sorted oldest first
pub fn chart_points(records: &[WorkoutRecord]) -> Vec<ChartPoint> {
    records
        .iter()
        .map(|r| ChartPoint {
            at: r.created_at,
            weight: r.weight,
        })
        .collect()
}

/// First-vs-last change of a series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub delta: f64,
    pub percent: f64,
}

impl Progress {
    fn sign(&self) -> &'static str {
        if self.delta >= 0.0 { "+" } else { "" }
    }

    /// e.g. "+10.0%"
    pub fn percent_label(&self) -> String {
        format!("{}{:.1}%", self.sign(), self.percent)
    }

    /// e.g. "+10kg"
    pub fn delta_label(&self) -> String {
        let rounded = (self.delta * 100.0).round() / 100.0;
        format!("{}{}kg", self.sign(), rounded)
    }
}

/// Progress between the first and last point.
///
/// `None` when there are fewer than two points or the first weight is zero,
/// since no meaningful percentage exists then.
pub fn compute_progress(points: &[ChartPoint]) -> Option<Progress> {
    if points.len() < 2 {
        return None;
    }
    let first = points.first()?.weight;
    let last = points.last()?.weight;
    if first == 0.0 {
        return None;
    }

    let delta = last - first;
    let percent = delta / first * 100.0;
    percent.is_finite().then_some(Progress { delta, percent })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn points(weights: &[f64]) -> Vec<ChartPoint> {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| ChartPoint {
                at: start + Duration::days(i as i64),
                weight: *w,
            })
            .collect()
    }

    #[test]
    fn test_ten_percent_gain() {
        let p = compute_progress(&points(&[100.0, 110.0])).unwrap();
        assert_eq!(p.delta, 10.0);
        assert_eq!(p.percent_label(), "+10.0%");
        assert_eq!(p.delta_label(), "+10kg");
    }

    #[test]
    fn test_needs_two_points() {
        assert!(compute_progress(&[]).is_none());
        assert!(compute_progress(&points(&[80.0])).is_none());
    }

    #[test]
    fn test_only_first_and_last_matter() {
        let p = compute_progress(&points(&[80.0, 200.0, 60.0])).unwrap();
        assert_eq!(p.percent_label(), "-25.0%");
        assert_eq!(p.delta_label(), "-20kg");
    }

    #[test]
    fn test_no_change_is_positive_zero() {
        let p = compute_progress(&points(&[82.5, 82.5])).unwrap();
        assert_eq!(p.percent_label(), "+0.0%");
    }

    #[test]
    fn test_zero_first_weight_is_undefined() {
        assert!(compute_progress(&points(&[0.0, 50.0])).is_none());
    }

    #[test]
    fn test_rounding_one_decimal() {
        let p = compute_progress(&points(&[60.0, 62.5])).unwrap();
        assert_eq!(p.percent_label(), "+4.2%");
        assert_eq!(p.delta_label(), "+2.5kg");
    }

    #[test]
    fn test_window_start() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        assert_eq!(window_start(now), Utc.with_ymd_and_hms(2024, 5, 31, 0, 0, 0).unwrap());
    }
}
