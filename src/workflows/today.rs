//! Today's dashboard

use chrono::{DateTime, Local, Utc};

use crate::backend::{Backend, SortOrder, WorkoutQuery};
use crate::error::AppResult;
use crate::models::{Identity, WorkoutRecord};
use crate::session::SessionStore;
use crate::workflows::require_session;

#[derive(Debug, Clone, PartialEq)]
pub struct TodaySummary {
    pub identity: Identity,
    /// Newest first
    pub workouts: Vec<WorkoutRecord>,
}

impl TodaySummary {
    /// Sets x reps x weight summed over today's workouts
    pub fn volume(&self) -> f64 {
        self.workouts
            .iter()
            .map(|w| w.weight * f64::from(w.reps) * f64::from(w.sets))
            .sum()
    }
}

/// Start of the local day containing `now`
pub fn local_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now.with_timezone(&Local);
    local
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map(|midnight| midnight.with_timezone(&Utc))
        .unwrap_or(now)
}

pub struct TodayView<'a> {
    backend: &'a dyn Backend,
    sessions: &'a dyn SessionStore,
}

impl<'a> TodayView<'a> {
    pub fn new(backend: &'a dyn Backend, sessions: &'a dyn SessionStore) -> Self {
        Self { backend, sessions }
    }

    pub async fn load(&self) -> AppResult<TodaySummary> {
        self.load_at(Utc::now()).await
    }

    pub async fn load_at(&self, now: DateTime<Utc>) -> AppResult<TodaySummary> {
        let auth = require_session(self.backend, self.sessions).await?;
        let query = WorkoutQuery::all()
            .since(local_midnight(now))
            .order(SortOrder::Descending);
        let workouts = self.backend.list_workouts(&auth.session, &query).await?;
        Ok(TodaySummary {
            identity: auth.identity,
            workouts,
        })
    }
}
