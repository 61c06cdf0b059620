//! Workout history grouped by relative date

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::analytics::{DateGroup, group_by_bucket};
use crate::backend::{Backend, WorkoutQuery};
use crate::error::AppResult;
use crate::models::WorkoutRecord;
use crate::session::SessionStore;
use crate::share::{ClipboardSink, copy_to_clipboard, copy_with_fallback, share_text};
use crate::workflows::require_session;

pub struct HistoryListing<'a> {
    backend: &'a dyn Backend,
    sessions: &'a dyn SessionStore,
}

impl<'a> HistoryListing<'a> {
    pub fn new(backend: &'a dyn Backend, sessions: &'a dyn SessionStore) -> Self {
        Self { backend, sessions }
    }

    pub async fn load(&self) -> AppResult<Vec<DateGroup<WorkoutRecord>>> {
        self.load_at(Utc::now()).await
    }

    /// All of the user's records, newest first, bucketed relative to `now`
    pub async fn load_at(&self, now: DateTime<Utc>) -> AppResult<Vec<DateGroup<WorkoutRecord>>> {
        let auth = require_session(self.backend, self.sessions).await?;
        let records = self
            .backend
            .list_workouts(&auth.session, &WorkoutQuery::all())
            .await?;
        debug!(count = records.len(), "history loaded");
        Ok(group_by_bucket(records, now))
    }

    /// Look up one of the user's records by id
    pub async fn find(&self, id: &str) -> AppResult<Option<WorkoutRecord>> {
        let auth = require_session(self.backend, self.sessions).await?;
        let records = self
            .backend
            .list_workouts(&auth.session, &WorkoutQuery::all())
            .await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }
}

/// Copy a record's share text to the clipboard. Reports success, never fails.
pub fn share_record(record: &WorkoutRecord) -> bool {
    let copied = copy_to_clipboard(&share_text(record));
    info!(id = %record.id, copied, "share text copied");
    copied
}

/// Same as [`share_record`] with explicit clipboard sinks
pub fn share_record_with(
    record: &WorkoutRecord,
    primary: &dyn ClipboardSink,
    fallback: &dyn ClipboardSink,
) -> bool {
    copy_with_fallback(primary, fallback, &share_text(record))
}
