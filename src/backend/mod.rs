//! Backend contracts - identity service and data store
//!
//! Two implementations exist: [`SupabaseClient`] talks to a hosted
//! GoTrue/PostgREST backend over HTTP, and [`crate::db::LocalBackend`] keeps
//! everything in a SQLite file. Workflows only see the traits.

pub mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::BackendError;
use crate::models::{
    AuthSession, BodyMeasurement, Exercise, Identity, NewBodyMeasurement, NewWorkout,
    SignUpResponse, WorkoutPlan, WorkoutRecord,
};

pub use supabase::{SupabaseClient, SupabaseConfig};

pub type BackendResult<T> = Result<T, BackendError>;

/// Maximum number of body measurements listed at once
pub const BODY_MEASUREMENT_LIMIT: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn as_postgrest(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Column the exercise catalog is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseOrder {
    Category,
    Name,
}

impl ExerciseOrder {
    pub fn column(&self) -> &'static str {
        match self {
            ExerciseOrder::Category => "category",
            ExerciseOrder::Name => "name",
        }
    }
}

/// Filter for workout reads. Owner scoping is implied by the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutQuery {
    pub exercise_name: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub order: SortOrder,
}

impl WorkoutQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn exercise(mut self, name: impl Into<String>) -> Self {
        self.exercise_name = Some(name.into());
        self
    }

    pub fn since(mut self, threshold: DateTime<Utc>) -> Self {
        self.since = Some(threshold);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

/// Credential verification and session issuance
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpResponse>;

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession>;

    async fn sign_out(&self, session: &AuthSession) -> BackendResult<()>;

    /// Trade a refresh token for a new session once the access token expired
    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<AuthSession>;

    /// Resolve the identity behind a session, failing with
    /// [`BackendError::Unauthorized`] if the token is no longer valid
    async fn current_identity(&self, session: &AuthSession) -> BackendResult<Identity>;
}

/// Table-like collections scoped to the session's identity
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn list_exercises(
        &self,
        session: &AuthSession,
        order: ExerciseOrder,
    ) -> BackendResult<Vec<Exercise>>;

    async fn insert_workout(
        &self,
        session: &AuthSession,
        workout: &NewWorkout,
    ) -> BackendResult<WorkoutRecord>;

    async fn list_workouts(
        &self,
        session: &AuthSession,
        query: &WorkoutQuery,
    ) -> BackendResult<Vec<WorkoutRecord>>;

    async fn insert_body_measurement(
        &self,
        session: &AuthSession,
        measurement: &NewBodyMeasurement,
    ) -> BackendResult<BodyMeasurement>;

    /// Newest first, at most `limit` rows
    async fn list_body_measurements(
        &self,
        session: &AuthSession,
        limit: usize,
    ) -> BackendResult<Vec<BodyMeasurement>>;

    /// Ordered by difficulty label
    async fn list_plans(&self, session: &AuthSession) -> BackendResult<Vec<WorkoutPlan>>;
}

/// Everything a workflow needs from the outside world
pub trait Backend: IdentityService + DataStore {}

impl<T: IdentityService + DataStore> Backend for T {}
