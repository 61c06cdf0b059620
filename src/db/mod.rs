//! Database module - embedded SQLite backend
//!
//! Implements the same identity/data contracts as the hosted backend so the
//! app can run offline. Every data call resolves the owner from the access
//! token, never from the caller.

use std::path::Path;

use anyhow::Result;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::{
    BackendResult, DataStore, ExerciseOrder, IdentityService, WorkoutQuery,
};
use crate::error::BackendError;
use crate::exercises::{BASE_EXERCISES, DEFAULT_PLANS};
use crate::models::{
    AuthSession, BodyMeasurement, Exercise, Identity, NewBodyMeasurement, NewWorkout, PlanDay,
    SignUpResponse, WorkoutPlan, WorkoutRecord, parse_plan_days,
};

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// SQLite-backed identity service and data store
pub struct LocalBackend {
    conn: Mutex<Connection>,
    require_confirmation: bool,
}

/// Fixed-width UTC timestamps so text comparison matches time order
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Truncate to the precision `timestamp` keeps
fn storable(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}

fn parse_timestamp(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_days(idx: usize, text: &str) -> rusqlite::Result<Vec<PlanDay>> {
    serde_json::from_str(text).map(parse_plan_days).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn workout_from_row(row: &Row) -> rusqlite::Result<WorkoutRecord> {
    let created: String = row.get(6)?;
    Ok(WorkoutRecord {
        id: row.get(0)?,
        owner: row.get(1)?,
        exercise_name: row.get(2)?,
        weight: row.get(3)?,
        reps: row.get(4)?,
        sets: row.get(5)?,
        created_at: parse_timestamp(6, &created)?,
    })
}

fn measurement_from_row(row: &Row) -> rusqlite::Result<BodyMeasurement> {
    let created: String = row.get(6)?;
    Ok(BodyMeasurement {
        id: row.get(0)?,
        owner: row.get(1)?,
        weight: row.get(2)?,
        body_fat_percent: row.get(3)?,
        muscle_mass: row.get(4)?,
        note: row.get(5)?,
        created_at: parse_timestamp(6, &created)?,
    })
}

/// Hashing runs on the blocking pool, outside the connection lock
async fn hash_password(password: &str) -> BackendResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| BackendError::Storage(format!("hash password: {}", e)))
    })
    .await
    .map_err(|e| BackendError::Storage(format!("hash task failed: {}", e)))?
}

async fn verify_password(password: &str, hash: String) -> bool {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        PasswordHash::new(&hash)
            .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
            .unwrap_or(false)
    })
    .await
    .unwrap_or(false)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Resolve the identity an access token belongs to
fn identity_for_token(conn: &Connection, token: &str) -> BackendResult<Identity> {
    conn.query_row(
        "SELECT u.id, u.email FROM sessions s JOIN users u ON u.id = s.user_id WHERE s.token = ?1",
        params![token],
        |row| {
            Ok(Identity {
                id: row.get(0)?,
                email: row.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| BackendError::Unauthorized("invalid or expired session".into()))
}

fn issue_session(conn: &Connection, user: Identity) -> BackendResult<AuthSession> {
    let token = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![token, user.id, timestamp(Utc::now())],
    )?;
    Ok(AuthSession {
        access_token: token,
        refresh_token: None,
        user,
    })
}

impl LocalBackend {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Throwaway database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        seed_catalog(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            require_confirmation: false,
        })
    }

    /// Hold new accounts in a pending state until [`Self::confirm_email`]
    pub fn require_email_confirmation(mut self, required: bool) -> Self {
        self.require_confirmation = required;
        self
    }

    /// Mark an account's email as confirmed. Returns false if unknown.
    pub async fn confirm_email(&self, email: &str) -> BackendResult<bool> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE users SET confirmed = 1 WHERE email = ?1",
            params![normalize_email(email)],
        )?;
        Ok(changed > 0)
    }

    pub(crate) async fn insert_workout_at(
        &self,
        session: &AuthSession,
        workout: &NewWorkout,
        created_at: DateTime<Utc>,
    ) -> BackendResult<WorkoutRecord> {
        let conn = self.conn.lock().await;
        let owner = identity_for_token(&conn, &session.access_token)?;
        let record = WorkoutRecord {
            id: Uuid::new_v4().to_string(),
            owner: owner.id,
            exercise_name: workout.exercise_name.clone(),
            weight: workout.weight,
            reps: workout.reps,
            sets: workout.sets,
            created_at: storable(created_at),
        };
        conn.execute(
            "INSERT INTO workouts (id, user_id, exercise_name, weight, reps, sets, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.owner,
                record.exercise_name,
                record.weight,
                record.reps,
                record.sets,
                timestamp(record.created_at),
            ],
        )?;
        debug!(id = %record.id, "workout stored");
        Ok(record)
    }

    pub(crate) async fn insert_body_measurement_at(
        &self,
        session: &AuthSession,
        measurement: &NewBodyMeasurement,
        created_at: DateTime<Utc>,
    ) -> BackendResult<BodyMeasurement> {
        let conn = self.conn.lock().await;
        let owner = identity_for_token(&conn, &session.access_token)?;
        let record = BodyMeasurement {
            id: Uuid::new_v4().to_string(),
            owner: owner.id,
            weight: measurement.weight,
            body_fat_percent: measurement.body_fat_percent,
            muscle_mass: measurement.muscle_mass,
            note: measurement.note.clone(),
            created_at: storable(created_at),
        };
        conn.execute(
            "INSERT INTO body_measurements (id, user_id, weight, body_fat, muscle_mass, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.owner,
                record.weight,
                record.body_fat_percent,
                record.muscle_mass,
                record.note,
                timestamp(record.created_at),
            ],
        )?;
        Ok(record)
    }
}

/// Initialize database schema
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            confirmed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS exercises (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS workouts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            exercise_name TEXT NOT NULL,
            weight REAL NOT NULL,
            reps INTEGER NOT NULL,
            sets INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_workouts_owner_time ON workouts (user_id, created_at);
        CREATE TABLE IF NOT EXISTS body_measurements (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            weight REAL NOT NULL,
            body_fat REAL,
            muscle_mass REAL,
            notes TEXT,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS workout_plans (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            difficulty TEXT NOT NULL,
            duration_weeks INTEGER,
            exercises TEXT NOT NULL DEFAULT '[]'
        );",
    )?;
    Ok(())
}

/// Insert the built-in catalog and plans; existing rows are left alone
fn seed_catalog(conn: &Connection) -> Result<()> {
    for ex in BASE_EXERCISES {
        conn.execute(
            "INSERT OR IGNORE INTO exercises (id, name, category) VALUES (?1, ?2, ?3)",
            params![ex.id, ex.name, ex.category.label()],
        )?;
    }
    for plan in DEFAULT_PLANS {
        let days = serde_json::to_string(&plan.plan_days())?;
        conn.execute(
            "INSERT OR IGNORE INTO workout_plans (id, name, description, difficulty, duration_weeks, exercises)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                plan.id,
                plan.name,
                plan.description,
                plan.difficulty,
                plan.duration_weeks,
                days
            ],
        )?;
    }
    Ok(())
}

#[async_trait]
impl IdentityService for LocalBackend {
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpResponse> {
        let email = normalize_email(email);
        let password_hash = hash_password(password).await?;
        let conn = self.conn.lock().await;

        let taken: Option<String> = conn
            .query_row("SELECT id FROM users WHERE email = ?1", params![email], |row| row.get(0))
            .optional()?;
        if taken.is_some() {
            return Err(BackendError::Api {
                status: 422,
                message: "User already registered".into(),
            });
        }

        let user = Identity {
            id: Uuid::new_v4().to_string(),
            email,
        };
        conn.execute(
            "INSERT INTO users (id, email, password_hash, confirmed, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.email,
                password_hash,
                !self.require_confirmation,
                timestamp(Utc::now())
            ],
        )?;
        info!(user = %user.id, pending = self.require_confirmation, "local account created");

        if self.require_confirmation {
            return Ok(SignUpResponse { user, session: None });
        }
        let session = issue_session(&conn, user.clone())?;
        Ok(SignUpResponse {
            user,
            session: Some(session),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let email = normalize_email(email);
        let found: Option<(String, String, bool)> = self
            .conn
            .lock()
            .await
            .query_row(
                "SELECT id, password_hash, confirmed FROM users WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let invalid = || BackendError::Api {
            status: 400,
            message: INVALID_CREDENTIALS.into(),
        };
        let (id, hash, confirmed) = found.ok_or_else(invalid)?;
        if !verify_password(password, hash).await {
            return Err(invalid());
        }
        if !confirmed {
            return Err(BackendError::EmailNotConfirmed);
        }

        let conn = self.conn.lock().await;
        issue_session(&conn, Identity { id, email })
    }

    /// Local access tokens do not expire, so nothing is ever refreshed
    async fn refresh_session(&self, _refresh_token: &str) -> BackendResult<AuthSession> {
        Err(BackendError::Unauthorized(
            "the embedded backend does not issue refresh tokens".into(),
        ))
    }

    async fn sign_out(&self, session: &AuthSession) -> BackendResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM sessions WHERE token = ?1",
            params![session.access_token],
        )?;
        Ok(())
    }

    async fn current_identity(&self, session: &AuthSession) -> BackendResult<Identity> {
        let conn = self.conn.lock().await;
        identity_for_token(&conn, &session.access_token)
    }
}

#[async_trait]
impl DataStore for LocalBackend {
    async fn list_exercises(
        &self,
        session: &AuthSession,
        order: ExerciseOrder,
    ) -> BackendResult<Vec<Exercise>> {
        let conn = self.conn.lock().await;
        identity_for_token(&conn, &session.access_token)?;

        let sql = format!(
            "SELECT id, name, category FROM exercises ORDER BY {} ASC, name ASC",
            order.column()
        );
        let mut stmt = conn.prepare(&sql)?;
        let exercises = stmt
            .query_map([], |row| {
                Ok(Exercise {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    category: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    async fn insert_workout(
        &self,
        session: &AuthSession,
        workout: &NewWorkout,
    ) -> BackendResult<WorkoutRecord> {
        self.insert_workout_at(session, workout, Utc::now()).await
    }

    async fn list_workouts(
        &self,
        session: &AuthSession,
        query: &WorkoutQuery,
    ) -> BackendResult<Vec<WorkoutRecord>> {
        let conn = self.conn.lock().await;
        let owner = identity_for_token(&conn, &session.access_token)?;

        let sql = format!(
            "SELECT id, user_id, exercise_name, weight, reps, sets, created_at FROM workouts
             WHERE user_id = ?1
               AND (?2 IS NULL OR exercise_name = ?2)
               AND (?3 IS NULL OR created_at >= ?3)
             ORDER BY created_at {0}, rowid {0}",
            query.order.as_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![owner.id, query.exercise_name, query.since.map(timestamp)],
                workout_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn insert_body_measurement(
        &self,
        session: &AuthSession,
        measurement: &NewBodyMeasurement,
    ) -> BackendResult<BodyMeasurement> {
        self.insert_body_measurement_at(session, measurement, Utc::now())
            .await
    }

    async fn list_body_measurements(
        &self,
        session: &AuthSession,
        limit: usize,
    ) -> BackendResult<Vec<BodyMeasurement>> {
        let conn = self.conn.lock().await;
        let owner = identity_for_token(&conn, &session.access_token)?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, weight, body_fat, muscle_mass, notes, created_at FROM body_measurements
             WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![owner.id, limit as i64], measurement_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn list_plans(&self, session: &AuthSession) -> BackendResult<Vec<WorkoutPlan>> {
        let conn = self.conn.lock().await;
        identity_for_token(&conn, &session.access_token)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, description, difficulty, duration_weeks, exercises FROM workout_plans
             ORDER BY difficulty ASC, name ASC",
        )?;
        let plans = stmt
            .query_map([], |row| {
                let difficulty: String = row.get(3)?;
                let days: String = row.get(5)?;
                Ok(WorkoutPlan {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    difficulty: difficulty.into(),
                    duration_weeks: row.get(4)?,
                    days: parse_days(5, &days)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(plans)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::backend::SortOrder;
    use chrono::{Duration, TimeZone};

    pub(crate) async fn signed_in(backend: &LocalBackend, email: &str) -> AuthSession {
        backend
            .sign_up(email, "secret-pw")
            .await
            .unwrap()
            .session
            .unwrap()
    }

    fn workout(name: &str, weight: f64) -> NewWorkout {
        NewWorkout {
            exercise_name: name.into(),
            weight,
            reps: 5,
            sets: 3,
        }
    }

    #[tokio::test]
    async fn test_catalog_seeded_and_ordered() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let session = signed_in(&backend, "a@example.com").await;

        let by_category = backend
            .list_exercises(&session, ExerciseOrder::Category)
            .await
            .unwrap();
        assert_eq!(by_category.len(), BASE_EXERCISES.len());
        let categories: Vec<_> = by_category.iter().map(|e| e.category.clone()).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);

        let plans = backend.list_plans(&session).await.unwrap();
        assert_eq!(plans.len(), DEFAULT_PLANS.len());
        // Text order of the difficulty labels, same as the hosted store.
        assert_eq!(plans[0].difficulty.label(), "Advanced");
        assert!(!plans[0].days.is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_checks_password() {
        let backend = LocalBackend::open_in_memory().unwrap();
        signed_in(&backend, "a@example.com").await;

        let ok = backend.sign_in("A@Example.com ", "secret-pw").await.unwrap();
        assert_eq!(ok.user.email, "a@example.com");

        let err = backend.sign_in("a@example.com", "wrong-pw").await.unwrap_err();
        assert!(matches!(err, BackendError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_rejected() {
        let backend = LocalBackend::open_in_memory().unwrap();
        signed_in(&backend, "a@example.com").await;
        let err = backend.sign_up("a@example.com", "other-pw").await.unwrap_err();
        assert_eq!(err.to_string(), "User already registered");
    }

    #[tokio::test]
    async fn test_pending_account_until_confirmed() {
        let backend = LocalBackend::open_in_memory()
            .unwrap()
            .require_email_confirmation(true);

        let resp = backend.sign_up("b@example.com", "secret-pw").await.unwrap();
        assert!(resp.session.is_none());

        let err = backend.sign_in("b@example.com", "secret-pw").await.unwrap_err();
        assert!(matches!(err, BackendError::EmailNotConfirmed));

        assert!(backend.confirm_email("b@example.com").await.unwrap());
        assert!(backend.sign_in("b@example.com", "secret-pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let session = signed_in(&backend, "a@example.com").await;
        backend.sign_out(&session).await.unwrap();

        let err = backend.current_identity(&session).await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_reads_scoped_to_owner() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let alice = signed_in(&backend, "alice@example.com").await;
        let mut bob = signed_in(&backend, "bob@example.com").await;

        backend.insert_workout(&alice, &workout("Squat", 100.0)).await.unwrap();

        // A forged user id on bob's token must not reach alice's rows.
        bob.user.id = alice.user.id.clone();
        let rows = backend.list_workouts(&bob, &WorkoutQuery::all()).await.unwrap();
        assert!(rows.is_empty());

        let record = backend.insert_workout(&bob, &workout("Squat", 60.0)).await.unwrap();
        assert_ne!(record.owner, alice.user.id);
    }

    #[tokio::test]
    async fn test_workout_filters_and_order() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let session = signed_in(&backend, "a@example.com").await;
        let now = Utc::now();

        for (name, weight, days_ago) in [
            ("Squat", 90.0, 40),
            ("Squat", 100.0, 10),
            ("Bench Press", 70.0, 5),
            ("Squat", 110.0, 1),
        ] {
            backend
                .insert_workout_at(&session, &workout(name, weight), now - Duration::days(days_ago))
                .await
                .unwrap();
        }

        let all = backend.list_workouts(&session, &WorkoutQuery::all()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].weight, 110.0);

        let query = WorkoutQuery::all()
            .exercise("Squat")
            .since(now - Duration::days(30))
            .order(SortOrder::Ascending);
        let squats = backend.list_workouts(&session, &query).await.unwrap();
        let weights: Vec<_> = squats.iter().map(|w| w.weight).collect();
        assert_eq!(weights, vec![100.0, 110.0]);
    }

    #[tokio::test]
    async fn test_body_measurements_newest_first_with_limit() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let session = signed_in(&backend, "a@example.com").await;
        let now = Utc::now();

        for i in 0..35 {
            let m = NewBodyMeasurement {
                weight: 70.0 + i as f64 * 0.1,
                body_fat_percent: None,
                muscle_mass: None,
                note: None,
            };
            backend
                .insert_body_measurement_at(&session, &m, now - Duration::hours(35 - i))
                .await
                .unwrap();
        }

        let rows = backend.list_body_measurements(&session, 30).await.unwrap();
        assert_eq!(rows.len(), 30);
        assert!(rows[0].created_at > rows[1].created_at);
        assert!((rows[0].weight - 73.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_data_calls_require_valid_token() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let forged = AuthSession {
            access_token: "made-up".into(),
            refresh_token: None,
            user: Identity {
                id: "x".into(),
                email: "x@example.com".into(),
            },
        };
        let err = backend.list_plans(&forged).await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_inserted_records_equal_stored_rows() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let session = signed_in(&backend, "a@example.com").await;

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap() + Duration::nanoseconds(123_456_789);
        let record = backend
            .insert_workout_at(&session, &workout("Squat", 100.0), at)
            .await
            .unwrap();
        let stored = backend.list_workouts(&session, &WorkoutQuery::all()).await.unwrap();
        assert_eq!(stored, vec![record.clone()]);
        assert_eq!(record.created_at.timestamp_subsec_nanos(), 123_456_000);

        let m = NewBodyMeasurement {
            weight: 80.0,
            body_fat_percent: Some(15.0),
            muscle_mass: None,
            note: None,
        };
        let measurement = backend.insert_body_measurement_at(&session, &m, at).await.unwrap();
        let listed = backend.list_body_measurements(&session, 30).await.unwrap();
        assert_eq!(listed, vec![measurement]);
    }

    #[tokio::test]
    async fn test_corrupt_plan_days_is_an_error() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let session = signed_in(&backend, "a@example.com").await;
        backend
            .conn
            .lock()
            .await
            .execute(
                "UPDATE workout_plans SET exercises = '{not json' WHERE id = 'upper_lower'",
                [],
            )
            .unwrap();

        let err = backend.list_plans(&session).await.unwrap_err();
        assert!(matches!(err, BackendError::Storage(_)));
    }

    #[tokio::test]
    async fn test_concurrent_sign_ins_share_connection() {
        let backend = LocalBackend::open_in_memory().unwrap();
        signed_in(&backend, "a@example.com").await;
        let session = signed_in(&backend, "b@example.com").await;

        let (a, b, plans) = tokio::join!(
            backend.sign_in("a@example.com", "secret-pw"),
            backend.sign_in("b@example.com", "wrong-pw"),
            backend.list_exercises(&session, ExerciseOrder::Name),
        );
        assert_eq!(a.unwrap().user.email, "a@example.com");
        assert!(matches!(b.unwrap_err(), BackendError::Api { status: 400, .. }));
        assert!(!plans.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_not_supported_locally() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let err = backend.refresh_session("anything").await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(_)));
    }
}
