//! Workout record entry

use tracing::info;

use crate::backend::{Backend, ExerciseOrder};
use crate::error::AppResult;
use crate::models::{Exercise, WorkoutRecord};
use crate::session::SessionStore;
use crate::validation::WorkoutForm;
use crate::workflows::require_session;

pub struct RecordEntry<'a> {
    backend: &'a dyn Backend,
    sessions: &'a dyn SessionStore,
}

impl<'a> RecordEntry<'a> {
    pub fn new(backend: &'a dyn Backend, sessions: &'a dyn SessionStore) -> Self {
        Self { backend, sessions }
    }

    /// Exercise catalog grouped by category for the picker
    pub async fn exercises(&self) -> AppResult<Vec<Exercise>> {
        let auth = require_session(self.backend, self.sessions).await?;
        Ok(self
            .backend
            .list_exercises(&auth.session, ExerciseOrder::Category)
            .await?)
    }

    /// Validate the form and store one record.
    ///
    /// Nothing is sent unless the whole form is valid.
    pub async fn submit(&self, form: &WorkoutForm) -> AppResult<WorkoutRecord> {
        let workout = form.validate()?;
        let auth = require_session(self.backend, self.sessions).await?;
        let record = self.backend.insert_workout(&auth.session, &workout).await?;
        info!(
            id = %record.id,
            exercise = %record.exercise_name,
            weight = record.weight,
            "workout recorded"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DataStore, SupabaseClient, SupabaseConfig, WorkoutQuery};
    use crate::db::LocalBackend;
    use crate::db::tests::signed_in;
    use crate::error::AppError;
    use crate::models::{AuthSession, Identity};
    use crate::session::MemorySessionStore;
    use crate::validation::ValidationError;
    use url::Url;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form(exercise: &str, weight: &str, reps: &str, sets: &str) -> WorkoutForm {
        WorkoutForm {
            exercise: exercise.into(),
            weight: weight.into(),
            reps: reps.into(),
            sets: sets.into(),
        }
    }

    #[tokio::test]
    async fn test_valid_form_inserts_owned_record() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let session = signed_in(&backend, "a@example.com").await;
        let sessions = MemorySessionStore::with_session(session.clone());
        let entry = RecordEntry::new(&backend, &sessions);

        let record = entry
            .submit(&form("Bench Press", "80", "10", "4"))
            .await
            .unwrap();
        assert_eq!(record.owner, session.user.id);
        assert_eq!(record.reps, 10);

        let stored = backend
            .list_workouts(&session, &WorkoutQuery::all())
            .await
            .unwrap();
        assert_eq!(stored, vec![record]);
    }

    #[tokio::test]
    async fn test_invalid_form_writes_nothing() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let session = signed_in(&backend, "a@example.com").await;
        let sessions = MemorySessionStore::with_session(session.clone());
        let entry = RecordEntry::new(&backend, &sessions);

        let err = entry
            .submit(&form("Bench Press", "1200", "10", "4"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::WeightTooHigh(_))
        ));

        let stored = backend
            .list_workouts(&session, &WorkoutQuery::all())
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_submit_without_session() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let sessions = MemorySessionStore::default();
        let entry = RecordEntry::new(&backend, &sessions);

        let err = entry
            .submit(&form("Squat", "100", "5", "5"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthRequired));
    }

    #[tokio::test]
    async fn test_exercises_grouped_by_category() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let session = signed_in(&backend, "a@example.com").await;
        let sessions = MemorySessionStore::with_session(session);
        let entry = RecordEntry::new(&backend, &sessions);

        let exercises = entry.exercises().await.unwrap();
        assert!(!exercises.is_empty());
        assert!(exercises.windows(2).all(|w| w[0].category <= w[1].category));
    }

    #[tokio::test]
    async fn test_hosted_owner_is_verified_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "real-user", "email": "me@example.com"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/workouts"))
            .and(body_partial_json(serde_json::json!({"user_id": "real-user"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([
                {
                    "id": "w1",
                    "user_id": "real-user",
                    "exercise_name": "Squat",
                    "weight": 100,
                    "reps": 5,
                    "sets": 5,
                    "created_at": "2024-03-02T08:00:00+00:00"
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let backend = SupabaseClient::new(SupabaseConfig::new(
            Url::parse(&server.uri()).unwrap(),
            "anon-key",
        ))
        .unwrap();
        let sessions = MemorySessionStore::with_session(AuthSession {
            access_token: "token-1".into(),
            refresh_token: None,
            user: Identity {
                id: "someone-else".into(),
                email: "me@example.com".into(),
            },
        });

        let record = RecordEntry::new(&backend, &sessions)
            .submit(&form("Squat", "100", "5", "5"))
            .await
            .unwrap();
        assert_eq!(record.owner, "real-user");
    }
}
