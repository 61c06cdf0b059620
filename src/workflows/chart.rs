//! Per-exercise weight progress over the chart window

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::analytics::{ChartPoint, Progress, chart_points, compute_progress, window_start};
use crate::backend::{Backend, ExerciseOrder, SortOrder, WorkoutQuery};
use crate::error::AppResult;
use crate::models::Exercise;
use crate::session::SessionStore;
use crate::workflows::require_session;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub exercise: String,
    /// Oldest first
    pub points: Vec<ChartPoint>,
    /// `None` when there is nothing meaningful to show
    pub progress: Option<Progress>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub struct ProgressChart<'a> {
    backend: &'a dyn Backend,
    sessions: &'a dyn SessionStore,
}

impl<'a> ProgressChart<'a> {
    pub fn new(backend: &'a dyn Backend, sessions: &'a dyn SessionStore) -> Self {
        Self { backend, sessions }
    }

    /// Exercises to choose from, alphabetical
    pub async fn exercises(&self) -> AppResult<Vec<Exercise>> {
        let auth = require_session(self.backend, self.sessions).await?;
        Ok(self
            .backend
            .list_exercises(&auth.session, ExerciseOrder::Name)
            .await?)
    }

    pub async fn load(&self, exercise: &str) -> AppResult<ChartData> {
        self.load_at(exercise, Utc::now()).await
    }

    pub async fn load_at(&self, exercise: &str, now: DateTime<Utc>) -> AppResult<ChartData> {
        let auth = require_session(self.backend, self.sessions).await?;
        let query = WorkoutQuery::all()
            .exercise(exercise)
            .since(window_start(now))
            .order(SortOrder::Ascending);
        let records = self.backend.list_workouts(&auth.session, &query).await?;

        let points = chart_points(&records);
        let progress = compute_progress(&points);
        debug!(exercise, points = points.len(), "chart loaded");

        Ok(ChartData {
            exercise: exercise.to_string(),
            points,
            progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalBackend;
    use crate::db::tests::signed_in;
    use crate::models::NewWorkout;
    use crate::session::MemorySessionStore;
    use chrono::Duration;

    fn workout(name: &str, weight: f64) -> NewWorkout {
        NewWorkout {
            exercise_name: name.into(),
            weight,
            reps: 5,
            sets: 5,
        }
    }

    #[tokio::test]
    async fn test_window_and_progress() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let session = signed_in(&backend, "a@example.com").await;
        let now = Utc::now();
        for (days, weight) in [(45, 60.0), (20, 100.0), (10, 105.0), (1, 110.0)] {
            backend
                .insert_workout_at(&session, &workout("Squat", weight), now - Duration::days(days))
                .await
                .unwrap();
        }
        backend
            .insert_workout_at(&session, &workout("Bench Press", 200.0), now)
            .await
            .unwrap();

        let sessions = MemorySessionStore::with_session(session);
        let data = ProgressChart::new(&backend, &sessions)
            .load_at("Squat", now)
            .await
            .unwrap();

        let weights: Vec<f64> = data.points.iter().map(|p| p.weight).collect();
        assert_eq!(weights, vec![100.0, 105.0, 110.0]);
        let progress = data.progress.unwrap();
        assert_eq!(progress.percent_label(), "+10.0%");
    }

    #[tokio::test]
    async fn test_single_point_has_no_progress() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let session = signed_in(&backend, "a@example.com").await;
        backend
            .insert_workout_at(&session, &workout("Squat", 100.0), Utc::now())
            .await
            .unwrap();

        let sessions = MemorySessionStore::with_session(session);
        let data = ProgressChart::new(&backend, &sessions)
            .load("Squat")
            .await
            .unwrap();
        assert_eq!(data.points.len(), 1);
        assert!(data.progress.is_none());
    }

    #[tokio::test]
    async fn test_exercises_alphabetical() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let sessions = MemorySessionStore::with_session(signed_in(&backend, "a@example.com").await);
        let names: Vec<String> = ProgressChart::new(&backend, &sessions)
            .exercises()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
