//! Plan browser - predefined plans, at most one expanded

use tracing::debug;

use crate::backend::Backend;
use crate::error::AppResult;
use crate::models::WorkoutPlan;
use crate::session::SessionStore;
use crate::workflows::require_session;

#[derive(Debug, Clone, Default)]
pub struct PlanBrowser {
    plans: Vec<WorkoutPlan>,
    expanded: Option<usize>,
}

impl PlanBrowser {
    /// Fetch the plans. Expansion is reset.
    pub async fn load(
        &mut self,
        backend: &dyn Backend,
        sessions: &dyn SessionStore,
    ) -> AppResult<()> {
        let auth = require_session(backend, sessions).await?;
        self.plans = backend.list_plans(&auth.session).await?;
        self.expanded = None;
        debug!(count = self.plans.len(), "plans loaded");
        Ok(())
    }

    pub fn plans(&self) -> &[WorkoutPlan] {
        &self.plans
    }

    /// Expand the plan whose id or name (case-insensitive) matches `key`,
    /// collapsing any other. Returns false if nothing matches.
    pub fn expand(&mut self, key: &str) -> bool {
        let key = key.trim();
        let found = self
            .plans
            .iter()
            .position(|p| p.id == key || p.name.eq_ignore_ascii_case(key));
        match found {
            Some(i) => {
                self.expanded = Some(i);
                true
            }
            None => false,
        }
    }

    pub fn expand_index(&mut self, index: usize) -> bool {
        if index < self.plans.len() {
            self.expanded = Some(index);
            true
        } else {
            false
        }
    }

    /// Expand `index`, or collapse it if it is already the expanded one
    pub fn toggle(&mut self, index: usize) {
        if self.expanded == Some(index) {
            self.collapse();
        } else {
            self.expand_index(index);
        }
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    pub fn expanded_index(&self) -> Option<usize> {
        self.expanded
    }

    pub fn expanded(&self) -> Option<&WorkoutPlan> {
        self.expanded.and_then(|i| self.plans.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalBackend;
    use crate::db::tests::signed_in;
    use crate::error::AppError;
    use crate::models::Difficulty;
    use crate::session::MemorySessionStore;

    async fn loaded() -> PlanBrowser {
        let backend = LocalBackend::open_in_memory().unwrap();
        let sessions = MemorySessionStore::with_session(signed_in(&backend, "a@example.com").await);
        let mut browser = PlanBrowser::default();
        browser.load(&backend, &sessions).await.unwrap();
        browser
    }

    #[tokio::test]
    async fn test_plans_ordered_by_difficulty_label() {
        let browser = loaded().await;
        let difficulties: Vec<_> = browser.plans().iter().map(|p| p.difficulty.clone()).collect();
        assert_eq!(
            difficulties,
            vec![
                Difficulty::Advanced,
                Difficulty::Beginner,
                Difficulty::Intermediate
            ]
        );
        assert!(browser.expanded().is_none());
    }

    #[tokio::test]
    async fn test_only_one_expanded() {
        let mut browser = loaded().await;
        assert!(browser.expand("push_pull_legs"));
        assert_eq!(browser.expanded().unwrap().name, "Push Pull Legs");

        assert!(browser.expand("full body starter"));
        assert_eq!(browser.expanded().unwrap().id, "full_body_starter");
        assert!(!browser.expanded().unwrap().days.is_empty());

        assert!(!browser.expand("marathon"));
        assert_eq!(browser.expanded().unwrap().id, "full_body_starter");
    }

    #[tokio::test]
    async fn test_toggle_and_collapse() {
        let mut browser = loaded().await;
        browser.toggle(1);
        assert_eq!(browser.expanded_index(), Some(1));
        browser.toggle(1);
        assert!(browser.expanded().is_none());

        browser.toggle(0);
        browser.collapse();
        assert!(browser.expanded().is_none());
        assert!(!browser.expand_index(99));
    }

    #[tokio::test]
    async fn test_load_requires_session() {
        let backend = LocalBackend::open_in_memory().unwrap();
        let mut browser = PlanBrowser::default();
        let err = browser
            .load(&backend, &MemorySessionStore::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthRequired));
    }
}
