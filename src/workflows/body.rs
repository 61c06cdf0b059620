//! Body measurement entry and recent list

use tracing::info;

use crate::backend::{BODY_MEASUREMENT_LIMIT, Backend};
use crate::error::AppResult;
use crate::models::BodyMeasurement;
use crate::session::SessionStore;
use crate::validation::BodyForm;
use crate::workflows::require_session;

pub struct BodyEntry<'a> {
    backend: &'a dyn Backend,
    sessions: &'a dyn SessionStore,
}

impl<'a> BodyEntry<'a> {
    pub fn new(backend: &'a dyn Backend, sessions: &'a dyn SessionStore) -> Self {
        Self { backend, sessions }
    }

    /// Most recent measurements, newest first
    pub async fn recent(&self) -> AppResult<Vec<BodyMeasurement>> {
        let auth = require_session(self.backend, self.sessions).await?;
        Ok(self
            .backend
            .list_body_measurements(&auth.session, BODY_MEASUREMENT_LIMIT)
            .await?)
    }

    /// Store one measurement and return the refreshed recent list
    pub async fn submit(&self, form: &BodyForm) -> AppResult<Vec<BodyMeasurement>> {
        let measurement = form.validate()?;
        let auth = require_session(self.backend, self.sessions).await?;
        let stored = self
            .backend
            .insert_body_measurement(&auth.session, &measurement)
            .await?;
        info!(id = %stored.id, weight = stored.weight, "body measurement recorded");

        Ok(self
            .backend
            .list_body_measurements(&auth.session, BODY_MEASUREMENT_LIMIT)
            .await?)
    }
}
