//! Sign-up, sign-in and sign-out

use tracing::{info, warn};

use crate::backend::Backend;
use crate::error::{AppError, AppResult};
use crate::models::{AuthSession, Identity};
use crate::session::{SessionAccessor, SessionStore};
use crate::validation::validate_credentials;

/// Where a sign-up leaves the user
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// Signed in right away
    Authenticated(Identity),
    /// Account created; the email has to be confirmed before signing in
    PendingVerification(Identity),
}

pub struct AuthFlow<'a> {
    backend: &'a dyn Backend,
    store: &'a dyn SessionStore,
}

impl<'a> AuthFlow<'a> {
    pub fn new(backend: &'a dyn Backend, store: &'a dyn SessionStore) -> Self {
        Self { backend, store }
    }

    fn persist(&self, session: &AuthSession) -> AppResult<()> {
        self.store
            .save(session)
            .map_err(|e| AppError::SessionStorage(e.to_string()))
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<SignUpOutcome> {
        validate_credentials(email, password)?;
        let resp = self.backend.sign_up(email.trim(), password).await?;

        match resp.session {
            Some(session) => {
                self.persist(&session)?;
                info!(user = %resp.user.id, "signed up and signed in");
                Ok(SignUpOutcome::Authenticated(resp.user))
            }
            None => {
                info!(user = %resp.user.id, "signed up, waiting for email confirmation");
                Ok(SignUpOutcome::PendingVerification(resp.user))
            }
        }
    }

    /// Unconfirmed accounts fail with [`AppError::EmailNotConfirmed`]; other
    /// refusals carry the identity service's own message.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Identity> {
        validate_credentials(email, password)?;
        let session = self.backend.sign_in(email.trim(), password).await?;
        self.persist(&session)?;
        info!(user = %session.user.id, "signed in");
        Ok(session.user)
    }

    /// Revoke the session remotely (best effort) and forget it locally
    pub async fn sign_out(&self) -> AppResult<()> {
        if let Some(session) = self.store.current()
            && let Err(e) = self.backend.sign_out(&session).await
        {
            warn!(error = %e, "remote sign-out failed, clearing local session anyway");
        }
        self.store
            .clear()
            .map_err(|e| AppError::SessionStorage(e.to_string()))?;
        info!("signed out");
        Ok(())
    }
}
