//! Session guard run before every workflow

use tracing::{debug, info};

use crate::backend::Backend;
use crate::error::{AppError, AppResult, BackendError};
use crate::models::{AuthSession, Identity};
use crate::session::{SessionAccessor, SessionStore};

/// A session the identity service has just vouched for.
///
/// `session.user` is always the verified identity, never what was cached.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub session: AuthSession,
    pub identity: Identity,
}

impl Authenticated {
    fn verified(mut session: AuthSession, identity: Identity) -> Self {
        session.user = identity.clone();
        Self { session, identity }
    }
}

/// Make sure someone is signed in.
///
/// An expired access token is traded for a new one when the session carries
/// a refresh token, and the new session is stored. Fails with
/// [`AppError::AuthRequired`] when no session is stored or the identity
/// service no longer accepts it.
pub async fn require_session(
    backend: &dyn Backend,
    sessions: &dyn SessionStore,
) -> AppResult<Authenticated> {
    let session = sessions.current().ok_or(AppError::AuthRequired)?;

    match backend.current_identity(&session).await {
        Ok(identity) => {
            debug!(user = %identity.id, "session verified");
            Ok(Authenticated::verified(session, identity))
        }
        Err(BackendError::Unauthorized(reason)) => {
            let Some(refresh_token) = session.refresh_token.as_deref() else {
                debug!(%reason, "session rejected");
                return Err(AppError::AuthRequired);
            };
            debug!(%reason, "access token rejected, refreshing");

            let renewed = backend
                .refresh_session(refresh_token)
                .await
                .map_err(|e| match e {
                    BackendError::Connectivity(_) => AppError::Connectivity,
                    _ => AppError::AuthRequired,
                })?;
            let identity = backend.current_identity(&renewed).await?;
            sessions
                .save(&renewed)
                .map_err(|e| AppError::SessionStorage(e.to_string()))?;
            info!(user = %identity.id, "session refreshed");
            Ok(Authenticated::verified(renewed, identity))
        }
        Err(e) => Err(e.into()),
    }
}
