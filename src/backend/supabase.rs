//! Hosted backend over HTTP (GoTrue auth + PostgREST tables)

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{BackendResult, DataStore, ExerciseOrder, IdentityService, WorkoutQuery};
use crate::error::BackendError;
use crate::models::{
    AuthSession, BodyMeasurement, Exercise, Identity, NewBodyMeasurement, NewWorkout,
    SignUpResponse, WorkoutPlan, WorkoutRecord,
};

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub anon_key: String,
    pub request_timeout: Duration,
}

impl SupabaseConfig {
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(url: Url, anon_key: impl Into<String>) -> Self {
        Self {
            url,
            anon_key: anon_key.into(),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

pub struct SupabaseClient {
    client: Client,
    base_url: Url,
    anon_key: String,
}

#[derive(Deserialize, Debug)]
struct UserBody {
    id: String,
    email: Option<String>,
}

impl From<UserBody> for Identity {
    fn from(u: UserBody) -> Self {
        Identity {
            id: u.id,
            email: u.email.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct TokenBody {
    access_token: String,
    refresh_token: Option<String>,
    user: UserBody,
}

impl From<TokenBody> for AuthSession {
    fn from(t: TokenBody) -> Self {
        AuthSession {
            access_token: t.access_token,
            refresh_token: t.refresh_token,
            user: t.user.into(),
        }
    }
}

/// Sign-up answers with a full token when the project auto-confirms,
/// otherwise with the bare user object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum SignUpBody {
    Session(TokenBody),
    User(UserBody),
}

#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
struct OwnedRow<'a, T: Serialize> {
    user_id: &'a str,
    #[serde(flatten)]
    row: &'a T,
}

/// Makes sure a url has a trailing slash so `join` appends instead of
/// replacing the last path segment.
fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let mut path = new_url.path().to_string();
        path.push('/');
        new_url.set_path(&path);
        new_url
    }
}

fn classify_error(status: StatusCode, body: ErrorBody, raw: String) -> BackendError {
    let code = body.error_code.clone().unwrap_or_default();
    let message = body
        .error_description
        .or(body.msg)
        .or(body.message)
        .or(body.error)
        .unwrap_or_else(|| {
            if raw.is_empty() {
                status.to_string()
            } else {
                raw
            }
        });

    // Older GoTrue releases have no error_code and only send the description.
    if code == "email_not_confirmed" || message == "Email not confirmed" {
        return BackendError::EmailNotConfirmed;
    }
    if status == StatusCode::UNAUTHORIZED
        || matches!(
            code.as_str(),
            "bad_jwt"
                | "session_not_found"
                | "session_expired"
                | "no_authorization"
                | "refresh_token_not_found"
                | "refresh_token_already_used"
        )
    {
        return BackendError::Unauthorized(message);
    }
    BackendError::Api {
        status: status.as_u16(),
        message,
    }
}

async fn error_from_response(resp: Response) -> BackendError {
    let status = resp.status();
    let raw = resp.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&raw).unwrap_or_default();
    let err = classify_error(status, body, raw);
    warn!(%status, error = %err, "backend request failed");
    err
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BackendError::Storage(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: ensure_slash(&config.url),
            anon_key: config.anon_key,
        })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> BackendResult<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| BackendError::Decode(format!("Failed to construct URL: {}", e)))?;
        debug!(%method, %url, "backend request");

        // Anonymous calls authorize with the project key itself.
        let bearer = token.unwrap_or(&self.anon_key);
        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer))
    }

    async fn send(request: RequestBuilder) -> BackendResult<Response> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> BackendResult<T> {
        let resp = Self::send(request).await?;
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body = %body, "failed to parse backend response");
            BackendError::Decode(e.to_string())
        })
    }

    async fn insert_returning<T, R>(
        &self,
        table: &str,
        session: &AuthSession,
        row: &T,
    ) -> BackendResult<R>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        let body = OwnedRow {
            user_id: &session.user.id,
            row,
        };
        let request = self
            .request(
                Method::POST,
                &format!("rest/v1/{}", table),
                Some(&session.access_token),
            )?
            .header("Prefer", "return=representation")
            .json(&body);

        let mut rows: Vec<R> = Self::send_json(request).await?;
        if rows.is_empty() {
            return Err(BackendError::Decode(format!("insert into {} returned no row", table)));
        }
        Ok(rows.swap_remove(0))
    }
}

#[async_trait]
impl IdentityService for SupabaseClient {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpResponse> {
        let request = self
            .request(Method::POST, "auth/v1/signup", None)?
            .json(&serde_json::json!({ "email": email, "password": password }));

        let body: SignUpBody = Self::send_json(request).await?;
        Ok(match body {
            SignUpBody::Session(token) => {
                let session = AuthSession::from(token);
                SignUpResponse {
                    user: session.user.clone(),
                    session: Some(session),
                }
            }
            SignUpBody::User(user) => SignUpResponse {
                user: user.into(),
                session: None,
            },
        })
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let request = self
            .request(Method::POST, "auth/v1/token?grant_type=password", None)?
            .json(&serde_json::json!({ "email": email, "password": password }));

        let token: TokenBody = Self::send_json(request).await?;
        Ok(token.into())
    }

    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<AuthSession> {
        let request = self
            .request(Method::POST, "auth/v1/token?grant_type=refresh_token", None)?
            .json(&serde_json::json!({ "refresh_token": refresh_token }));

        let token: TokenBody = Self::send_json(request).await?;
        debug!(user = %token.user.id, "session refreshed");
        Ok(token.into())
    }

    async fn sign_out(&self, session: &AuthSession) -> BackendResult<()> {
        let request = self.request(Method::POST, "auth/v1/logout", Some(&session.access_token))?;
        Self::send(request).await?;
        Ok(())
    }

    async fn current_identity(&self, session: &AuthSession) -> BackendResult<Identity> {
        let request = self.request(Method::GET, "auth/v1/user", Some(&session.access_token))?;
        let user: UserBody = Self::send_json(request).await?;
        Ok(user.into())
    }
}

#[async_trait]
impl DataStore for SupabaseClient {
    async fn list_exercises(
        &self,
        session: &AuthSession,
        order: ExerciseOrder,
    ) -> BackendResult<Vec<Exercise>> {
        let request = self
            .request(Method::GET, "rest/v1/exercises", Some(&session.access_token))?
            .query(&[
                ("select", "*".to_string()),
                ("order", format!("{}.asc", order.column())),
            ]);
        Self::send_json(request).await
    }

    #[instrument(skip(self, session), fields(user = %session.user.id))]
    async fn insert_workout(
        &self,
        session: &AuthSession,
        workout: &NewWorkout,
    ) -> BackendResult<WorkoutRecord> {
        self.insert_returning("workouts", session, workout).await
    }

    async fn list_workouts(
        &self,
        session: &AuthSession,
        query: &WorkoutQuery,
    ) -> BackendResult<Vec<WorkoutRecord>> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", session.user.id)),
        ];
        if let Some(name) = &query.exercise_name {
            params.push(("exercise_name", format!("eq.{}", name)));
        }
        if let Some(since) = query.since {
            params.push((
                "created_at",
                format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ));
        }
        params.push(("order", format!("created_at.{}", query.order.as_postgrest())));

        let request = self
            .request(Method::GET, "rest/v1/workouts", Some(&session.access_token))?
            .query(&params);
        Self::send_json(request).await
    }

    #[instrument(skip(self, session), fields(user = %session.user.id))]
    async fn insert_body_measurement(
        &self,
        session: &AuthSession,
        measurement: &NewBodyMeasurement,
    ) -> BackendResult<BodyMeasurement> {
        self.insert_returning("body_measurements", session, measurement)
            .await
    }

    async fn list_body_measurements(
        &self,
        session: &AuthSession,
        limit: usize,
    ) -> BackendResult<Vec<BodyMeasurement>> {
        let request = self
            .request(
                Method::GET,
                "rest/v1/body_measurements",
                Some(&session.access_token),
            )?
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", session.user.id)),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ]);
        Self::send_json(request).await
    }

    async fn list_plans(&self, session: &AuthSession) -> BackendResult<Vec<WorkoutPlan>> {
        let request = self
            .request(Method::GET, "rest/v1/workout_plans", Some(&session.access_token))?
            .query(&[("select", "*"), ("order", "difficulty.asc")]);
        Self::send_json(request).await
    }
}
