//! Admin login and session endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use gymtrack_core::{CollectionQuery, Filter};

use crate::http::error::ApiError;
use crate::http::extractors::RequireAdmin;
use crate::http::server::AppState;
use crate::http::session::AdminSession;
use crate::models::{AdminAccount, LoginRequest, ADMINS};

/// Message for every failed login, whatever the cause
const INVALID_CREDENTIALS: &str = "invalid username or password";

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub username: String,
    pub expires_at: String,
}

impl From<&AdminSession> for SessionResponse {
    fn from(s: &AdminSession) -> Self {
        Self {
            token: s.token.clone(),
            username: s.username.clone(),
            expires_at: gymtrack_core::timestamp_string(s.expires_at),
        }
    }
}

/// POST /auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let username = req.username.trim().to_owned();
    if username.is_empty() || req.password.is_empty() {
        tracing::warn!("login rejected: blank credentials");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let found = state
        .store
        .query(
            &CollectionQuery::new(ADMINS)
                .filter(Filter::eq("username", username.as_str()))
                .limit(1),
        )
        .await?;
    let Some(doc) = found.first() else {
        tracing::warn!(username = %username, "login rejected: unknown admin");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };
    let account: AdminAccount = doc.decode()?;

    let password = req.password;
    let verified = tokio::task::spawn_blocking(move || account.verify(&password))
        .await
        .map_err(ApiError::internal)?;
    if !verified {
        tracing::warn!(username = %username, "login rejected: wrong password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let session = state.sessions.create(&username).await;
    Ok(Json(SessionResponse::from(session.as_ref())))
}

/// POST /auth/logout
async fn logout(
    State(state): State<Arc<AppState>>,
    RequireAdmin(session): RequireAdmin,
) -> StatusCode {
    state.sessions.remove(&session.token).await;
    StatusCode::NO_CONTENT
}

/// GET /auth/session
async fn current_session(RequireAdmin(session): RequireAdmin) -> Json<SessionResponse> {
    Json(SessionResponse::from(session.as_ref()))
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
}
