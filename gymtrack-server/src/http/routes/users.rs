//! Member registration endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use gymtrack_core::{to_fields, CollectionQuery, Filter};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{RegistrationRequest, User, UserType, USERS};

/// Member response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub document: String,
    pub email: String,
    pub user_type: UserType,
    pub student_code: Option<String>,
    pub program: Option<String>,
    pub department: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            document: u.document,
            email: u.email,
            user_type: u.user_type,
            student_code: u.student_code,
            program: u.program,
            department: u.department,
            created_at: u.created_at,
        }
    }
}

/// POST /users - register a member
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let mut user = User::register(&req, Utc::now())?;

    let existing = state
        .store
        .query(
            &CollectionQuery::new(USERS)
                .filter(Filter::eq("document", user.document.as_str()))
                .limit(1),
        )
        .await?;
    if !existing.is_empty() {
        return Err(ApiError::conflict(
            "a member with this document is already registered",
        ));
    }

    let doc = state.store.insert(USERS, to_fields(&user)?).await?;
    user.id = doc.id;
    tracing::info!(user_id = %user.id, user_type = user.user_type.as_str(), "member registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /users/{id} - look up a member
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let doc = state
        .store
        .get(USERS, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("user", &id))?;
    Ok(Json(UserResponse::from(doc.decode::<User>()?)))
}

/// Member routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(register))
        .route("/users/{id}", get(get_user))
}
