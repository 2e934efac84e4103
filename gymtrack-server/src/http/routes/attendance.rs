//! Daily check-in endpoint

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use gymtrack_core::{to_fields, CollectionQuery};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::validation::required;
use crate::models::{
    day_bounds, same_day_filters, AttendanceRecord, User, UserType, ValidationError, HISTORY, USERS,
};

/// Check-in request
#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub user_id: String,
    pub branch: String,
}

/// Stored check-in
#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub user_type: UserType,
    pub branch: String,
    pub affiliation: Option<String>,
    pub student_code: Option<String>,
    pub program: Option<String>,
    pub department: Option<String>,
    pub created_at: String,
}

impl From<AttendanceRecord> for AttendanceResponse {
    fn from(r: AttendanceRecord) -> Self {
        Self {
            affiliation: r.affiliation().map(str::to_owned),
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            user_type: r.user_type,
            branch: r.branch,
            student_code: r.student_code,
            program: r.program,
            department: r.department,
            created_at: r.created_at,
        }
    }
}

/// POST /attendance - record today's visit of a member to a branch
async fn check_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<AttendanceResponse>), ApiError> {
    let user_id = required("user_id", &req.user_id, 200)?;
    let branch = required("branch", &req.branch, 200)?;
    if !state.config.catalog.has_branch(&branch) {
        return Err(ValidationError::InvalidVariant {
            field: "branch",
            value: branch,
        }
        .into());
    }

    let user: User = state
        .store
        .get(USERS, &user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("user", &user_id))?
        .decode()?;

    let now = Utc::now();
    let today = same_day_filters(&user.id, &branch, day_bounds(now, state.tz))
        .into_iter()
        .fold(CollectionQuery::new(HISTORY), CollectionQuery::filter)
        .limit(1);
    if !state.store.query(&today).await?.is_empty() {
        return Err(ApiError::conflict(
            "attendance already registered today at this branch",
        ));
    }

    let mut record = AttendanceRecord::check_in(&user, &branch, now);
    let doc = state.store.insert(HISTORY, to_fields(&record)?).await?;
    record.id = doc.id;
    tracing::info!(user_id = %user.id, branch = %branch, "check-in recorded");

    Ok((StatusCode::CREATED, Json(AttendanceResponse::from(record))))
}

/// Check-in routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/attendance", post(check_in))
}
