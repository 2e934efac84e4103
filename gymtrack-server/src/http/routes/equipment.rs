//! Equipment inspection endpoints (admin)

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use gymtrack_core::{to_fields, PageView, QueryDescriptor};

use super::{fetch_all, xlsx_download};
use crate::export::equipment_sheet;
use crate::http::error::ApiError;
use crate::http::extractors::RequireAdmin;
use crate::http::server::AppState;
use crate::models::equipment::REVIEW_DATE;
use crate::models::{
    Condition, ConditionCounts, ConditionUpdate, EquipmentFilter, Inspection, InspectionRequest,
    EQUIPMENT,
};

/// Largest accepted `per_page`
const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct EquipmentParams {
    pub branch: Option<String>,
    pub condition: Option<String>,
    pub item: Option<String>,
    /// Zero-based page index
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    #[serde(default)]
    pub refresh: bool,
}

impl EquipmentParams {
    fn filter(&self) -> EquipmentFilter {
        EquipmentFilter {
            branch: self.branch.clone(),
            condition: self.condition.clone(),
            item: self.item.clone(),
        }
    }
}

/// Inspection response
#[derive(Debug, Clone, Serialize)]
pub struct InspectionResponse {
    pub id: String,
    pub review_date: String,
    pub instructor: String,
    pub branch: String,
    pub item: String,
    pub condition: Condition,
    pub damage: String,
    pub recommended_actions: String,
    pub notes: String,
    pub created_at: String,
}

impl From<Inspection> for InspectionResponse {
    fn from(i: Inspection) -> Self {
        Self {
            id: i.id,
            review_date: i.review_date,
            instructor: i.instructor,
            branch: i.branch,
            item: i.item,
            condition: i.condition,
            damage: i.damage,
            recommended_actions: i.recommended_actions,
            notes: i.notes,
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EquipmentPage {
    /// Per-condition totals over the whole log, ignoring filters
    pub counts: ConditionCounts,
    /// Set when the whole-log fetch behind `counts` failed
    pub counts_error: Option<String>,
    #[serde(flatten)]
    pub view: PageView<InspectionResponse>,
}

/// POST /equipment - log an inspection
async fn create_inspection(
    State(state): State<Arc<AppState>>,
    RequireAdmin(session): RequireAdmin,
    Json(req): Json<InspectionRequest>,
) -> Result<(StatusCode, Json<InspectionResponse>), ApiError> {
    let now = Utc::now();
    let today = now.with_timezone(&state.tz).date_naive();
    let mut inspection = Inspection::from_request(&req, &state.config.catalog, today, now)?;

    let doc = state.store.insert(EQUIPMENT, to_fields(&inspection)?).await?;
    inspection.id = doc.id;
    tracing::info!(
        username = %session.username,
        inspection_id = %inspection.id,
        item = %inspection.item,
        condition = inspection.condition.as_str(),
        "inspection logged"
    );

    session.refresh_equipment().await;
    Ok((StatusCode::CREATED, Json(InspectionResponse::from(inspection))))
}

/// GET /equipment - one page of the filtered log plus condition counts
async fn list_inspections(
    State(state): State<Arc<AppState>>,
    RequireAdmin(session): RequireAdmin,
    Query(params): Query<EquipmentParams>,
) -> Result<Json<EquipmentPage>, ApiError> {
    let per_page = params
        .per_page
        .unwrap_or(state.config.pagination.equipment_page_size)
        .clamp(1, MAX_PER_PAGE);
    let descriptor = params.filter().descriptor(per_page)?;

    let fetched = session.equipment.load(descriptor).await;
    let log_fetched = session
        .equipment_log
        .load(QueryDescriptor::new(EQUIPMENT, REVIEW_DATE))
        .await;
    if params.refresh {
        if !fetched {
            session.equipment.refresh().await;
        }
        if !log_fetched {
            session.equipment_log.refresh().await;
        }
    }

    let view = match params.page {
        Some(page) => session.equipment.go_to_page(page).await,
        None => session.equipment.view().await,
    };
    let log = session.equipment_log.view().await;
    let counts = ConditionCounts::tally(
        session
            .equipment_log
            .items()
            .await
            .iter()
            .map(|i| &i.condition),
    );

    Ok(Json(EquipmentPage {
        counts,
        counts_error: log.error,
        view: view.map(InspectionResponse::from),
    }))
}

/// GET /equipment/{id}
async fn get_inspection(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_session): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<InspectionResponse>, ApiError> {
    let doc = state
        .store
        .get(EQUIPMENT, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("inspection", &id))?;
    Ok(Json(InspectionResponse::from(doc.decode::<Inspection>()?)))
}

/// PATCH /equipment/{id} - change the recorded condition
async fn update_condition(
    State(state): State<Arc<AppState>>,
    RequireAdmin(session): RequireAdmin,
    Path(id): Path<String>,
    Json(req): Json<ConditionUpdate>,
) -> Result<Json<InspectionResponse>, ApiError> {
    let condition = Condition::parse(&req.condition)?;
    let mut patch = Map::new();
    patch.insert("condition".into(), json!(condition));

    let doc = state
        .store
        .update(EQUIPMENT, &id, patch)
        .await
        .map_err(|e| match e {
            e if e.is_not_found() => ApiError::not_found("inspection", &id),
            e => ApiError::from(e),
        })?;
    tracing::info!(
        username = %session.username,
        inspection_id = %id,
        condition = condition.as_str(),
        "inspection condition updated"
    );

    session.refresh_equipment().await;
    Ok(Json(InspectionResponse::from(doc.decode::<Inspection>()?)))
}

/// DELETE /equipment/{id}
async fn delete_inspection(
    State(state): State<Arc<AppState>>,
    RequireAdmin(session): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete(EQUIPMENT, &id)
        .await
        .map_err(|e| match e {
            e if e.is_not_found() => ApiError::not_found("inspection", &id),
            e => ApiError::from(e),
        })?;
    tracing::info!(username = %session.username, inspection_id = %id, "inspection deleted");

    session.refresh_equipment().await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /equipment/export - the filtered log as a workbook
async fn export_inspections(
    State(state): State<Arc<AppState>>,
    RequireAdmin(session): RequireAdmin,
    Query(params): Query<EquipmentParams>,
) -> Result<Response, ApiError> {
    let query = params.filter().descriptor(1)?.to_query();
    let inspections: Vec<Inspection> = fetch_all(&state, &query).await?;

    let bytes = equipment_sheet(&inspections).to_xlsx()?;
    let today = Utc::now().with_timezone(&state.tz).date_naive();
    tracing::info!(
        username = %session.username,
        rows = inspections.len(),
        "equipment log exported"
    );
    Ok(xlsx_download(
        bytes,
        &format!("gym-equipment-{}.xlsx", today.format("%Y-%m-%d")),
    ))
}

/// Equipment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/equipment", get(list_inspections).post(create_inspection))
        .route("/equipment/export", get(export_inspections))
        .route(
            "/equipment/{id}",
            get(get_inspection)
                .patch(update_condition)
                .delete(delete_inspection),
        )
}
