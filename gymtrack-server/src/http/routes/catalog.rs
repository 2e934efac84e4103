//! Branch and equipment catalogs

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;
use crate::models::Condition;

#[derive(Serialize)]
pub struct BranchesResponse {
    pub branches: Vec<String>,
}

#[derive(Serialize)]
pub struct EquipmentCatalogResponse {
    pub items: Vec<String>,
    pub conditions: Vec<Condition>,
}

/// GET /branches
async fn branches(State(state): State<Arc<AppState>>) -> Json<BranchesResponse> {
    Json(BranchesResponse {
        branches: state.config.catalog.branches.clone(),
    })
}

/// GET /equipment/catalog
async fn equipment_catalog(State(state): State<Arc<AppState>>) -> Json<EquipmentCatalogResponse> {
    Json(EquipmentCatalogResponse {
        items: state.config.catalog.equipment.clone(),
        conditions: Condition::all().to_vec(),
    })
}

/// Catalog routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/branches", get(branches))
        .route("/equipment/catalog", get(equipment_catalog))
}
