//! Attendance history endpoints (admin)
//!
//! Browsing goes through the session's history cache: the month's
//! check-ins are fetched once and pages are sliced locally. `refresh=true`
//! forces a re-fetch of the current month.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use gymtrack_core::PageView;

use super::attendance::AttendanceResponse;
use super::{fetch_all, xlsx_download};
use crate::export::history_sheet;
use crate::http::error::ApiError;
use crate::http::extractors::RequireAdmin;
use crate::http::server::AppState;
use crate::models::{month_descriptor, AttendanceRecord, Month, MonthOption};

/// Months offered by the month picker
const SELECTABLE_MONTHS: usize = 12;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    /// `YYYY-MM`; defaults to the current month
    pub month: Option<String>,
    /// Zero-based page index
    pub page: Option<usize>,
    #[serde(default)]
    pub refresh: bool,
}

/// Row of the history table
#[derive(Debug, Serialize)]
pub struct HistoryRow {
    #[serde(flatten)]
    pub record: AttendanceResponse,
    /// Check-in time in the gym's timezone
    pub checked_in_at: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryPage {
    pub month: String,
    #[serde(flatten)]
    pub view: PageView<HistoryRow>,
}

fn selected_month(state: &AppState, month: Option<&str>) -> Result<Month, ApiError> {
    match month.map(str::trim).filter(|m| !m.is_empty()) {
        Some(m) => Ok(Month::parse(m)?),
        None => Ok(Month::containing(Utc::now(), state.tz)),
    }
}

/// GET /history - one page of a month's check-ins
async fn list_history(
    State(state): State<Arc<AppState>>,
    RequireAdmin(session): RequireAdmin,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryPage>, ApiError> {
    let month = selected_month(&state, params.month.as_deref())?;
    let descriptor =
        month_descriptor(month, state.tz, state.config.pagination.history_page_size);

    let fetched = session.history.load(descriptor).await;
    if params.refresh && !fetched {
        session.history.refresh().await;
    }
    let view = match params.page {
        Some(page) => session.history.go_to_page(page).await,
        None => session.history.view().await,
    };

    let tz = state.tz;
    Ok(Json(HistoryPage {
        month: month.to_string(),
        view: view.map(|record: AttendanceRecord| HistoryRow {
            checked_in_at: record.local_time(tz, "%Y-%m-%d %H:%M"),
            record: AttendanceResponse::from(record),
        }),
    }))
}

/// GET /history/months - the current month and the ones before it
async fn list_months(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_session): RequireAdmin,
) -> Json<Vec<MonthOption>> {
    let months = Month::containing(Utc::now(), state.tz)
        .recent(SELECTABLE_MONTHS)
        .into_iter()
        .map(MonthOption::from)
        .collect();
    Json(months)
}

/// GET /history/export - the whole month as a workbook
async fn export_history(
    State(state): State<Arc<AppState>>,
    RequireAdmin(session): RequireAdmin,
    Query(params): Query<HistoryParams>,
) -> Result<Response, ApiError> {
    let month = selected_month(&state, params.month.as_deref())?;
    let query = month_descriptor(month, state.tz, 1).to_query();
    let records: Vec<AttendanceRecord> = fetch_all(&state, &query).await?;

    let bytes = history_sheet(&records, state.tz).to_xlsx()?;
    tracing::info!(
        username = %session.username,
        month = %month,
        rows = records.len(),
        "history exported"
    );
    Ok(xlsx_download(bytes, &format!("history-{}.xlsx", month)))
}

/// History routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/history", get(list_history))
        .route("/history/months", get(list_months))
        .route("/history/export", get(export_history))
}
