//! Route handlers organized by resource

pub mod attendance;
pub mod auth;
pub mod catalog;
pub mod equipment;
pub mod health;
pub mod history;
pub mod users;

use std::sync::Arc;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

use gymtrack_core::{CollectionQuery, Document};

use crate::export::XLSX_CONTENT_TYPE;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Run `query` and decode every document.
async fn fetch_all<T: DeserializeOwned>(
    state: &Arc<AppState>,
    query: &CollectionQuery,
) -> Result<Vec<T>, ApiError> {
    let docs = state.store.query(query).await?;
    docs.iter()
        .map(Document::decode::<T>)
        .collect::<Result<Vec<T>, _>>()
        .map_err(ApiError::from)
}

/// Workbook download with a suggested filename.
fn xlsx_download(bytes: Vec<u8>, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}
