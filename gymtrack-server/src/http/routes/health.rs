//! Liveness check for load balancers and kiosks

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Zone that decides the check-in day
    pub timezone: String,
    /// Current date in that zone
    pub today: NaiveDate,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timezone: state.tz.name().to_owned(),
        today: Utc::now().with_timezone(&state.tz).date_naive(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymtrack_core::{GymConfig, MemoryStore};

    #[tokio::test]
    async fn reports_local_day_of_configured_zone() {
        let mut config = GymConfig::default();
        config.server.timezone = "Pacific/Kiritimati".into();
        let state = AppState::new(Arc::new(MemoryStore::new()), config).unwrap();

        let Json(body) = health(State(Arc::new(state))).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(body.timezone, "Pacific/Kiritimati");
        // UTC+14: always at least the UTC date.
        assert!(body.today >= Utc::now().date_naive());
    }
}
