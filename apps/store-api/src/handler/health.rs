//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: &'static str,
    /// `connected` or `unavailable`
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<MigrationInfo>,
}

#[derive(Debug, Serialize)]
pub struct MigrationInfo {
    pub applied: usize,
    pub total: usize,
}

/// `GET /health`
///
/// Answers 503 when the database does not respond to `SELECT 1`.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if !state.db.health_check().await {
        warn!("Health check: database unavailable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                database: "unavailable",
                migrations: None,
            }),
        );
    }

    let migrations = match state.db.migration_status().await {
        Ok((total, applied)) => Some(MigrationInfo { applied, total }),
        Err(err) => {
            warn!(error = %err, "Health check: migration status unavailable");
            None
        }
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            database: "connected",
            migrations,
        }),
    )
}
