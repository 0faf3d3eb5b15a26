//! # store-api
//!
//! REST API behind the store admin dashboard.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Store API Server                                 │
//! │                                                                         │
//! │  Dashboard ──► HTTP (5000) ──► TraceLayer ──► CORS ──► body limit      │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                                         handler::{item, bill, health}  │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                                         store-db ──► SQLite            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The binary in `main.rs` loads [`ApiConfig`], opens the database and
//! serves [`router`]. Tests build the same router over an in-memory
//! database.

pub mod config;
pub mod error;
pub mod handler;
pub mod state;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::middleware;
use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

use handler::{bill, health, item};

/// Builds the application router with all routes and middleware.
///
/// ## Layers (outermost first)
/// 1. `TraceLayer` - one span per request, tagged with a fresh request id
/// 2. `CorsLayer::permissive()` - the dashboard is served from another origin
/// 3. `map_response(json_payload_too_large)` - JSON body for the limit's 413
/// 4. `RequestBodyLimitLayer` - `max_body_bytes` from the config
pub fn router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health::health))
        .route("/items", get(item::list_items).post(item::add_item))
        .route(
            "/items/{id}",
            put(item::update_item).delete(item::delete_item),
        )
        .route("/bills", get(bill::list_bills).post(bill::record_bill))
        .route("/bills/summary", get(bill::sales_summary))
        .route("/bills/{id}", get(bill::get_bill))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(middleware::map_response(error::json_payload_too_large))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4();
                    tracing::info_span!(
                        "request",
                        %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::handler::testing::{send, setup_test_app};

    #[tokio::test]
    async fn test_unknown_route() {
        let (app, _) = setup_test_app().await;

        let (status, _) = send(&app, Method::GET, "/nothing-here", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_summary_route_wins_over_bill_id() {
        let (app, _) = setup_test_app().await;

        let (status, body) = send(&app, Method::GET, "/bills/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bill_count"], 0);
    }
}
