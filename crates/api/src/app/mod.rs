//! HTTP API application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `services.rs`: infrastructure wiring (ledger/catalog stores, stock service)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent `{"ok": false, "error": ...}` responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP app with stores selected from the environment
/// (public entrypoint used by `main.rs`).
pub async fn build_app() -> Router {
    let services = Arc::new(services::build_services().await);
    router_with_services(services)
}

/// Build the router around already-wired services (tests inject in-memory
/// stores through here).
pub fn router_with_services(services: Arc<services::AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
        .layer(axum::middleware::from_fn(middleware::track_requests))
        .layer(ServiceBuilder::new())
}
