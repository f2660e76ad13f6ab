//! API module for delivery reports
//!
//! Provides a REST interface over the report service.

pub mod handlers;
pub mod service;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use service::ReportService;

pub fn create_router(service: Arc<ReportService>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/api/v1/health", get(handlers::health))
        // Reports
        .route("/api/v1/reports", get(handlers::get_reports))
        .route("/api/v1/reports/bases", get(handlers::get_base_report))
        .route("/api/v1/reports/couriers", get(handlers::get_courier_report))
        // Orders
        .route("/api/v1/orders", get(handlers::get_orders))
        .route("/api/v1/reload", post(handlers::reload))
        // State and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
