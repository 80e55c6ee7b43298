//! REST API for the warehouse dashboard

pub mod handlers;
pub mod service;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use service::DashboardService;

pub fn router(service: Arc<DashboardService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/dashboard", get(handlers::get_dashboard))
        .route("/api/v1/kpis", get(handlers::get_kpis))
        // Warehouses
        .route("/api/v1/warehouses", get(handlers::get_warehouses))
        .route("/api/v1/warehouses/slowest", get(handlers::get_slowest))
        // Analysis
        .route("/api/v1/trends", get(handlers::get_trends))
        .route("/api/v1/bottlenecks", get(handlers::get_bottlenecks))
        .route("/api/v1/recommendations", get(handlers::get_recommendations))
        .route("/api/v1/charts/:name", get(handlers::get_chart))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
