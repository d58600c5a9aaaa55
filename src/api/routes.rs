//! API route definitions
//!
//! Organizes endpoints for the dashboard's five modules:
//! - /api/v1/dashboard - overview card
//! - /api/v1/advise - crop advisor (prediction + fertilizer + info)
//! - /api/v1/weather - forecast lookup
//! - /api/v1/market - static price board
//! - /api/v1/chat - farming chatbot relay
//! - /api/v1/crops/:name - agronomy metadata lookup
//! - /api/v1/health - liveness and model summary

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, DashboardState};

/// Create all API routes for the dashboard.
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/advise", post(handlers::post_advise))
        .route("/weather", get(handlers::get_weather))
        .route("/market", get(handlers::get_market))
        .route("/market/:crop", get(handlers::get_market_quote))
        .route("/crops/:name", get(handlers::get_crop_info))
        .route("/chat", post(handlers::post_chat))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}
