//! API route handlers
//!
//! Request handling for the dashboard endpoints: advisory composition,
//! weather forecasts, market prices, crop metadata, and the chat relay.
//! Every external failure is rendered as a typed error envelope; nothing
//! is retried and nothing crosses this boundary as a raw error.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::advisor::{AdviseRequest, AdvisoryEngine, CropInfoEntry, CropInfoTable, MarketBoard};
use crate::api::envelope::{ApiErrorResponse, ApiResponse};
use crate::chat::{ChatBackend, ChatError};
use crate::types::ForecastPoint;
use crate::weather::WeatherClient;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers.
///
/// Every field is an immutable collaborator built once at startup; the
/// state clones cheaply per request.
#[derive(Clone)]
pub struct DashboardState {
    /// Advisory composition root
    pub engine: Arc<AdvisoryEngine>,
    /// Forecast provider client
    pub weather: WeatherClient,
    /// Chat assistant backend
    pub chat: Arc<dyn ChatBackend>,
    /// Static market price board
    pub market: Arc<MarketBoard>,
    /// Static agronomy table
    pub crop_info: Arc<CropInfoTable>,
}

// ============================================================================
// Dashboard Overview
// ============================================================================

/// Overview card for the landing module.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub modules: Vec<&'static str>,
    pub crops_known: usize,
    pub forest_trees: usize,
    pub message: &'static str,
}

pub async fn get_dashboard(State(state): State<DashboardState>) -> Response {
    let classifier = state.engine.classifier();
    ApiResponse::ok(DashboardResponse {
        modules: vec![
            "Dashboard",
            "Crop Advisor",
            "Weather Forecast",
            "Market Prices",
            "Chatbot",
        ],
        crops_known: classifier.labels().len(),
        forest_trees: classifier.num_trees(),
        message: "AI assistant for crop planning, market prices, weather alerts & more.",
    })
}

// ============================================================================
// Crop Advisor
// ============================================================================

pub async fn post_advise(
    State(state): State<DashboardState>,
    Json(request): Json<AdviseRequest>,
) -> Response {
    match state.engine.advise(&request).await {
        Ok(report) => ApiResponse::ok(report),
        // Malformed feature input surfaces to the caller as a 400
        Err(e) => ApiErrorResponse::bad_request(e.to_string()),
    }
}

// ============================================================================
// Weather Forecast
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: String,
}

#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub city: String,
    pub forecast: Vec<ForecastPoint>,
}

pub async fn get_weather(
    State(state): State<DashboardState>,
    Query(query): Query<WeatherQuery>,
) -> Response {
    match state.weather.forecast(&query.city).await {
        Ok(forecast) => ApiResponse::ok(WeatherResponse {
            city: query.city,
            forecast,
        }),
        Err(e) => {
            warn!(city = %query.city, error = %e, "Forecast request failed");
            ApiErrorResponse::service_unavailable("Weather data unavailable")
        }
    }
}

// ============================================================================
// Market Prices
// ============================================================================

pub async fn get_market(State(state): State<DashboardState>) -> Response {
    ApiResponse::ok(state.market.quotes().to_vec())
}

pub async fn get_market_quote(
    State(state): State<DashboardState>,
    Path(crop): Path<String>,
) -> Response {
    match state.market.quote(&crop) {
        Some(quote) => ApiResponse::ok(quote.clone()),
        None => ApiErrorResponse::not_found(format!("No price listed for '{crop}'")),
    }
}

// ============================================================================
// Crop Info
// ============================================================================

/// Crop metadata lookup result. A miss is a neutral payload, not an
/// error: the table only covers the crops the stock classifier knows.
#[derive(Debug, Serialize)]
pub struct CropInfoResponse {
    pub crop: String,
    pub info: Option<CropInfoEntry>,
    pub message: Option<&'static str>,
}

pub async fn get_crop_info(
    State(state): State<DashboardState>,
    Path(name): Path<String>,
) -> Response {
    let info = state.crop_info.lookup(&name).cloned();
    let message = if info.is_none() {
        Some("No detailed info available.")
    } else {
        None
    };
    ApiResponse::ok(CropInfoResponse {
        crop: name.to_lowercase(),
        info,
        message,
    })
}

// ============================================================================
// Chatbot
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

pub async fn post_chat(
    State(state): State<DashboardState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match state.chat.ask(&request.query).await {
        Ok(answer) => ApiResponse::ok(ChatResponse { answer }),
        Err(e) => {
            warn!(error = %e, "Chat relay failed");
            match e {
                ChatError::MissingApiKey => {
                    ApiErrorResponse::service_unavailable("Chat assistant is not configured")
                }
                ChatError::Http(_) | ChatError::Status(_) => {
                    ApiErrorResponse::service_unavailable("Chat assistant is unreachable")
                }
                ChatError::Malformed(_) | ChatError::EmptyResponse => {
                    ApiErrorResponse::internal("Chat assistant returned an unusable response")
                }
            }
        }
    }
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub crops_known: usize,
    pub forest_trees: usize,
}

pub async fn get_health(State(state): State<DashboardState>) -> Response {
    let classifier = state.engine.classifier();
    ApiResponse::ok(HealthResponse {
        status: "ok",
        crops_known: classifier.labels().len(),
        forest_trees: classifier.num_trees(),
    })
}
