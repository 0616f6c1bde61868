// SME Analytics - REST API (Axum)
//
// Every request reloads the dashboard from its source, so a JSON feed edited
// on disk shows up on the next page load.

use crate::charts::{self, ChartKind, DashboardView};
use crate::dashboard::{DashboardData, DashboardSource};
use crate::forecast::{InvalidSeriesError, Trend};
use crate::validation;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DashboardSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn DashboardSource>) -> Self {
        AppState { source }
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Serialize)]
pub struct PriceChangeResponse {
    pub percent_change: f64,
    pub trend: Trend,
}

fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok(data))).into_response()
}

fn fail(status: StatusCode, message: String) -> Response {
    (status, Json(ApiResponse::<()>::err(message))).into_response()
}

/// Load fresh data or turn the failure into a 500 response
fn load(state: &AppState) -> Result<DashboardData, Response> {
    state.source.load().map_err(|e| {
        tracing::error!(source = state.source.name(), "Error loading dashboard data: {:#}", e);
        fail(StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
    })
}

fn invalid_series(e: InvalidSeriesError) -> Response {
    tracing::warn!("Forecast series rejected: {}", e);
    fail(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/dashboard - Everything in one document
async fn get_dashboard(State(state): State<AppState>) -> Response {
    match load(&state) {
        Ok(data) => ok(data),
        Err(resp) => resp,
    }
}

/// GET /api/forecast
async fn get_forecast(State(state): State<AppState>) -> Response {
    match load(&state) {
        Ok(data) => ok(data.forecast),
        Err(resp) => resp,
    }
}

/// GET /api/forecast/change - Percentage change + trend
async fn get_price_change(State(state): State<AppState>) -> Response {
    let data = match load(&state) {
        Ok(data) => data,
        Err(resp) => return resp,
    };

    match data.price_change() {
        Ok(percent_change) => ok(PriceChangeResponse {
            percent_change,
            trend: Trend::from_change(percent_change),
        }),
        Err(e) => invalid_series(e),
    }
}

/// GET /api/branches
async fn get_branches(State(state): State<AppState>) -> Response {
    match load(&state) {
        Ok(data) => ok(data.branches),
        Err(resp) => resp,
    }
}

/// GET /api/monthly
async fn get_monthly(State(state): State<AppState>) -> Response {
    match load(&state) {
        Ok(data) => ok(data.monthly_series),
        Err(resp) => resp,
    }
}

/// GET /api/status-matrix - Flattened (employment, marital, amount) cells
async fn get_status_matrix(State(state): State<AppState>) -> Response {
    match load(&state) {
        Ok(data) => ok(data.status_matrix.cells()),
        Err(resp) => resp,
    }
}

/// GET /api/kpis
async fn get_kpis(State(state): State<AppState>) -> Response {
    match load(&state) {
        Ok(data) => ok(data.kpis),
        Err(resp) => resp,
    }
}

/// GET /api/insights
async fn get_insights(State(state): State<AppState>) -> Response {
    match load(&state) {
        Ok(data) => ok(data.insights),
        Err(resp) => resp,
    }
}

/// GET /api/charts - View models for every widget
async fn get_charts(State(state): State<AppState>) -> Response {
    match load(&state) {
        Ok(data) => ok(DashboardView::build(&data)),
        Err(resp) => resp,
    }
}

/// GET /api/charts/:name - One chart by name
async fn get_chart(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let kind: ChartKind = match name.parse() {
        Ok(kind) => kind,
        Err(msg) => return fail(StatusCode::NOT_FOUND, msg),
    };

    match load(&state) {
        Ok(data) => ok(charts::chart(&data, kind)),
        Err(resp) => resp,
    }
}

/// GET /api/validation - Data contract report
async fn get_validation(State(state): State<AppState>) -> Response {
    match load(&state) {
        Ok(data) => ok(validation::validate(&data)),
        Err(resp) => resp,
    }
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/forecast", get(get_forecast))
        .route("/forecast/change", get(get_price_change))
        .route("/branches", get(get_branches))
        .route("/monthly", get(get_monthly))
        .route("/status-matrix", get(get_status_matrix))
        .route("/kpis", get(get_kpis))
        .route("/insights", get(get_insights))
        .route("/charts", get(get_charts))
        .route("/charts/:name", get(get_chart))
        .route("/validation", get(get_validation))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
