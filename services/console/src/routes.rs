use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use telemetry::{ViewState, ViewStatus};
use tower_http::cors::CorsLayer;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

pub type HandlerError = (StatusCode, Json<ApiErrorBody>);

pub fn handler_error(status: StatusCode, error: impl Into<String>) -> HandlerError {
    (status, Json(ApiErrorBody { error: error.into() }))
}

/// A view as the browser page sees it: state, raw data and whatever
/// was derived from the data for charts.
#[derive(Debug, Serialize)]
pub struct Panel<T, D> {
    pub status: ViewStatus,
    pub loading: bool,
    pub error: String,
    pub data: Option<T>,
    pub derived: Option<D>,
}

impl<T: Clone, D> Panel<T, D> {
    pub fn from_view(view: &ViewState<T>, derive: impl FnOnce(&T) -> D) -> Self {
        Self {
            status: view.status(),
            loading: view.loading,
            error: view.error.clone(),
            data: view.data.clone(),
            derived: view.data.as_ref().map(derive),
        }
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/status", get(crate::routes_status::get_status))
        .route("/api/status/check", post(crate::routes_status::post_check))
        .route("/api/dashboard", get(crate::routes_dashboard::get_dashboard))
        .route("/api/history", get(crate::routes_history::get_history))
        .route("/api/history/reload", post(crate::routes_history::post_reload))
        .route("/api/history/:id/feedback", post(crate::routes_history::post_feedback))
        .route("/api/drift", get(crate::routes_drift::get_drift))
        .route("/api/drift/reload", post(crate::routes_drift::post_reload))
        .route("/api/predict", post(crate::routes_predict::post_predict))
        .route("/api/sample", get(crate::routes_predict::get_sample))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
