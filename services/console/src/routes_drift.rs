use axum::{extract::State, Json};
use telemetry::{drift_pct, DriftReport};

use crate::routes::Panel;
use crate::state::SharedState;

/// `derived` is the drift score as a one-decimal percentage string.
pub type DriftResp = Panel<DriftReport, String>;

pub async fn get_drift(State(state): State<SharedState>) -> Json<DriftResp> {
    let view = state.drift.read().await;
    Json(Panel::from_view(&*view, |r| drift_pct(r.drift_score)))
}

pub async fn post_reload(State(state): State<SharedState>) -> Json<DriftResp> {
    crate::panels::reload_drift(&state).await;
    get_drift(State(state)).await
}
