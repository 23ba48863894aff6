use axum::{extract::State, Json};
use serde::Serialize;
use telemetry::Connectivity;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct StatusResp {
    pub api: Connectivity,
}

pub async fn get_status(State(state): State<SharedState>) -> Json<StatusResp> {
    let api = state.badge.read().await.state();
    Json(StatusResp { api })
}

pub async fn post_check(State(state): State<SharedState>) -> Json<StatusResp> {
    let api = crate::panels::check_connection(&state).await;
    Json(StatusResp { api })
}
