use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use telemetry::PredictionOutcome;

use crate::panels::PredictError;
use crate::routes::{handler_error, HandlerError};
use crate::state::SharedState;

/// The operator's raw text; validated before anything is sent upstream.
#[derive(Deserialize)]
pub struct PredictForm {
    pub features_json: String,
}

#[derive(Serialize)]
pub struct SampleResp {
    pub features_json: String,
}

pub async fn post_predict(
    State(state): State<SharedState>,
    Json(form): Json<PredictForm>,
) -> Result<Json<PredictionOutcome>, HandlerError> {
    crate::panels::run_prediction(&state, &form.features_json)
        .await
        .map(Json)
        .map_err(|e| match e {
            PredictError::Invalid(v) => handler_error(StatusCode::BAD_REQUEST, v.to_string()),
            PredictError::Upstream(msg) => handler_error(StatusCode::BAD_GATEWAY, msg),
        })
}

pub async fn get_sample(State(state): State<SharedState>) -> Result<Json<SampleResp>, HandlerError> {
    crate::panels::load_sample(&state)
        .await
        .map(|features_json| Json(SampleResp { features_json }))
        .map_err(|msg| handler_error(StatusCode::BAD_GATEWAY, msg))
}
