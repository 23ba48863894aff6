use axum::{extract::State, Json};
use serde::Serialize;
use telemetry::{
    confidence_series, pass_fail_counts, ConfidenceSeries, CountSeries, MetricsSnapshot,
    PredictionRecord,
};

use crate::routes::Panel;
use crate::state::SharedState;

#[derive(Serialize)]
pub struct DashboardResp {
    pub metrics: Panel<MetricsSnapshot, CountSeries>,
    pub recent: Panel<Vec<PredictionRecord>, ConfidenceSeries>,
}

pub async fn get_dashboard(State(state): State<SharedState>) -> Json<DashboardResp> {
    let view = state.dashboard.read().await;
    Json(DashboardResp {
        metrics: Panel::from_view(&view.metrics, pass_fail_counts),
        recent: Panel::from_view(&view.recent, |rows| confidence_series(rows)),
    })
}
