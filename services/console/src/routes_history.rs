use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use telemetry::{
    label_breakdown, FeedbackError, LabelBreakdown, LabelState, PredictionId, PredictionRecord,
};
use tracing::debug;

use crate::routes::{handler_error, HandlerError, Panel};
use crate::state::{HistoryView, SharedState};

#[derive(Debug, Serialize)]
pub struct HistoryRow {
    #[serde(flatten)]
    pub record: PredictionRecord,
    pub feedback: LabelState,
}

#[derive(Serialize)]
pub struct HistoryResp {
    #[serde(flatten)]
    pub panel: Panel<Vec<HistoryRow>, LabelBreakdown>,
    /// Last rolled-back feedback edit, cleared by the next confirmed one.
    pub feedback_error: Option<String>,
    pub pending_feedback: usize,
}

#[derive(Deserialize)]
pub struct FeedbackForm {
    pub label: String,
}

fn to_row(view: &HistoryView, rec: &PredictionRecord) -> HistoryRow {
    HistoryRow {
        record: rec.clone(),
        feedback: view.ledger.state_of(rec),
    }
}

fn snapshot(view: &HistoryView) -> HistoryResp {
    let rows = &view.rows;
    HistoryResp {
        panel: Panel {
            status: rows.status(),
            loading: rows.loading,
            error: rows.error.clone(),
            data: rows
                .data
                .as_ref()
                .map(|recs| recs.iter().map(|r| to_row(view, r)).collect()),
            derived: rows.data.as_deref().map(label_breakdown),
        },
        feedback_error: view.feedback_error.clone(),
        pending_feedback: view.ledger.pending_count(),
    }
}

pub async fn get_history(State(state): State<SharedState>) -> Json<HistoryResp> {
    let view = state.history.read().await;
    Json(snapshot(&view))
}

pub async fn post_reload(State(state): State<SharedState>) -> Json<HistoryResp> {
    crate::panels::reload_history(&state).await;
    get_history(State(state)).await
}

/// Answers right after the optimistic edit; the submission settles in
/// the background and shows up on the next `GET /api/history`.
pub async fn post_feedback(
    State(state): State<SharedState>,
    Path(id): Path<PredictionId>,
    Json(form): Json<FeedbackForm>,
) -> Result<(StatusCode, Json<HistoryRow>), HandlerError> {
    let ticket = crate::panels::begin_feedback(&state, id, &form.label)
        .await
        .map_err(|e| match e {
            FeedbackError::InvalidLabel(_) => handler_error(StatusCode::BAD_REQUEST, e.to_string()),
            FeedbackError::UnknownPrediction(_) => handler_error(StatusCode::NOT_FOUND, e.to_string()),
        })?;

    let status = match ticket {
        Some(ticket) => {
            let st = state.clone();
            tokio::spawn(async move {
                crate::panels::settle_feedback(&st, ticket).await;
            });
            StatusCode::ACCEPTED
        }
        None => {
            debug!(prediction_id = id, "feedback: no selection, ignored");
            StatusCode::OK
        }
    };

    let view = state.history.read().await;
    let row = view
        .rows
        .data
        .as_ref()
        .and_then(|recs| recs.iter().find(|r| r.id == id))
        .map(|r| to_row(&view, r))
        .ok_or_else(|| {
            handler_error(StatusCode::NOT_FOUND, FeedbackError::UnknownPrediction(id).to_string())
        })?;
    Ok((status, Json(row)))
}
