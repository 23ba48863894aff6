//! Refresh logic for each console view: fetch, transform, apply.

use std::future::Future;
use std::time::Duration;

use telemetry::{
    parse_selection, spawn_polling, validate_features, ApiResult, Connectivity, EditTicket,
    FeedbackError, Lifetime, MetricsSnapshot, PollHandle, PredictionId, PredictionOutcome,
    PredictionRecord, Settlement, ValidationError, ViewState,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::state::{ConsoleState, DashboardView, SharedState};

pub const POLL_EVERY: Duration = Duration::from_secs(30);

pub const MSG_UNREACHABLE: &str = "Could not reach the API";
pub const MSG_HISTORY: &str = "Could not load predictions";
pub const MSG_PREDICT: &str = "Prediction failed";
pub const MSG_SAMPLE: &str = "Could not load sample data";

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{0}")]
    Upstream(String),
}

pub async fn check_connection(state: &ConsoleState) -> Connectivity {
    let ticket = state.badge.write().await.begin_check();
    let healthy = match state.api.health().await {
        Ok(h) => {
            info!(model_loaded = h.model_loaded, "status: connected");
            true
        }
        Err(e) => {
            warn!(error = %e, "status: disconnected");
            false
        }
    };
    let mut badge = state.badge.write().await;
    badge.settle(ticket, healthy);
    badge.state()
}

// --- dashboard ---

pub fn activate_dashboard(state: SharedState) -> PollHandle {
    spawn_polling("dashboard", POLL_EVERY, move |life| refresh_dashboard(state.clone(), life))
}

/// Cancels under the view lock, so a refresh holding results either
/// wrote them already or sees the ended lifetime and drops them.
pub async fn deactivate_dashboard(state: &ConsoleState, handle: PollHandle) {
    {
        let _view = state.dashboard.write().await;
        handle.cancel();
    }
    handle.shutdown().await;
}

/// One polling cycle. Metrics are requested before predictions; each
/// result is applied as soon as it arrives.
pub async fn refresh_dashboard(state: SharedState, life: Lifetime) {
    let rows = state.config.dashboard_rows;
    tokio::join!(
        refresh_slot(&state, &life, "metrics", metrics_slot, state.api.metrics()),
        refresh_slot(&state, &life, "predictions", recent_slot, state.api.list_predictions(rows)),
    );
}

fn metrics_slot(view: &mut DashboardView) -> &mut ViewState<MetricsSnapshot> {
    &mut view.metrics
}

fn recent_slot(view: &mut DashboardView) -> &mut ViewState<Vec<PredictionRecord>> {
    &mut view.recent
}

async fn refresh_slot<T, F>(
    state: &ConsoleState,
    life: &Lifetime,
    what: &'static str,
    slot: fn(&mut DashboardView) -> &mut ViewState<T>,
    fetch: F,
) where
    F: Future<Output = ApiResult<T>>,
{
    let ticket = {
        let mut view = state.dashboard.write().await;
        if !life.is_active() {
            return;
        }
        slot(&mut *view).begin_fetch()
    };

    let outcome = fetch.await.map_err(|e| {
        warn!(view = "dashboard", what, error = %e, "fetch failed");
        e.message_or(MSG_UNREACHABLE)
    });

    let mut view = state.dashboard.write().await;
    if !life.is_active() {
        debug!(view = "dashboard", what, "discarding result after teardown");
        return;
    }
    if !slot(&mut *view).apply(ticket, outcome) {
        debug!(view = "dashboard", what, "discarding superseded result");
    }
}

// --- history ---

pub async fn reload_history(state: &ConsoleState) {
    let ticket = state.history.write().await.rows.begin_fetch();
    let fetched = state.api.list_predictions(state.config.history_rows).await;

    let mut view = state.history.write().await;
    let outcome = match fetched {
        Ok(mut rows) => {
            view.ledger.overlay(&mut rows);
            info!(rows = rows.len(), "history: loaded");
            Ok(rows)
        }
        Err(e) => {
            warn!(error = %e, "history: fetch failed");
            Err(e.message_or(MSG_HISTORY))
        }
    };
    view.rows.apply(ticket, outcome);
}

/// Applies the operator's selection optimistically. `Ok(None)` means the
/// selection was "no change" and nothing is submitted.
pub async fn begin_feedback(
    state: &ConsoleState,
    prediction_id: PredictionId,
    selection: &str,
) -> Result<Option<EditTicket>, FeedbackError> {
    let Some(label) = parse_selection(selection)? else {
        return Ok(None);
    };

    let mut guard = state.history.write().await;
    let view = &mut *guard;
    let rows = view
        .rows
        .data
        .as_mut()
        .ok_or(FeedbackError::UnknownPrediction(prediction_id))?;
    let ticket = view.ledger.begin(rows, prediction_id, label)?;
    debug!(prediction_id, label = %label, seq = ticket.seq(), "feedback: pending");
    Ok(Some(ticket))
}

pub async fn settle_feedback(state: &ConsoleState, ticket: EditTicket) -> Settlement {
    let outcome = state.api.submit_feedback(ticket.prediction_id, ticket.label).await;

    let mut guard = state.history.write().await;
    let view = &mut *guard;
    let mut no_rows = Vec::new();
    let rows = view.rows.data.as_mut().unwrap_or(&mut no_rows);
    let settlement = view.ledger.settle(rows, ticket, outcome);

    let id = ticket.prediction_id;
    match &settlement {
        Settlement::Confirmed(label) => {
            info!(prediction_id = id, label = %label, "feedback: confirmed");
            view.feedback_error = None;
        }
        Settlement::RolledBack(e) => {
            warn!(prediction_id = id, error = %e, "feedback: rolled back");
            view.feedback_error = Some(format!(
                "Feedback for prediction #{id} was not saved: {}",
                e.message_or(MSG_UNREACHABLE)
            ));
        }
        Settlement::Superseded => {
            debug!(prediction_id = id, seq = ticket.seq(), "feedback: superseded answer ignored");
        }
    }
    settlement
}

// --- drift ---

pub async fn reload_drift(state: &ConsoleState) {
    let ticket = state.drift.write().await.begin_fetch();
    let outcome = state.api.drift().await.map_err(|e| {
        warn!(error = %e, "drift: fetch failed");
        e.message_or(MSG_UNREACHABLE)
    });
    state.drift.write().await.apply(ticket, outcome);
}

// --- predict ---

pub async fn run_prediction(state: &ConsoleState, raw: &str) -> Result<PredictionOutcome, PredictError> {
    let (ticket, features) = {
        let mut view = state.predict.write().await;
        view.result.data = None;
        view.result.error.clear();
        match validate_features(raw) {
            Ok(features) => (view.result.begin_fetch(), features),
            Err(e) => {
                view.result.fail_locally(e.to_string());
                return Err(e.into());
            }
        }
    };

    match state.api.predict(&features).await {
        Ok(outcome) => {
            info!(prediction = %outcome.prediction, confidence = outcome.confidence, "predict: done");
            state.predict.write().await.result.apply(ticket, Ok(outcome.clone()));
            Ok(outcome)
        }
        Err(e) => {
            warn!(error = %e, "predict: failed");
            let msg = e.message_or(MSG_PREDICT);
            state.predict.write().await.result.apply(ticket, Err(msg.clone()));
            Err(PredictError::Upstream(msg))
        }
    }
}

/// Fetches a sample vector and returns it as editable JSON text.
pub async fn load_sample(state: &ConsoleState) -> Result<String, String> {
    let ticket = state.predict.write().await.sample.begin_fetch();
    let fetched = state.api.sample().await;

    let mut view = state.predict.write().await;
    match fetched {
        Ok(sample) => {
            let text = serde_json::to_string(&sample.features).map_err(|e| e.to_string())?;
            view.sample.apply(ticket, Ok(sample));
            view.result.error.clear();
            Ok(text)
        }
        Err(e) => {
            warn!(error = %e, "predict: sample fetch failed");
            let msg = e.message_or(MSG_SAMPLE);
            view.sample.apply(ticket, Err(msg.clone()));
            Err(msg)
        }
    }
}
