use std::sync::Arc;

use telemetry::{
    ConnectivityBadge, DriftReport, FeedbackLedger, MetricsSnapshot, MonitorApi,
    PredictionOutcome, PredictionRecord, SampleFeatures, ViewState,
};
use tokio::sync::RwLock;

use crate::config::ConsoleConfig;

pub type SharedState = Arc<ConsoleState>;

#[derive(Default)]
pub struct DashboardView {
    pub metrics: ViewState<MetricsSnapshot>,
    pub recent: ViewState<Vec<PredictionRecord>>,
}

/// History rows are this view's own copy; the dashboard does not see
/// feedback edits until its next poll.
#[derive(Default)]
pub struct HistoryView {
    pub rows: ViewState<Vec<PredictionRecord>>,
    pub ledger: FeedbackLedger,
    pub feedback_error: Option<String>,
}

#[derive(Default)]
pub struct PredictView {
    pub result: ViewState<PredictionOutcome>,
    pub sample: ViewState<SampleFeatures>,
}

pub struct ConsoleState {
    pub api: Arc<dyn MonitorApi>,
    pub config: ConsoleConfig,
    pub badge: RwLock<ConnectivityBadge>,
    pub dashboard: RwLock<DashboardView>,
    pub history: RwLock<HistoryView>,
    pub drift: RwLock<ViewState<DriftReport>>,
    pub predict: RwLock<PredictView>,
}

impl ConsoleState {
    pub fn new(api: Arc<dyn MonitorApi>, config: ConsoleConfig) -> Self {
        Self {
            api,
            config,
            badge: RwLock::new(ConnectivityBadge::default()),
            dashboard: RwLock::new(DashboardView::default()),
            history: RwLock::new(HistoryView::default()),
            drift: RwLock::new(ViewState::new()),
            predict: RwLock::new(PredictView::default()),
        }
    }
}
