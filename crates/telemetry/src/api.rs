use std::num::NonZeroU32;

use async_trait::async_trait;
use thiserror::Error;

use crate::schema::{
    DriftReport, HealthReport, Label, MetricsSnapshot, PredictionId, PredictionOutcome,
    PredictionRecord, SampleFeatures,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no error detail"))]
    Status { status: u16, message: Option<String> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Diagnostic text supplied by the server, if it sent any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Boundary to the prediction backend.
///
/// Every call is exactly one round trip: no retries, no caching. Policy
/// (fallback messages, polling, rollback) lives with the callers.
#[async_trait]
pub trait MonitorApi: Send + Sync {
    async fn health(&self) -> ApiResult<HealthReport>;
    /// `features` is validated by the caller.
    async fn predict(&self, features: &[f64]) -> ApiResult<PredictionOutcome>;
    /// Most recent first.
    async fn list_predictions(&self, n: NonZeroU32) -> ApiResult<Vec<PredictionRecord>>;
    async fn metrics(&self) -> ApiResult<MetricsSnapshot>;
    async fn drift(&self) -> ApiResult<DriftReport>;
    async fn sample(&self) -> ApiResult<SampleFeatures>;
    async fn submit_feedback(&self, prediction_id: PredictionId, actual_label: Label) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_prefers_server_text() {
        let e = ApiError::Status { status: 400, message: Some("wrong feature count".into()) };
        assert_eq!(e.message_or("Prediction failed"), "wrong feature count");
    }

    #[test]
    fn test_message_falls_back() {
        let blank = ApiError::Status { status: 500, message: Some("  ".into()) };
        assert_eq!(blank.message_or("Could not reach the API"), "Could not reach the API");

        let net = ApiError::Transport("connection refused".into());
        assert_eq!(net.message_or("Could not reach the API"), "Could not reach the API");
    }
}
