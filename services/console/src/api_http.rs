use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use telemetry::{
    ApiError, ApiResult, DriftReport, ErrorBody, FeedbackRequest, HealthReport, Label,
    MetricsSnapshot, MonitorApi, PredictRequest, PredictionId, PredictionOutcome,
    PredictionRecord, SampleFeatures,
};
use tracing::debug;

/// `MonitorApi` over HTTP. Timeouts are the client's; nothing above
/// this layer imposes one.
pub struct HttpMonitorApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMonitorApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        debug!(path, "api: GET");
        let resp = self.client.get(self.url(path)).send().await.map_err(transport)?;
        read_json(resp).await
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

async fn fail_status(resp: reqwest::Response) -> ApiError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body).ok().and_then(|b| b.error);
    ApiError::Status { status, message }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> ApiResult<T> {
    if !resp.status().is_success() {
        return Err(fail_status(resp).await);
    }
    resp.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            transport(e)
        }
    })
}

#[async_trait]
impl MonitorApi for HttpMonitorApi {
    async fn health(&self) -> ApiResult<HealthReport> {
        debug!("api: GET /health");
        let resp = self.client.get(self.url("/health")).send().await.map_err(transport)?;
        if !resp.status().is_success() {
            return Err(fail_status(resp).await);
        }
        // any 2xx is healthy; the body is informational
        let bytes = resp.bytes().await.map_err(transport)?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }

    async fn predict(&self, features: &[f64]) -> ApiResult<PredictionOutcome> {
        debug!(n_features = features.len(), "api: POST /predict");
        let body = PredictRequest { features: features.to_vec() };
        let resp = self
            .client
            .post(self.url("/predict"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        read_json(resp).await
    }

    async fn list_predictions(&self, n: NonZeroU32) -> ApiResult<Vec<PredictionRecord>> {
        self.get_json(&format!("/predictions?n={n}")).await
    }

    async fn metrics(&self) -> ApiResult<MetricsSnapshot> {
        self.get_json("/metrics").await
    }

    async fn drift(&self) -> ApiResult<DriftReport> {
        self.get_json("/drift").await
    }

    async fn sample(&self) -> ApiResult<SampleFeatures> {
        self.get_json("/sample").await
    }

    async fn submit_feedback(&self, prediction_id: PredictionId, actual_label: Label) -> ApiResult<()> {
        debug!(prediction_id, label = %actual_label, "api: POST /feedback");
        let body = FeedbackRequest { prediction_id, actual_label };
        let resp = self
            .client
            .post(self.url("/feedback"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(fail_status(resp).await);
        }
        Ok(())
    }
}
