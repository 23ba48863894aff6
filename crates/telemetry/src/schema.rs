use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Server-assigned prediction row id.
pub type PredictionId = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Pass,
    Fail,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Pass => "pass",
            Label::Fail => "fail",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown label: {0:?}")]
pub struct UnknownLabel(pub String);

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pass" => Ok(Label::Pass),
            "fail" => Ok(Label::Fail),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

/// One logged prediction, as returned by `GET /predictions`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: PredictionId,
    pub timestamp: NaiveDateTime,    // backend writes local time, no offset
    #[serde(default)]
    pub features: Vec<f64>,
    #[serde(default)]
    pub input_hash: Option<String>,
    #[serde(rename = "prediction")]
    pub predicted: Label,
    pub confidence: f64,             // 0.0..1.0
    #[serde(default)]
    pub actual_label: Option<Label>, // set only through feedback
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub pass_count: u64,
    pub fail_count: u64,
    #[serde(default)]
    pub total_predictions: Option<u64>,
    #[serde(default)]
    pub pass_rate: Option<f64>,
    #[serde(default)]
    pub fail_rate: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftedFeature {
    pub feature_index: usize,
    pub ks_statistic: f64,
    pub p_value: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    #[serde(default)]
    pub drift_score: Option<f64>,
    #[serde(default)]
    pub drift_detected: bool,
    #[serde(default)]
    pub features_tested: Option<usize>,
    #[serde(default)]
    pub features_drifted: Option<usize>,
    /// Worst offenders first, at most 10.
    #[serde(default)]
    pub drifted_features: Vec<DriftedFeature>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub n_features: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub prediction: Label,
    pub confidence: f64,
    #[serde(default)]
    pub id: Option<PredictionId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleFeatures {
    pub features: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub prediction_id: PredictionId,
    pub actual_label: Label,
}

/// Body the backend attaches to non-2xx responses.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_parses_backend_row() {
        let row = r#"{
            "id": 7,
            "timestamp": "2024-03-01T10:15:30.123456",
            "input_hash": "ab12",
            "prediction": "fail",
            "confidence": 0.91,
            "actual_label": null
        }"#;
        let rec: PredictionRecord = serde_json::from_str(row).unwrap();
        assert_eq!(rec.id, 7);
        assert_eq!(rec.predicted, Label::Fail);
        assert_eq!(rec.actual_label, None);
        assert!(rec.features.is_empty());
    }

    #[test]
    fn test_metrics_tolerates_missing_extras() {
        let m: MetricsSnapshot = serde_json::from_str(r#"{"pass_count": 3, "fail_count": 1}"#).unwrap();
        assert_eq!(m.pass_count, 3);
        assert_eq!(m.total_predictions, None);
    }

    #[test]
    fn test_label_from_str() {
        assert_eq!("pass".parse::<Label>(), Ok(Label::Pass));
        assert_eq!(" fail ".parse::<Label>(), Ok(Label::Fail));
        assert!("maybe".parse::<Label>().is_err());
    }
}
