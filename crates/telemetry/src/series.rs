//! Chart-ready series derived from backend snapshots.
//!
//! Everything here is pure: same input, same output, no I/O.

use serde::Serialize;

use crate::schema::{Label, MetricsSnapshot, PredictionRecord};

pub const COUNT_LABELS: [&str; 2] = ["Pass", "Fail"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CountSeries {
    pub labels: [&'static str; 2],
    pub counts: [u64; 2],
}

impl CountSeries {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Confidence per prediction, split by predicted label.
///
/// `pass`, `fail` and `labels` always have the same length and at every
/// index exactly one of `pass[i]`/`fail[i]` is `Some`. `None` is
/// serialized as `null` so the chart draws a gap instead of a zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ConfidenceSeries {
    pub labels: Vec<String>,
    pub pass: Vec<Option<f64>>,
    pub fail: Vec<Option<f64>>,
}

impl ConfidenceSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LabelBreakdown {
    pub predicted_pass: usize,
    pub predicted_fail: usize,
    pub labeled: usize,
    pub unlabeled: usize,
    /// Labeled rows whose actual label matches the prediction.
    pub agreed: usize,
}

pub fn pass_fail_counts(metrics: &MetricsSnapshot) -> CountSeries {
    CountSeries {
        labels: COUNT_LABELS,
        counts: [metrics.pass_count, metrics.fail_count],
    }
}

/// `records` arrive newest first; the series reads oldest first.
pub fn confidence_series(records: &[PredictionRecord]) -> ConfidenceSeries {
    let mut out = ConfidenceSeries {
        labels: Vec::with_capacity(records.len()),
        pass: Vec::with_capacity(records.len()),
        fail: Vec::with_capacity(records.len()),
    };

    for (i, rec) in records.iter().rev().enumerate() {
        out.labels.push(format!("#{}", i + 1));
        match rec.predicted {
            Label::Pass => {
                out.pass.push(Some(rec.confidence));
                out.fail.push(None);
            }
            Label::Fail => {
                out.pass.push(None);
                out.fail.push(Some(rec.confidence));
            }
        }
    }
    out
}

/// Fractional drift score as a percentage with one decimal, e.g. `"12.3"`.
pub fn drift_pct(score: Option<f64>) -> String {
    let score = score.filter(|s| s.is_finite()).unwrap_or(0.0);
    format!("{:.1}", score * 100.0)
}

pub fn label_breakdown(records: &[PredictionRecord]) -> LabelBreakdown {
    let mut b = LabelBreakdown::default();
    for rec in records {
        match rec.predicted {
            Label::Pass => b.predicted_pass += 1,
            Label::Fail => b.predicted_fail += 1,
        }
        match rec.actual_label {
            Some(actual) => {
                b.labeled += 1;
                if actual == rec.predicted {
                    b.agreed += 1;
                }
            }
            None => b.unlabeled += 1,
        }
    }
    b
}
