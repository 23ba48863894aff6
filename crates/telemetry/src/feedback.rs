//! Optimistic ground-truth edits on prediction rows.
//!
//! A row moves `Unlabeled -> Pending(L) -> Labeled(L) | Unlabeled`. The
//! label is written to the row as soon as the edit begins; the server's
//! answer either keeps it or clears it. Every edit carries a sequence
//! number and only the newest outstanding edit for a row may settle it.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::api::{ApiError, ApiResult};
use crate::schema::{Label, PredictionId, PredictionRecord};

/// Selector value meaning "leave the row alone".
pub const NO_SELECTION: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error("invalid label {0:?}: expected pass or fail")]
    InvalidLabel(String),

    #[error("prediction {0} is not in this view")]
    UnknownPrediction(PredictionId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LabelState {
    Unlabeled,
    Pending { label: Label, seq: u64 },
    Labeled { label: Label },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditTicket {
    pub prediction_id: PredictionId,
    pub label: Label,
    seq: u64,
}

impl EditTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    Confirmed(Label),
    RolledBack(ApiError),
    /// A newer edit for the same row is outstanding; this answer is ignored.
    Superseded,
}

/// `"unknown"` (or blank) is no selection; otherwise the value must be a label.
pub fn parse_selection(value: &str) -> Result<Option<Label>, FeedbackError> {
    let v = value.trim();
    if v.is_empty() || v == NO_SELECTION {
        return Ok(None);
    }
    v.parse::<Label>()
        .map(Some)
        .map_err(|_| FeedbackError::InvalidLabel(v.to_string()))
}

#[derive(Debug, Default)]
pub struct FeedbackLedger {
    next_seq: u64,
    pending: HashMap<PredictionId, (Label, u64)>,
}

impl FeedbackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, rec: &PredictionRecord) -> LabelState {
        if let Some(&(label, seq)) = self.pending.get(&rec.id) {
            return LabelState::Pending { label, seq };
        }
        match rec.actual_label {
            Some(label) => LabelState::Labeled { label },
            None => LabelState::Unlabeled,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Writes `label` to the row immediately and returns the ticket the
    /// caller settles once the server answers.
    pub fn begin(
        &mut self,
        records: &mut [PredictionRecord],
        prediction_id: PredictionId,
        label: Label,
    ) -> Result<EditTicket, FeedbackError> {
        let rec = records
            .iter_mut()
            .find(|r| r.id == prediction_id)
            .ok_or(FeedbackError::UnknownPrediction(prediction_id))?;

        self.next_seq += 1;
        let seq = self.next_seq;
        rec.actual_label = Some(label);
        self.pending.insert(prediction_id, (label, seq));

        Ok(EditTicket { prediction_id, label, seq })
    }

    pub fn settle(
        &mut self,
        records: &mut [PredictionRecord],
        ticket: EditTicket,
        outcome: ApiResult<()>,
    ) -> Settlement {
        match self.pending.get(&ticket.prediction_id) {
            Some(&(_, seq)) if seq == ticket.seq => {
                self.pending.remove(&ticket.prediction_id);
            }
            _ => return Settlement::Superseded,
        }

        let row = records.iter_mut().find(|r| r.id == ticket.prediction_id);
        match outcome {
            Ok(()) => {
                if let Some(rec) = row {
                    rec.actual_label = Some(ticket.label);
                }
                Settlement::Confirmed(ticket.label)
            }
            Err(e) => {
                // back to absent, never to an earlier label
                if let Some(rec) = row {
                    rec.actual_label = None;
                }
                Settlement::RolledBack(e)
            }
        }
    }

    /// Re-applies outstanding edits to freshly fetched rows so a reload
    /// does not flash the old label while a submission is in flight.
    pub fn overlay(&self, records: &mut [PredictionRecord]) {
        for rec in records.iter_mut() {
            if let Some(&(label, _)) = self.pending.get(&rec.id) {
                rec.actual_label = Some(label);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(id: PredictionId, actual: Option<Label>) -> PredictionRecord {
        PredictionRecord {
            id,
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(8, 0, 0).unwrap(),
            features: vec![0.1, 0.2],
            input_hash: None,
            predicted: Label::Pass,
            confidence: 0.7,
            actual_label: actual,
        }
    }

    fn rejected() -> ApiError {
        ApiError::Status { status: 500, message: Some("db locked".into()) }
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("unknown"), Ok(None));
        assert_eq!(parse_selection(""), Ok(None));
        assert_eq!(parse_selection("pass"), Ok(Some(Label::Pass)));
        assert_eq!(parse_selection("fail"), Ok(Some(Label::Fail)));
        assert_eq!(parse_selection("maybe"), Err(FeedbackError::InvalidLabel("maybe".into())));
    }

    #[test]
    fn test_optimistic_then_confirmed() {
        let mut rows = vec![row(1, None)];
        let mut ledger = FeedbackLedger::new();

        let t = ledger.begin(&mut rows, 1, Label::Pass).unwrap();
        assert_eq!(rows[0].actual_label, Some(Label::Pass));
        assert_eq!(ledger.state_of(&rows[0]), LabelState::Pending { label: Label::Pass, seq: t.seq() });

        assert_eq!(ledger.settle(&mut rows, t, Ok(())), Settlement::Confirmed(Label::Pass));
        assert_eq!(ledger.state_of(&rows[0]), LabelState::Labeled { label: Label::Pass });
        assert_eq!(ledger.pending_count(), 0);
    }

    #[test]
    fn test_failure_rolls_back_to_absent() {
        let mut rows = vec![row(1, None)];
        let mut ledger = FeedbackLedger::new();

        let t = ledger.begin(&mut rows, 1, Label::Pass).unwrap();
        let s = ledger.settle(&mut rows, t, Err(rejected()));

        assert_eq!(s, Settlement::RolledBack(rejected()));
        assert_eq!(rows[0].actual_label, None);
        assert_eq!(ledger.state_of(&rows[0]), LabelState::Unlabeled);
    }

    #[test]
    fn test_relabel_failure_clears_previous_label() {
        let mut rows = vec![row(1, Some(Label::Fail))];
        let mut ledger = FeedbackLedger::new();

        let t = ledger.begin(&mut rows, 1, Label::Pass).unwrap();
        ledger.settle(&mut rows, t, Err(ApiError::Transport("timeout".into())));
        assert_eq!(rows[0].actual_label, None);
    }

    #[test]
    fn test_stale_answer_is_ignored() {
        let mut rows = vec![row(1, None)];
        let mut ledger = FeedbackLedger::new();

        let first = ledger.begin(&mut rows, 1, Label::Pass).unwrap();
        let second = ledger.begin(&mut rows, 1, Label::Fail).unwrap();
        assert!(second.seq() > first.seq());

        // second answer arrives first
        assert_eq!(ledger.settle(&mut rows, second, Ok(())), Settlement::Confirmed(Label::Fail));
        // late failure of the first edit must not clear the newer label
        assert_eq!(ledger.settle(&mut rows, first, Err(rejected())), Settlement::Superseded);
        assert_eq!(rows[0].actual_label, Some(Label::Fail));
    }

    #[test]
    fn test_unknown_row() {
        let mut rows = vec![row(1, None)];
        let mut ledger = FeedbackLedger::new();
        assert_eq!(
            ledger.begin(&mut rows, 99, Label::Pass),
            Err(FeedbackError::UnknownPrediction(99))
        );
        assert_eq!(ledger.pending_count(), 0);
    }

    #[test]
    fn test_overlay_keeps_pending_label_across_reload() {
        let mut rows = vec![row(1, None), row(2, None)];
        let mut ledger = FeedbackLedger::new();
        let t = ledger.begin(&mut rows, 2, Label::Fail).unwrap();

        let mut fresh = vec![row(3, None), row(2, None), row(1, None)];
        ledger.overlay(&mut fresh);
        assert_eq!(fresh[1].actual_label, Some(Label::Fail));
        assert_eq!(fresh[0].actual_label, None);

        ledger.settle(&mut fresh, t, Ok(()));
        assert_eq!(fresh[1].actual_label, Some(Label::Fail));
    }
}
