use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::prediction::{Horizon, PredictionRecord};

/// Stable taxonomy for why a raw prediction record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReasonCode {
    ValueOutOfRange,
    ConfidenceOutOfRange,
    EmptySymbol,
    Expired,
    Superseded,
}

impl DropReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValueOutOfRange => "validator.value_out_of_range",
            Self::ConfidenceOutOfRange => "validator.confidence_out_of_range",
            Self::EmptySymbol => "validator.empty_symbol",
            Self::Expired => "validator.expired",
            Self::Superseded => "validator.superseded",
        }
    }
}

/// Filter a raw batch down to the well-formed, non-expired, latest record
/// per (symbol, horizon).
///
/// Bad records are dropped, never fatal: the output may be empty but this
/// function cannot fail.
pub fn validate_batch(records: &[PredictionRecord], now: DateTime<Utc>) -> Vec<PredictionRecord> {
    let mut latest: HashMap<(String, Horizon), PredictionRecord> = HashMap::new();
    for record in records {
        if let Some(reason) = check_record(record, now) {
            debug!(
                symbol = %record.symbol,
                horizon = %record.horizon,
                reason = reason.as_str(),
                "Dropped prediction record"
            );
            continue;
        }
        let key = (record.symbol.clone(), record.horizon);
        match latest.get(&key) {
            Some(kept) if kept.generated_at >= record.generated_at => {
                debug!(
                    symbol = %record.symbol,
                    horizon = %record.horizon,
                    reason = DropReasonCode::Superseded.as_str(),
                    "Dropped prediction record"
                );
            }
            _ => {
                latest.insert(key, record.clone());
            }
        }
    }

    let mut out: Vec<PredictionRecord> = latest.into_values().collect();
    // Deterministic output order regardless of hash-map iteration.
    out.sort_by(|a, b| a.symbol.cmp(&b.symbol).then(a.horizon.cmp(&b.horizon)));
    out
}

fn check_record(record: &PredictionRecord, now: DateTime<Utc>) -> Option<DropReasonCode> {
    if record.symbol.trim().is_empty() {
        return Some(DropReasonCode::EmptySymbol);
    }
    if !record.raw_value.is_finite() || !(-1.0..=1.0).contains(&record.raw_value) {
        return Some(DropReasonCode::ValueOutOfRange);
    }
    if !record.raw_confidence.is_finite() || !(0.0..=1.0).contains(&record.raw_confidence) {
        return Some(DropReasonCode::ConfidenceOutOfRange);
    }
    if record.is_expired(now) {
        return Some(DropReasonCode::Expired);
    }
    None
}
