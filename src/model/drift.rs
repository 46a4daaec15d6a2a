use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a drift measurement covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftScope {
    Global,
    Symbol(String),
}

impl DriftScope {
    pub fn label(&self) -> &str {
        match self {
            DriftScope::Global => "global",
            DriftScope::Symbol(s) => s.as_str(),
        }
    }
}

/// Bounded drift reading for one scope.
///
/// `raw_drift` keeps the uncapped value for diagnostics; `normalized_drift`
/// is what display/consensus consumers are allowed to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftMetric {
    pub scope: DriftScope,
    pub raw_drift: f64,
    pub normalized_drift: f64,
    pub is_outlier: bool,
    pub measured_at: DateTime<Utc>,
}
