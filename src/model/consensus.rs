use serde::{Deserialize, Serialize};

use crate::model::prediction::Horizon;
use crate::model::signal::Side;

/// One horizon's contribution to a symbol's consensus vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonVote {
    pub horizon: Horizon,
    pub side: Side,
}

/// Cross-horizon verdict for one symbol, rebuilt every cycle from the
/// non-expired calibrated signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub symbol: String,
    /// Horizon of the representative signal (highest calibrated confidence,
    /// tie-broken by largest |raw_value|).
    pub horizon: Horizon,
    pub votes: Vec<HorizonVote>,
    pub consensus_side: Side,
    /// Majority vote share in [0, 1].
    pub agreement_score: f64,
    /// Representative signal's calibrated confidence.
    pub confidence: f64,
    /// True when BUY and SELL votes coexist across >= 2 horizons.
    pub is_divergent: bool,
}

impl ConsensusResult {
    /// Confidence discounted by how much the horizons agree; this is the
    /// ranking key the risk filter uses.
    pub fn weighted_confidence(&self) -> f64 {
        self.agreement_score * self.confidence
    }
}
