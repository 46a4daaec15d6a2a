use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::prediction::Horizon;

/// Trade direction derived from a prediction's raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
    Hold,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
            Side::Hold => "HOLD",
        }
    }

    /// Classify a raw value against a symmetric dead zone.
    pub fn from_raw_value(raw_value: f64, dead_zone: f64) -> Self {
        if raw_value >= dead_zone {
            Side::Buy
        } else if raw_value <= -dead_zone {
            Side::Sell
        } else {
            Side::Hold
        }
    }
}

/// A prediction after calibration and smoothing.
///
/// Recomputed every cycle; `smoothed_confidence` is the only field that
/// carries state forward (per-symbol EWMA owned by the calibrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratedSignal {
    pub symbol: String,
    pub horizon: Horizon,
    /// Directional raw value retained for consensus tie-breaking.
    pub raw_value: f64,
    pub calibrated_confidence: f64,
    pub smoothed_confidence: f64,
    pub side: Side,
    pub computed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_from_raw_value_with_dead_zone() {
        assert_eq!(Side::from_raw_value(0.02, 0.02), Side::Buy);
        assert_eq!(Side::from_raw_value(-0.02, 0.02), Side::Sell);
        assert_eq!(Side::from_raw_value(0.019, 0.02), Side::Hold);
        assert_eq!(Side::from_raw_value(-0.019, 0.02), Side::Hold);
        assert_eq!(Side::from_raw_value(0.0, 0.02), Side::Hold);
    }
}
