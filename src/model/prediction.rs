use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Prediction horizons supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Horizon {
    pub const ALL: [Horizon; 5] = [
        Horizon::M5,
        Horizon::M15,
        Horizon::H1,
        Horizon::H4,
        Horizon::D1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Horizon::M5 => "5m",
            Horizon::M15 => "15m",
            Horizon::H1 => "1h",
            Horizon::H4 => "4h",
            Horizon::D1 => "1d",
        }
    }

    /// How long a prediction at this horizon stays usable.
    pub fn ttl(self) -> Duration {
        match self {
            Horizon::M5 => Duration::minutes(20),
            Horizon::M15 => Duration::hours(1),
            Horizon::H1 => Duration::hours(4),
            Horizon::H4 => Duration::hours(12),
            Horizon::D1 => Duration::hours(72),
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5m" => Ok(Horizon::M5),
            "15m" => Ok(Horizon::M15),
            "1h" => Ok(Horizon::H1),
            "4h" => Ok(Horizon::H4),
            "1d" => Ok(Horizon::D1),
            other => Err(EngineError::UnknownHorizon(other.to_string())),
        }
    }
}

/// One raw model output for a (symbol, horizon) pair.
///
/// Immutable once created; the next generation cycle supersedes it with a
/// fresh record rather than mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub symbol: String,
    pub horizon: Horizon,
    /// Directional model output in [-1, 1].
    pub raw_value: f64,
    /// Uncalibrated model confidence in [0, 1].
    pub raw_confidence: f64,
    pub generated_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl PredictionRecord {
    /// Build a record whose `valid_until` follows the horizon TTL.
    pub fn new(
        symbol: impl Into<String>,
        horizon: Horizon,
        raw_value: f64,
        raw_confidence: f64,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            horizon,
            raw_value,
            raw_confidence,
            generated_at,
            valid_until: generated_at + horizon.ttl(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.valid_until
    }
}
