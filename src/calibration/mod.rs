pub mod isotonic;
pub mod platt;
pub mod quality;
pub mod smoothing;

pub use isotonic::IsotonicCalibrator;
pub use platt::PlattScaler;
pub use quality::{CalibrationReport, ReliabilityBin, DEFAULT_QUALITY_BINS};
pub use smoothing::SmoothingState;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EngineError;
use crate::model::prediction::PredictionRecord;
use crate::model::signal::{CalibratedSignal, Side};

/// Which fitted mapping converts raw confidence into a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalibrationMode {
    Platt,
    Isotonic,
}

impl fmt::Display for CalibrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationMode::Platt => f.write_str("platt"),
            CalibrationMode::Isotonic => f.write_str("isotonic"),
        }
    }
}

impl FromStr for CalibrationMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "platt" => Ok(CalibrationMode::Platt),
            "isotonic" => Ok(CalibrationMode::Isotonic),
            other => Err(EngineError::UnknownCalibrationMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalibratorConfig {
    pub mode: CalibrationMode,
    pub platt: PlattScaler,
    /// EWMA smoothing factor for per-symbol confidence.
    pub smoothing_alpha: f64,
    /// Symmetric dead zone on raw_value below which the side is HOLD.
    pub dead_zone: f64,
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            mode: CalibrationMode::Platt,
            platt: PlattScaler::default(),
            smoothing_alpha: 0.3,
            dead_zone: 0.02,
        }
    }
}

/// Maps raw model confidence to calibrated probability and assigns the
/// trade side. Smoothing state is owned by the caller and passed in.
#[derive(Debug, Clone)]
pub struct Calibrator {
    cfg: CalibratorConfig,
    isotonic: Option<IsotonicCalibrator>,
}

impl Calibrator {
    pub fn new(cfg: CalibratorConfig) -> Self {
        if cfg.mode == CalibrationMode::Isotonic {
            warn!("isotonic mode selected without a fitted mapping; falling back to Platt until one is installed");
        }
        Self { cfg, isotonic: None }
    }

    /// Install a fitted isotonic mapping (used when mode is `isotonic`).
    pub fn with_isotonic(mut self, mapping: IsotonicCalibrator) -> Self {
        self.isotonic = Some(mapping);
        self
    }

    pub fn mode(&self) -> CalibrationMode {
        self.cfg.mode
    }

    /// Apply the fitted mapping to a raw confidence.
    pub fn calibrate_confidence(&self, raw_confidence: f64) -> f64 {
        match (self.cfg.mode, &self.isotonic) {
            (CalibrationMode::Isotonic, Some(iso)) => iso.apply(raw_confidence),
            _ => self.cfg.platt.apply(raw_confidence),
        }
    }

    /// Calibrate one validated record, advancing the per-symbol EWMA.
    pub fn calibrate(
        &self,
        record: &PredictionRecord,
        state: &mut SmoothingState,
        now: DateTime<Utc>,
    ) -> CalibratedSignal {
        let calibrated = self.calibrate_confidence(record.raw_confidence);
        let smoothed = state.smooth(&record.symbol, calibrated, self.cfg.smoothing_alpha);
        CalibratedSignal {
            symbol: record.symbol.clone(),
            horizon: record.horizon,
            raw_value: record.raw_value,
            calibrated_confidence: calibrated,
            smoothed_confidence: smoothed,
            side: Side::from_raw_value(record.raw_value, self.cfg.dead_zone),
            computed_at: now,
        }
    }

    /// Calibration quality over labeled history (Brier, ECE, reliability).
    pub fn quality_report(&self, pairs: &[(f64, bool)]) -> CalibrationReport {
        CalibrationReport::from_pairs(pairs, DEFAULT_QUALITY_BINS)
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new(CalibratorConfig::default())
    }
}
