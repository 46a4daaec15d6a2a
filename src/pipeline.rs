use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::calibration::{Calibrator, IsotonicCalibrator, SmoothingState};
use crate::config::Config;
use crate::consensus;
use crate::drift::{AccuracyWindow, DriftTracker};
use crate::model::consensus::ConsensusResult;
use crate::model::drift::{DriftMetric, DriftScope};
use crate::model::portfolio::PortfolioAllocation;
use crate::model::prediction::PredictionRecord;
use crate::model::signal::CalibratedSignal;
use crate::portfolio::{PortfolioOptimizer, ReturnPanel};
use crate::risk::{self, PositionPlan, RiskProfile};
use crate::validator;

/// Everything one pipeline pass needs beyond the engine's own state. The
/// engine performs no I/O; the caller supplies predictions, prices, return
/// history, and the accuracy baseline.
#[derive(Debug)]
pub struct PassInput<'a> {
    pub records: &'a [PredictionRecord],
    pub entry_prices: &'a HashMap<String, f64>,
    pub returns: &'a ReturnPanel,
    /// Reference accuracy the drift tracker compares against (e.g. the
    /// 30-day average).
    pub baseline_accuracy: f64,
}

/// Snapshot of one full pipeline pass. Plain data, serializable, no
/// behavior: the output contract toward any presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct EnginePass {
    /// Newest `generated_at` among the surviving input records; callers use
    /// it to discard out-of-order passes.
    pub generated_at: DateTime<Utc>,
    pub signals: Vec<CalibratedSignal>,
    pub drift: Vec<DriftMetric>,
    pub consensus: Vec<ConsensusResult>,
    pub positions: Vec<PositionPlan>,
    pub allocation: PortfolioAllocation,
}

/// The full analytics pipeline. Owns exactly two pieces of cross-cycle
/// state, both explicitly keyed: the calibrator's per-symbol EWMA and the
/// per-scope accuracy windows the drift tracker reads.
#[derive(Debug, Clone)]
pub struct Engine {
    calibrator: Calibrator,
    tracker: DriftTracker,
    profile: RiskProfile,
    optimizer: PortfolioOptimizer,
    equity: f64,
    window_len: usize,
    smoothing: SmoothingState,
    symbol_accuracy: BTreeMap<String, AccuracyWindow>,
    global_accuracy: AccuracyWindow,
}

impl Engine {
    pub fn from_config(config: &Config) -> Self {
        let window_len = config.drift.window_len;
        Self {
            calibrator: Calibrator::new(config.calibrator_config()),
            tracker: DriftTracker::new(config.drift_config()),
            profile: config.risk_profile(),
            optimizer: PortfolioOptimizer::new(config.portfolio_config()),
            equity: config.engine.equity,
            window_len,
            smoothing: SmoothingState::new(),
            symbol_accuracy: BTreeMap::new(),
            global_accuracy: AccuracyWindow::new(window_len),
        }
    }

    /// Install a fitted isotonic mapping on the calibrator.
    pub fn with_isotonic(mut self, mapping: IsotonicCalibrator) -> Self {
        self.calibrator = self.calibrator.with_isotonic(mapping);
        self
    }

    pub fn profile(&self) -> &RiskProfile {
        &self.profile
    }

    /// Feed one realized outcome for a symbol's prediction into the drift
    /// history (1.0 for a hit, 0.0 for a miss).
    pub fn record_outcome(&mut self, symbol: &str, hit: bool) {
        let accuracy = if hit { 1.0 } else { 0.0 };
        self.symbol_accuracy
            .entry(symbol.to_string())
            .or_insert_with(|| AccuracyWindow::new(self.window_len))
            .push(accuracy);
        self.global_accuracy.push(accuracy);
    }

    /// Run one synchronous pass: validate, calibrate, measure drift,
    /// aggregate consensus, filter by risk profile, optimize allocation.
    ///
    /// Identical inputs plus identical prior state produce identical
    /// output; `now` is an argument rather than sampled so replays are
    /// exact.
    pub fn run_pass(&mut self, input: &PassInput<'_>, now: DateTime<Utc>) -> EnginePass {
        let validated = validator::validate_batch(input.records, now);
        debug!(
            received = input.records.len(),
            kept = validated.len(),
            "Validated prediction batch"
        );

        let signals: Vec<CalibratedSignal> = validated
            .iter()
            .map(|record| self.calibrator.calibrate(record, &mut self.smoothing, now))
            .collect();

        let drift = self.measure_drift(input.baseline_accuracy, now);

        let consensus = consensus::aggregate_all(&signals);
        let filtered = risk::filter_candidates(&consensus, &self.profile);
        let positions =
            risk::plan_positions(&filtered, self.equity, input.entry_prices, &self.profile);

        let candidate_symbols: Vec<String> =
            positions.iter().map(|p| p.symbol.clone()).collect();
        let allocation = self.optimizer.optimize(&candidate_symbols, input.returns);

        let generated_at = validated
            .iter()
            .map(|r| r.generated_at)
            .max()
            .unwrap_or(now);

        info!(
            signals = signals.len(),
            consensus = consensus.len(),
            positions = positions.len(),
            weights = allocation.weights.len(),
            "Pipeline pass complete"
        );

        EnginePass {
            generated_at,
            signals,
            drift,
            consensus,
            positions,
            allocation,
        }
    }

    fn measure_drift(&self, baseline: f64, now: DateTime<Utc>) -> Vec<DriftMetric> {
        let mut out = Vec::new();
        if let Some(metric) =
            self.tracker
                .measure(DriftScope::Global, &self.global_accuracy, baseline, now)
        {
            out.push(metric);
        }
        for (symbol, window) in &self.symbol_accuracy {
            if let Some(metric) = self.tracker.measure(
                DriftScope::Symbol(symbol.clone()),
                window,
                baseline,
                now,
            ) {
                out.push(metric);
            }
        }
        out
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
