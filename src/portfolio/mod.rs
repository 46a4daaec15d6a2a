pub mod markowitz;
pub mod metrics;
pub mod returns;
pub mod sharpe;

pub use returns::ReturnPanel;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EngineError;
use crate::model::portfolio::{PortfolioAllocation, PortfolioMetrics, PortfolioWeight};

/// Any single weight above this is flagged (never auto-corrected).
pub const CONCENTRATION_LIMIT: f64 = 0.35;
/// Tolerance on the normalized weight sum.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizerObjective {
    MeanVariance,
    SharpeOptimal,
    RollingWindow,
}

impl fmt::Display for OptimizerObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerObjective::MeanVariance => f.write_str("mean-variance"),
            OptimizerObjective::SharpeOptimal => f.write_str("sharpe-optimal"),
            OptimizerObjective::RollingWindow => f.write_str("rolling-window"),
        }
    }
}

impl FromStr for OptimizerObjective {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean-variance" => Ok(OptimizerObjective::MeanVariance),
            "sharpe-optimal" => Ok(OptimizerObjective::SharpeOptimal),
            "rolling-window" => Ok(OptimizerObjective::RollingWindow),
            other => Err(EngineError::UnknownObjective(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub objective: OptimizerObjective,
    /// Trailing window (days) for rolling-window re-estimation.
    pub rolling_window_days: usize,
    pub min_weight: f64,
    pub max_weight: f64,
    pub risk_free_rate: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            objective: OptimizerObjective::MeanVariance,
            rolling_window_days: 90,
            min_weight: 0.05,
            max_weight: 0.30,
            risk_free_rate: 0.0,
        }
    }
}

/// Allocates weights across a ranked candidate set under the configured
/// objective, with documented fallbacks when estimates are unavailable.
#[derive(Debug, Clone, Default)]
pub struct PortfolioOptimizer {
    cfg: PortfolioConfig,
}

impl PortfolioOptimizer {
    pub fn new(cfg: PortfolioConfig) -> Self {
        Self { cfg }
    }

    pub fn objective(&self) -> OptimizerObjective {
        self.cfg.objective
    }

    pub fn optimize(&self, symbols: &[String], panel: &ReturnPanel) -> PortfolioAllocation {
        if symbols.is_empty() {
            return PortfolioAllocation {
                weights: Vec::new(),
                metrics: PortfolioMetrics {
                    expected_return: 0.0,
                    volatility: 0.0,
                    sharpe_ratio: 0.0,
                    max_drawdown: 0.0,
                },
                concentrated: false,
                equal_weight_fallback: false,
            };
        }

        // Rolling-window re-estimates on the trailing panel, then applies
        // the mean-variance objective.
        let (panel, objective) = match self.cfg.objective {
            OptimizerObjective::RollingWindow => (
                panel.trailing(self.cfg.rolling_window_days),
                OptimizerObjective::MeanVariance,
            ),
            other => (panel.clone(), other),
        };

        let means: Vec<f64> = symbols
            .iter()
            .map(|s| panel.mean_return(s).unwrap_or(0.0))
            .collect();
        let cov = panel.covariance_matrix(symbols);

        let raw = match (&cov, objective) {
            (Some(matrix), OptimizerObjective::MeanVariance) => {
                let target = means.iter().sum::<f64>() / means.len() as f64;
                markowitz::min_variance_weights(&means, matrix, target)
            }
            (Some(matrix), OptimizerObjective::SharpeOptimal) => sharpe::max_sharpe_weights(
                &means,
                matrix,
                self.cfg.risk_free_rate,
                self.cfg.min_weight,
                self.cfg.max_weight,
            ),
            (None, _) => {
                warn!(
                    candidates = symbols.len(),
                    "No covariance estimate, using inverse-volatility weights"
                );
                let vols: Vec<Option<f64>> =
                    symbols.iter().map(|s| panel.volatility(s)).collect();
                markowitz::inverse_volatility_weights(&vols)
            }
            (_, OptimizerObjective::RollingWindow) => unreachable!("resolved above"),
        };

        let (normalized, equal_weight_fallback) = normalize_weights(&raw);
        if equal_weight_fallback {
            warn!(
                candidates = symbols.len(),
                "Raw weight sum not normalizable, falling back to equal weighting"
            );
        }

        let concentrated = normalized.iter().any(|&w| w > CONCENTRATION_LIMIT);
        if concentrated {
            warn!(limit = CONCENTRATION_LIMIT, "Concentration limit exceeded");
        }

        let metrics = metrics::summarize(
            symbols,
            &normalized,
            &means,
            cov.as_ref(),
            &panel,
            self.cfg.risk_free_rate,
        );

        let weights = symbols
            .iter()
            .zip(&normalized)
            .map(|(symbol, &weight)| PortfolioWeight {
                symbol: symbol.clone(),
                weight,
            })
            .collect();

        PortfolioAllocation {
            weights,
            metrics,
            concentrated,
            equal_weight_fallback,
        }
    }
}

/// Rescale raw weights to sum to 1. Negative components are floored at
/// zero before rescaling; a zero/negative/non-finite raw sum falls back to
/// equal weighting, reported through the bool.
pub fn normalize_weights(raw: &[f64]) -> (Vec<f64>, bool) {
    if raw.is_empty() {
        return (Vec::new(), false);
    }
    let floored: Vec<f64> = raw
        .iter()
        .map(|&w| if w.is_finite() { w.max(0.0) } else { 0.0 })
        .collect();
    let sum: f64 = floored.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        let equal = 1.0 / raw.len() as f64;
        return (vec![equal; raw.len()], true);
    }
    (floored.iter().map(|w| w / sum).collect(), false)
}
