use serde::{Deserialize, Serialize};

/// Normalized allocation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioWeight {
    pub symbol: String,
    pub weight: f64,
}

/// Read-only risk summary of a weight set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

/// Output of one optimizer run: normalized weights plus metrics and the
/// flags the optimizer is required to surface instead of auto-correcting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAllocation {
    pub weights: Vec<PortfolioWeight>,
    pub metrics: PortfolioMetrics,
    /// Set when any single weight exceeds the concentration limit.
    pub concentrated: bool,
    /// Set when the optimizer fell back to equal weighting.
    pub equal_weight_fallback: bool,
}

impl PortfolioAllocation {
    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().map(|w| w.weight).sum()
    }
}
