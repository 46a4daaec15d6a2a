use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EngineError;
use crate::model::consensus::ConsensusResult;
use crate::model::signal::Side;

/// Minimum stop-to-target gap relative to entry price.
pub const MIN_STOP_TARGET_SPREAD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfileName {
    Conservative,
    Balanced,
    Aggressive,
}

impl fmt::Display for RiskProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskProfileName::Conservative => f.write_str("conservative"),
            RiskProfileName::Balanced => f.write_str("balanced"),
            RiskProfileName::Aggressive => f.write_str("aggressive"),
        }
    }
}

impl FromStr for RiskProfileName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conservative" => Ok(RiskProfileName::Conservative),
            "balanced" => Ok(RiskProfileName::Balanced),
            "aggressive" => Ok(RiskProfileName::Aggressive),
            other => Err(EngineError::UnknownRiskProfile(other.to_string())),
        }
    }
}

/// Static per-profile parameters. Selected by the caller, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub name: RiskProfileName,
    pub min_confidence: f64,
    pub max_positions: usize,
    pub rebalance_days: u32,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl RiskProfile {
    pub fn named(name: RiskProfileName) -> Self {
        match name {
            RiskProfileName::Conservative => Self {
                name,
                min_confidence: 0.85,
                max_positions: 5,
                rebalance_days: 10,
                stop_loss_pct: 0.03,
                take_profit_pct: 0.06,
            },
            RiskProfileName::Balanced => Self {
                name,
                min_confidence: 0.80,
                max_positions: 10,
                rebalance_days: 5,
                stop_loss_pct: 0.05,
                take_profit_pct: 0.10,
            },
            RiskProfileName::Aggressive => Self {
                name,
                min_confidence: 0.70,
                max_positions: 20,
                rebalance_days: 2,
                stop_loss_pct: 0.08,
                take_profit_pct: 0.16,
            },
        }
    }

    /// Per-position allocation fraction before confidence scaling.
    pub fn base_allocation_fraction(&self) -> f64 {
        1.0 / self.max_positions.max(1) as f64
    }

    /// Position notional for a calibrated confidence `c`:
    /// `equity * clamp(c, 0.6, 1.2) * base_fraction`.
    pub fn position_size(&self, equity: f64, confidence: f64) -> f64 {
        equity.max(0.0) * confidence.clamp(0.6, 1.2) * self.base_allocation_fraction()
    }
}

/// Stop/target constraint violations. Flagged, never silently corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFlag {
    TargetOnWrongSide,
    SpreadBelowMinimum,
}

impl ConstraintFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TargetOnWrongSide => "risk.target_on_wrong_side",
            Self::SpreadBelowMinimum => "risk.spread_below_minimum",
        }
    }
}

/// Stop-loss and take-profit levels derived for one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectiveLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
    pub flags: Vec<ConstraintFlag>,
}

/// A sized, leveled position candidate ready for allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPlan {
    pub symbol: String,
    pub side: Side,
    pub confidence: f64,
    pub agreement_score: f64,
    pub position_size: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub flags: Vec<ConstraintFlag>,
}

/// Keep consensus results whose agreement-weighted confidence clears the
/// profile's floor, ranked best-first and truncated to `max_positions`.
/// HOLD verdicts carry no direction and are not position candidates.
pub fn filter_candidates(results: &[ConsensusResult], profile: &RiskProfile) -> Vec<ConsensusResult> {
    let mut kept: Vec<ConsensusResult> = results
        .iter()
        .filter(|r| r.consensus_side != Side::Hold)
        .filter(|r| r.weighted_confidence() >= profile.min_confidence)
        .cloned()
        .collect();
    kept.sort_by(|a, b| {
        b.weighted_confidence()
            .partial_cmp(&a.weighted_confidence())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.symbol.cmp(&b.symbol))
    });
    kept.truncate(profile.max_positions);
    kept
}

/// Derive stop/target levels for an entry, validating that the target sits
/// on the profitable side and the stop-to-target gap clears the minimum
/// spread. Violations are flagged on the result, not fixed.
pub fn protective_levels(entry_price: f64, side: Side, profile: &RiskProfile) -> ProtectiveLevels {
    let (stop_loss, take_profit) = match side {
        Side::Buy => (
            entry_price * (1.0 - profile.stop_loss_pct),
            entry_price * (1.0 + profile.take_profit_pct),
        ),
        Side::Sell => (
            entry_price * (1.0 + profile.stop_loss_pct),
            entry_price * (1.0 - profile.take_profit_pct),
        ),
        Side::Hold => (entry_price, entry_price),
    };

    let mut flags = Vec::new();
    let profitable = match side {
        Side::Buy => take_profit > entry_price,
        Side::Sell => take_profit < entry_price,
        Side::Hold => false,
    };
    if !profitable {
        flags.push(ConstraintFlag::TargetOnWrongSide);
    }
    if entry_price > 0.0 && (take_profit - stop_loss).abs() / entry_price < MIN_STOP_TARGET_SPREAD {
        flags.push(ConstraintFlag::SpreadBelowMinimum);
    }
    if !flags.is_empty() {
        warn!(
            entry_price,
            side = side.as_str(),
            flags = ?flags.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
            "Protective level constraint violated"
        );
    }

    ProtectiveLevels {
        stop_loss,
        take_profit,
        flags,
    }
}

/// Size and level the filtered candidates. Symbols without a known entry
/// price are skipped with a warning rather than failing the batch.
pub fn plan_positions(
    filtered: &[ConsensusResult],
    equity: f64,
    entry_prices: &HashMap<String, f64>,
    profile: &RiskProfile,
) -> Vec<PositionPlan> {
    let mut plans = Vec::with_capacity(filtered.len());
    for candidate in filtered {
        let Some(&entry_price) = entry_prices.get(&candidate.symbol) else {
            warn!(symbol = %candidate.symbol, "No entry price for candidate, skipping");
            continue;
        };
        if !entry_price.is_finite() || entry_price <= 0.0 {
            warn!(symbol = %candidate.symbol, entry_price, "Invalid entry price, skipping");
            continue;
        }
        let levels = protective_levels(entry_price, candidate.consensus_side, profile);
        plans.push(PositionPlan {
            symbol: candidate.symbol.clone(),
            side: candidate.consensus_side,
            confidence: candidate.confidence,
            agreement_score: candidate.agreement_score,
            position_size: profile.position_size(equity, candidate.confidence),
            entry_price,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
            flags: levels.flags,
        });
    }
    plans
}
