use std::collections::HashMap;

use crate::model::consensus::{ConsensusResult, HorizonVote};
use crate::model::signal::{CalibratedSignal, Side};

/// Reconcile one symbol's non-expired signals across horizons into a single
/// directional verdict.
///
/// Majority rule: the side with a strict plurality of votes wins; a tie
/// between the top sides resolves to HOLD. Returns `None` for an empty
/// signal set.
pub fn aggregate(signals: &[CalibratedSignal]) -> Option<ConsensusResult> {
    let representative = select_representative(signals)?;

    let mut votes: Vec<HorizonVote> = signals
        .iter()
        .map(|s| HorizonVote {
            horizon: s.horizon,
            side: s.side,
        })
        .collect();
    votes.sort_by_key(|v| v.horizon);

    let mut counts: HashMap<Side, usize> = HashMap::new();
    for vote in &votes {
        *counts.entry(vote.side).or_insert(0) += 1;
    }
    let buy = counts.get(&Side::Buy).copied().unwrap_or(0);
    let sell = counts.get(&Side::Sell).copied().unwrap_or(0);
    let hold = counts.get(&Side::Hold).copied().unwrap_or(0);

    let top = buy.max(sell).max(hold);
    let tied = [buy, sell, hold].iter().filter(|&&c| c == top).count() > 1;
    let consensus_side = if tied {
        Side::Hold
    } else if top == buy {
        Side::Buy
    } else if top == sell {
        Side::Sell
    } else {
        Side::Hold
    };

    let total = votes.len();
    let agreement_score = top as f64 / total as f64;

    let distinct_horizons: usize = {
        let mut hs: Vec<_> = votes.iter().map(|v| v.horizon).collect();
        hs.dedup();
        hs.len()
    };
    // Divergent means disagreement in direction, not merely in magnitude.
    let is_divergent = distinct_horizons >= 2 && buy > 0 && sell > 0;

    Some(ConsensusResult {
        symbol: representative.symbol.clone(),
        horizon: representative.horizon,
        votes,
        consensus_side,
        agreement_score,
        confidence: representative.calibrated_confidence,
        is_divergent,
    })
}

/// Aggregate a full cycle's signals grouped by symbol, output sorted by
/// symbol for deterministic downstream ranking.
pub fn aggregate_all(signals: &[CalibratedSignal]) -> Vec<ConsensusResult> {
    let mut by_symbol: HashMap<&str, Vec<CalibratedSignal>> = HashMap::new();
    for signal in signals {
        by_symbol
            .entry(signal.symbol.as_str())
            .or_default()
            .push(signal.clone());
    }
    let mut out: Vec<ConsensusResult> = by_symbol
        .values()
        .filter_map(|group| aggregate(group))
        .collect();
    out.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    out
}

/// Signal shown for single-horizon display: highest calibrated confidence,
/// tie-broken by largest absolute raw value.
pub fn select_representative(signals: &[CalibratedSignal]) -> Option<&CalibratedSignal> {
    signals.iter().max_by(|a, b| {
        a.calibrated_confidence
            .partial_cmp(&b.calibrated_confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.raw_value
                    .abs()
                    .partial_cmp(&b.raw_value.abs())
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::prediction::Horizon;
    use chrono::Utc;

    fn signal(symbol: &str, horizon: Horizon, raw: f64, conf: f64, side: Side) -> CalibratedSignal {
        CalibratedSignal {
            symbol: symbol.to_string(),
            horizon,
            raw_value: raw,
            calibrated_confidence: conf,
            smoothed_confidence: conf,
            side,
            computed_at: Utc::now(),
        }
    }

    #[test]
    fn single_signal_passes_through() {
        let signals = vec![signal("AAPL", Horizon::H1, 0.08, 0.9, Side::Buy)];
        let result = aggregate(&signals).unwrap();
        assert_eq!(result.consensus_side, Side::Buy);
        assert!((result.agreement_score - 1.0).abs() < 1e-12);
        assert!(!result.is_divergent);
    }

    #[test]
    fn tie_resolves_to_hold() {
        let signals = vec![
            signal("AAPL", Horizon::H1, 0.08, 0.9, Side::Buy),
            signal("AAPL", Horizon::D1, -0.08, 0.8, Side::Sell),
        ];
        let result = aggregate(&signals).unwrap();
        assert_eq!(result.consensus_side, Side::Hold);
        assert!((result.agreement_score - 0.5).abs() < 1e-12);
        assert!(result.is_divergent);
    }

    #[test]
    fn representative_prefers_confidence_then_magnitude() {
        let signals = vec![
            signal("AAPL", Horizon::H1, 0.03, 0.9, Side::Buy),
            signal("AAPL", Horizon::H4, 0.09, 0.9, Side::Buy),
            signal("AAPL", Horizon::D1, 0.30, 0.7, Side::Buy),
        ];
        let rep = select_representative(&signals).unwrap();
        assert_eq!(rep.horizon, Horizon::H4);
    }

    #[test]
    fn empty_set_has_no_consensus() {
        assert!(aggregate(&[]).is_none());
    }
}
