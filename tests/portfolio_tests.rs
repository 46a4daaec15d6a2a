use signal_engine::portfolio::{
    normalize_weights, OptimizerObjective, PortfolioConfig, PortfolioOptimizer, ReturnPanel,
    CONCENTRATION_LIMIT, WEIGHT_SUM_TOLERANCE,
};

fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn panel_of(series: &[(&str, Vec<f64>)]) -> ReturnPanel {
    let mut panel = ReturnPanel::new();
    for (symbol, returns) in series {
        panel.insert(*symbol, returns.clone());
    }
    panel
}

fn wave(amplitude: f64, drift: f64, len: usize, phase: usize) -> Vec<f64> {
    (0..len)
        .map(|t| drift + amplitude * (((t + phase) % 7) as f64 - 3.0) / 3.0)
        .collect()
}

#[test]
fn weights_sum_to_one_for_any_candidate_set() {
    let panel = panel_of(&[
        ("AAPL", wave(0.01, 0.001, 60, 0)),
        ("MSFT", wave(0.02, 0.0005, 60, 2)),
        ("NVDA", wave(0.03, 0.002, 60, 4)),
    ]);
    for objective in [
        OptimizerObjective::MeanVariance,
        OptimizerObjective::SharpeOptimal,
        OptimizerObjective::RollingWindow,
    ] {
        let optimizer = PortfolioOptimizer::new(PortfolioConfig {
            objective,
            ..PortfolioConfig::default()
        });
        let allocation = optimizer.optimize(&symbols(&["AAPL", "MSFT", "NVDA"]), &panel);
        assert!(
            (allocation.weight_sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE,
            "{objective:?}: sum {}",
            allocation.weight_sum()
        );
        for weight in &allocation.weights {
            assert!((0.0..=1.0).contains(&weight.weight));
        }
    }
}

#[test]
fn missing_history_falls_back_to_equal_weights() {
    // No return series at all: no covariance, no volatilities, raw weights
    // come out zero and normalization falls back to equal weighting.
    let optimizer = PortfolioOptimizer::new(PortfolioConfig::default());
    let allocation = optimizer.optimize(&symbols(&["AAPL", "MSFT", "NVDA"]), &ReturnPanel::new());
    assert!(allocation.equal_weight_fallback);
    for weight in &allocation.weights {
        assert!((weight.weight - 1.0 / 3.0).abs() < 1e-9);
    }
}

#[test]
fn zero_and_negative_raw_weights_normalize_to_equal() {
    let (weights, fallback) = normalize_weights(&[0.0, -0.4, -0.1]);
    assert!(fallback);
    for w in &weights {
        assert!((w - 1.0 / 3.0).abs() < 1e-12);
    }
}

#[test]
fn mean_variance_prefers_low_variance_assets() {
    let quiet = wave(0.002, 0.001, 90, 0);
    let noisy = wave(0.05, 0.001, 90, 3);
    let panel = panel_of(&[("QUIET", quiet), ("NOISY", noisy)]);
    let optimizer = PortfolioOptimizer::new(PortfolioConfig::default());
    let allocation = optimizer.optimize(&symbols(&["NOISY", "QUIET"]), &panel);
    let by_symbol: std::collections::HashMap<_, _> = allocation
        .weights
        .iter()
        .map(|w| (w.symbol.as_str(), w.weight))
        .collect();
    assert!(by_symbol["QUIET"] > by_symbol["NOISY"]);
}

#[test]
fn concentration_is_flagged_not_corrected() {
    // Two candidates: minimum variance piles onto the quiet one well past
    // the 35% limit; the optimizer must flag it and leave it alone.
    let panel = panel_of(&[
        ("QUIET", wave(0.001, 0.001, 90, 0)),
        ("NOISY", wave(0.08, 0.001, 90, 3)),
    ]);
    let optimizer = PortfolioOptimizer::new(PortfolioConfig::default());
    let allocation = optimizer.optimize(&symbols(&["NOISY", "QUIET"]), &panel);
    assert!(allocation.concentrated);
    assert!(allocation
        .weights
        .iter()
        .any(|w| w.weight > CONCENTRATION_LIMIT));
}

#[test]
fn rolling_window_ignores_stale_history() {
    // Ancient history says A is quiet; the trailing window says A turned
    // violently noisy. Rolling-window estimation must see only the tail.
    let mut a = wave(0.001, 0.001, 200, 0);
    a.extend(wave(0.09, 0.0, 30, 1));
    let mut b = wave(0.05, 0.001, 200, 2);
    b.extend(wave(0.004, 0.001, 30, 3));
    let panel = panel_of(&[("A", a), ("B", b)]);

    let optimizer = PortfolioOptimizer::new(PortfolioConfig {
        objective: OptimizerObjective::RollingWindow,
        rolling_window_days: 30,
        ..PortfolioConfig::default()
    });
    let allocation = optimizer.optimize(&symbols(&["A", "B"]), &panel);
    let by_symbol: std::collections::HashMap<_, _> = allocation
        .weights
        .iter()
        .map(|w| (w.symbol.as_str(), w.weight))
        .collect();
    assert!(
        by_symbol["B"] > by_symbol["A"],
        "recent data should dominate: {by_symbol:?}"
    );
}

#[test]
fn metrics_are_populated_and_finite() {
    let panel = panel_of(&[
        ("AAPL", wave(0.01, 0.002, 90, 0)),
        ("MSFT", wave(0.02, -0.001, 90, 3)),
    ]);
    let optimizer = PortfolioOptimizer::new(PortfolioConfig {
        objective: OptimizerObjective::SharpeOptimal,
        ..PortfolioConfig::default()
    });
    let allocation = optimizer.optimize(&symbols(&["AAPL", "MSFT"]), &panel);
    let m = allocation.metrics;
    assert!(m.expected_return.is_finite());
    assert!(m.volatility >= 0.0);
    assert!(m.sharpe_ratio.is_finite());
    assert!((0.0..=1.0).contains(&m.max_drawdown));
}

#[test]
fn empty_candidate_set_yields_empty_allocation() {
    let optimizer = PortfolioOptimizer::new(PortfolioConfig::default());
    let allocation = optimizer.optimize(&[], &ReturnPanel::new());
    assert!(allocation.weights.is_empty());
    assert!(!allocation.concentrated);
    assert!(!allocation.equal_weight_fallback);
}
