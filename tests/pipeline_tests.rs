use std::collections::HashMap;

use chrono::{Duration, Utc};

use signal_engine::config::Config;
use signal_engine::demo::DemoGenerator;
use signal_engine::model::prediction::{Horizon, PredictionRecord};
use signal_engine::model::signal::Side;
use signal_engine::pipeline::{Engine, PassInput};
use signal_engine::portfolio::ReturnPanel;
use signal_engine::risk::RiskProfileName;

const UNIVERSE: [&str; 4] = ["AAPL", "MSFT", "NVDA", "AMZN"];

fn demo_input_parts(seed: u64) -> (Vec<PredictionRecord>, HashMap<String, f64>, ReturnPanel) {
    let now = Utc::now();
    let mut generator = DemoGenerator::new(seed, &UNIVERSE);
    let records = generator.batch(now);
    let prices = generator.entry_prices();
    let returns = generator.return_panel(120);
    (records, prices, returns)
}

#[test]
fn pipeline_pass_is_idempotent() {
    let (records, prices, returns) = demo_input_parts(42);
    let input = PassInput {
        records: &records,
        entry_prices: &prices,
        returns: &returns,
        baseline_accuracy: 0.6,
    };
    let now = Utc::now();

    let mut engine = Engine::from_config(&Config::default());
    engine.record_outcome("AAPL", true);
    engine.record_outcome("AAPL", false);
    let mut replay = engine.clone();

    let first = engine.run_pass(&input, now);
    let second = replay.run_pass(&input, now);

    assert_eq!(first.signals, second.signals);
    assert_eq!(first.drift, second.drift);
    assert_eq!(first.consensus, second.consensus);
    assert_eq!(first.positions, second.positions);
    assert_eq!(first.allocation, second.allocation);
    assert_eq!(first.generated_at, second.generated_at);
}

#[test]
fn full_pass_produces_consistent_stages() {
    let (records, prices, returns) = demo_input_parts(7);
    let input = PassInput {
        records: &records,
        entry_prices: &prices,
        returns: &returns,
        baseline_accuracy: 0.6,
    };
    let mut engine = Engine::from_config(&Config::default());
    let pass = engine.run_pass(&input, Utc::now());

    // One signal per validated record, one consensus row per symbol.
    assert_eq!(pass.signals.len(), UNIVERSE.len() * Horizon::ALL.len());
    assert_eq!(pass.consensus.len(), UNIVERSE.len());

    for signal in &pass.signals {
        assert!((0.0..=1.0).contains(&signal.calibrated_confidence));
        assert!((0.0..=1.0).contains(&signal.smoothed_confidence));
    }
    for result in &pass.consensus {
        assert!((0.0..=1.0).contains(&result.agreement_score));
    }
    // Positions respect the profile cap and never carry a HOLD side.
    assert!(pass.positions.len() <= engine.profile().max_positions);
    for position in &pass.positions {
        assert_ne!(position.side, Side::Hold);
    }
    // Allocation covers exactly the planned positions.
    assert_eq!(pass.allocation.weights.len(), pass.positions.len());
    if !pass.allocation.weights.is_empty() {
        assert!((pass.allocation.weight_sum() - 1.0).abs() <= 0.001);
    }
}

#[test]
fn generated_at_tracks_newest_surviving_record() {
    let t0 = Utc::now();
    let records = vec![
        PredictionRecord::new("AAPL", Horizon::H1, 0.08, 0.9, t0),
        PredictionRecord::new("AAPL", Horizon::H4, 0.06, 0.85, t0 + Duration::seconds(45)),
    ];
    let prices = HashMap::new();
    let returns = ReturnPanel::new();
    let input = PassInput {
        records: &records,
        entry_prices: &prices,
        returns: &returns,
        baseline_accuracy: 0.6,
    };
    let mut engine = Engine::from_config(&Config::default());
    let pass = engine.run_pass(&input, t0 + Duration::minutes(1));
    assert_eq!(pass.generated_at, t0 + Duration::seconds(45));
}

#[test]
fn drift_rows_appear_once_outcomes_are_recorded() {
    let (records, prices, returns) = demo_input_parts(11);
    let input = PassInput {
        records: &records,
        entry_prices: &prices,
        returns: &returns,
        baseline_accuracy: 0.6,
    };
    let mut engine = Engine::from_config(&Config::default());

    let pass = engine.run_pass(&input, Utc::now());
    assert!(pass.drift.is_empty(), "no history yet, no drift rows");

    for _ in 0..10 {
        engine.record_outcome("AAPL", true);
    }
    let pass = engine.run_pass(&input, Utc::now());
    // Global scope plus the AAPL scope.
    assert_eq!(pass.drift.len(), 2);
    for metric in &pass.drift {
        assert!(metric.normalized_drift.abs() <= 0.05 + 1e-12);
    }
}

#[test]
fn smoothing_state_evolves_between_passes() {
    let t0 = Utc::now();
    let mut engine = Engine::from_config(&Config::default());
    let prices = HashMap::new();
    let returns = ReturnPanel::new();

    let first_batch = vec![PredictionRecord::new("AAPL", Horizon::H1, 0.1, 0.9, t0)];
    let input = PassInput {
        records: &first_batch,
        entry_prices: &prices,
        returns: &returns,
        baseline_accuracy: 0.6,
    };
    let first = engine.run_pass(&input, t0);

    let t1 = t0 + Duration::seconds(30);
    let second_batch = vec![PredictionRecord::new("AAPL", Horizon::H1, 0.1, 0.4, t1)];
    let input = PassInput {
        records: &second_batch,
        entry_prices: &prices,
        returns: &returns,
        baseline_accuracy: 0.6,
    };
    let second = engine.run_pass(&input, t1);

    let s1 = &first.signals[0];
    let s2 = &second.signals[0];
    // EWMA: new smoothed sits between the new calibrated value and the
    // previous smoothed value.
    assert!(s2.smoothed_confidence > s2.calibrated_confidence);
    assert!(s2.smoothed_confidence < s1.smoothed_confidence);
}

#[test]
fn risk_profile_changes_pipeline_output() {
    let (records, prices, returns) = demo_input_parts(42);
    let now = Utc::now();

    let run = |profile: RiskProfileName| {
        let mut config = Config::default();
        config.risk.profile = profile;
        let mut engine = Engine::from_config(&config);
        let input = PassInput {
            records: &records,
            entry_prices: &prices,
            returns: &returns,
            baseline_accuracy: 0.6,
        };
        engine.run_pass(&input, now).positions.len()
    };

    let conservative = run(RiskProfileName::Conservative);
    let aggressive = run(RiskProfileName::Aggressive);
    assert!(
        aggressive >= conservative,
        "aggressive profile admits at least as many positions"
    );
}
