use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;

use signal_engine::config::Config;
use signal_engine::demo::DemoGenerator;
use signal_engine::pipeline::{Engine, PassInput};

const DEMO_SEED: u64 = 42;
const DEMO_UNIVERSE: [&str; 6] = ["AAPL", "MSFT", "NVDA", "AMZN", "GOOG", "META"];
const DEMO_BASELINE_ACCURACY: f64 = 0.62;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = Path::new("config/default.toml");
    let config = if config_path.exists() {
        match Config::load_from(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {:#}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    tracing::info!(
        profile = %config.risk.profile,
        objective = %config.portfolio.objective,
        mode = %config.calibration.mode,
        refresh_secs = config.engine.refresh_interval_secs,
        "Signal engine demo starting"
    );

    let mut engine = Engine::from_config(&config);
    let mut generator = DemoGenerator::new(DEMO_SEED, &DEMO_UNIVERSE);
    let returns = generator.return_panel(config.portfolio.rolling_window_days.max(120));
    let entry_prices = generator.entry_prices();

    let mut interval = tokio::time::interval(Duration::from_secs(
        config.engine.refresh_interval_secs.max(1),
    ));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Utc::now();
                let records = generator.batch(now);
                let input = PassInput {
                    records: &records,
                    entry_prices: &entry_prices,
                    returns: &returns,
                    baseline_accuracy: DEMO_BASELINE_ACCURACY,
                };
                let pass = engine.run_pass(&input, now);

                for position in &pass.positions {
                    tracing::info!(
                        symbol = %position.symbol,
                        side = position.side.as_str(),
                        confidence = position.confidence,
                        size = position.position_size,
                        stop = position.stop_loss,
                        target = position.take_profit,
                        "Position plan"
                    );
                }
                let weights_json = serde_json::to_string(&pass.allocation.weights)?;
                tracing::info!(
                    weight_sum = pass.allocation.weight_sum(),
                    sharpe = pass.allocation.metrics.sharpe_ratio,
                    concentrated = pass.allocation.concentrated,
                    allocation = %weights_json,
                    "Allocation"
                );

                // Simulate realized outcomes so the drift window fills up
                // over successive demo cycles.
                for signal in &pass.signals {
                    let hit = signal.calibrated_confidence > 0.5;
                    engine.record_outcome(&signal.symbol, hit);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down");
                break;
            }
        }
    }

    Ok(())
}
