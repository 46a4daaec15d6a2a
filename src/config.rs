use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::calibration::{CalibrationMode, CalibratorConfig, PlattScaler};
use crate::drift::{DriftTrackerConfig, DEFAULT_ACCURACY_WINDOW_LEN};
use crate::portfolio::{OptimizerObjective, PortfolioConfig};
use crate::risk::{RiskProfile, RiskProfileName};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub engine: EngineSection,
    pub calibration: CalibrationSection,
    pub drift: DriftSection,
    pub consensus: ConsensusSection,
    pub risk: RiskSection,
    pub portfolio: PortfolioSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Pipeline pass cadence for the demo driver.
    pub refresh_interval_secs: u64,
    /// Total equity the risk filter sizes positions against.
    pub equity: f64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            equity: 100_000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalibrationSection {
    pub mode: CalibrationMode,
    pub platt_a: f64,
    pub platt_b: f64,
    pub smoothing_alpha: f64,
}

impl Default for CalibrationSection {
    fn default() -> Self {
        let platt = PlattScaler::default();
        Self {
            mode: CalibrationMode::Platt,
            platt_a: platt.a,
            platt_b: platt.b,
            smoothing_alpha: 0.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriftSection {
    pub outlier_bound: f64,
    pub display_bound: f64,
    pub window_len: usize,
}

impl Default for DriftSection {
    fn default() -> Self {
        let cfg = DriftTrackerConfig::default();
        Self {
            outlier_bound: cfg.outlier_bound,
            display_bound: cfg.display_bound,
            window_len: DEFAULT_ACCURACY_WINDOW_LEN,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsensusSection {
    /// Raw values inside ±dead_zone classify as HOLD.
    pub dead_zone: f64,
}

impl Default for ConsensusSection {
    fn default() -> Self {
        Self { dead_zone: 0.02 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskSection {
    pub profile: RiskProfileName,
}

impl Default for RiskSection {
    fn default() -> Self {
        Self {
            profile: RiskProfileName::Balanced,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortfolioSection {
    pub objective: OptimizerObjective,
    pub rolling_window_days: usize,
    pub min_weight: f64,
    pub max_weight: f64,
    pub risk_free_rate: f64,
}

impl Default for PortfolioSection {
    fn default() -> Self {
        let cfg = PortfolioConfig::default();
        Self {
            objective: cfg.objective,
            rolling_window_days: cfg.rolling_window_days,
            min_weight: cfg.min_weight,
            max_weight: cfg.max_weight,
            risk_free_rate: cfg.risk_free_rate,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config/default.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks on numeric options. Unknown enum values are already
    /// rejected during deserialization.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.calibration.smoothing_alpha) {
            bail!(
                "calibration.smoothing_alpha must be in [0, 1], got {}",
                self.calibration.smoothing_alpha
            );
        }
        if self.consensus.dead_zone < 0.0 || self.consensus.dead_zone >= 1.0 {
            bail!(
                "consensus.dead_zone must be in [0, 1), got {}",
                self.consensus.dead_zone
            );
        }
        if self.drift.outlier_bound <= 0.0 || self.drift.display_bound <= 0.0 {
            bail!("drift bounds must be positive");
        }
        if self.drift.display_bound > self.drift.outlier_bound {
            bail!(
                "drift.display_bound ({}) must not exceed drift.outlier_bound ({})",
                self.drift.display_bound,
                self.drift.outlier_bound
            );
        }
        if self.drift.window_len == 0 {
            bail!("drift.window_len must be > 0");
        }
        if self.portfolio.min_weight < 0.0
            || self.portfolio.max_weight > 1.0
            || self.portfolio.min_weight > self.portfolio.max_weight
        {
            bail!(
                "portfolio weight bounds invalid: min {} max {}",
                self.portfolio.min_weight,
                self.portfolio.max_weight
            );
        }
        if self.portfolio.rolling_window_days == 0 {
            bail!("portfolio.rolling_window_days must be > 0");
        }
        if self.engine.equity <= 0.0 {
            bail!("engine.equity must be > 0, got {}", self.engine.equity);
        }
        Ok(())
    }

    pub fn calibrator_config(&self) -> CalibratorConfig {
        CalibratorConfig {
            mode: self.calibration.mode,
            platt: PlattScaler::new(self.calibration.platt_a, self.calibration.platt_b),
            smoothing_alpha: self.calibration.smoothing_alpha,
            dead_zone: self.consensus.dead_zone,
        }
    }

    pub fn drift_config(&self) -> DriftTrackerConfig {
        DriftTrackerConfig {
            outlier_bound: self.drift.outlier_bound,
            display_bound: self.drift.display_bound,
        }
    }

    pub fn risk_profile(&self) -> RiskProfile {
        RiskProfile::named(self.risk.profile)
    }

    pub fn portfolio_config(&self) -> PortfolioConfig {
        PortfolioConfig {
            objective: self.portfolio.objective,
            rolling_window_days: self.portfolio.rolling_window_days,
            min_weight: self.portfolio.min_weight,
            max_weight: self.portfolio.max_weight,
            risk_free_rate: self.portfolio.risk_free_rate,
        }
    }
}
