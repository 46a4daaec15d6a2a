use thiserror::Error;

/// Fail-fast errors. Bad input data never lands here: malformed records are
/// dropped by the validator and data gaps resolve to documented fallbacks.
/// These variants indicate miswiring and should surface immediately.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("unknown risk profile '{0}', expected conservative|balanced|aggressive")]
    UnknownRiskProfile(String),

    #[error("unknown optimizer objective '{0}', expected mean-variance|sharpe-optimal|rolling-window")]
    UnknownObjective(String),

    #[error("unknown calibration mode '{0}', expected platt|isotonic")]
    UnknownCalibrationMode(String),

    #[error("unknown horizon '{0}', expected one of 5m/15m/1h/4h/1d")]
    UnknownHorizon(String),
}
