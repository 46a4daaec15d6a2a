//! Signal analytics engine.
//!
//! Turns raw per-symbol, per-horizon model outputs into calibrated
//! confidence scores, drift readings, a cross-horizon consensus verdict,
//! risk-filtered position plans, and a normalized portfolio allocation.
//!
//! The pipeline is synchronous and I/O-free: the caller supplies prediction
//! batches, entry prices, return history, and the accuracy baseline, then
//! reads back plain serializable records. The only cross-cycle state is the
//! calibrator's per-symbol smoothing map and the drift tracker's accuracy
//! windows, both owned by [`pipeline::Engine`] and keyed explicitly, so
//! passes for different symbols can run on separate engine instances in
//! parallel.

pub mod calibration;
pub mod config;
pub mod consensus;
pub mod demo;
pub mod drift;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod portfolio;
pub mod risk;
pub mod validator;

pub use config::Config;
pub use error::EngineError;
pub use pipeline::{Engine, EnginePass, PassInput};
