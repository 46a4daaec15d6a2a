pub mod consensus;
pub mod drift;
pub mod portfolio;
pub mod prediction;
pub mod signal;

pub use consensus::{ConsensusResult, HorizonVote};
pub use drift::{DriftMetric, DriftScope};
pub use portfolio::{PortfolioAllocation, PortfolioMetrics, PortfolioWeight};
pub use prediction::{Horizon, PredictionRecord};
pub use signal::{CalibratedSignal, Side};
