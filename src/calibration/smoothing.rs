use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-symbol EWMA state, passed into and returned from calibration
/// explicitly so pipeline passes stay testable and parallelizable.
///
/// The first observation for a symbol seeds the state with the calibrated
/// value itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothingState {
    values: HashMap<String, f64>,
}

impl SmoothingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the EWMA for `symbol` and return the smoothed confidence.
    pub fn smooth(&mut self, symbol: &str, calibrated: f64, alpha: f64) -> f64 {
        let alpha = alpha.clamp(0.0, 1.0);
        let smoothed = match self.values.get(symbol) {
            Some(&previous) => alpha * calibrated + (1.0 - alpha) * previous,
            None => calibrated,
        };
        self.values.insert(symbol.to_string(), smoothed);
        smoothed
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.values.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_seeds_state() {
        let mut state = SmoothingState::new();
        assert!((state.smooth("AAPL", 0.8, 0.3) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn ewma_blends_with_previous() {
        let mut state = SmoothingState::new();
        state.smooth("AAPL", 0.8, 0.3);
        let second = state.smooth("AAPL", 0.4, 0.3);
        // 0.3 * 0.4 + 0.7 * 0.8 = 0.68
        assert!((second - 0.68).abs() < 1e-12);
    }

    #[test]
    fn symbols_are_independent() {
        let mut state = SmoothingState::new();
        state.smooth("AAPL", 0.9, 0.3);
        let msft = state.smooth("MSFT", 0.2, 0.3);
        assert!((msft - 0.2).abs() < 1e-12);
        assert_eq!(state.len(), 2);
    }
}
