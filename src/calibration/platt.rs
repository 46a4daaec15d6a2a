use serde::{Deserialize, Serialize};

/// Logistic recalibration: `calibrated = sigmoid(a * raw + b)`.
///
/// Parameters are fit offline from labeled history; per-call use only
/// applies them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattScaler {
    pub a: f64,
    pub b: f64,
}

impl Default for PlattScaler {
    fn default() -> Self {
        // Near-identity on [0, 1]: sigmoid(6x - 3) maps 0.5 -> 0.5 with a
        // gentle squeeze at the ends.
        Self { a: 6.0, b: -3.0 }
    }
}

impl PlattScaler {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    pub fn apply(&self, raw_confidence: f64) -> f64 {
        let raw = raw_confidence.clamp(0.0, 1.0);
        sigmoid(self.a * raw + self.b)
    }

    /// Offline fit by gradient descent on the log loss of labeled
    /// (raw_confidence, outcome) pairs. Deterministic: fixed iteration
    /// count and step size, no random restarts.
    pub fn fit(pairs: &[(f64, bool)], iterations: usize, learning_rate: f64) -> Self {
        let mut scaler = Self::default();
        if pairs.is_empty() {
            return scaler;
        }
        let n = pairs.len() as f64;
        for _ in 0..iterations.max(1) {
            let mut grad_a = 0.0;
            let mut grad_b = 0.0;
            for &(raw, outcome) in pairs {
                let x = raw.clamp(0.0, 1.0);
                let p = sigmoid(scaler.a * x + scaler.b);
                let y = if outcome { 1.0 } else { 0.0 };
                let err = p - y;
                grad_a += err * x;
                grad_b += err;
            }
            scaler.a -= learning_rate * grad_a / n;
            scaler.b -= learning_rate * grad_b / n;
        }
        scaler
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
