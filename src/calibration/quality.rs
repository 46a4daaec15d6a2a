use serde::{Deserialize, Serialize};

pub const DEFAULT_QUALITY_BINS: usize = 10;

/// One confidence bucket of the reliability curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityBin {
    pub midpoint: f64,
    pub predicted_mean: f64,
    pub observed_frequency: f64,
    pub count: usize,
}

/// Calibration quality over a set of labeled (predicted, observed) pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub sample_count: usize,
    pub brier_score: f64,
    pub expected_calibration_error: f64,
    pub reliability_curve: Vec<ReliabilityBin>,
}

impl CalibrationReport {
    /// Score predicted probabilities against binary outcomes.
    ///
    /// Empty input yields a zeroed report with an empty curve rather than
    /// an error; callers gate on `sample_count`.
    pub fn from_pairs(pairs: &[(f64, bool)], bins: usize) -> Self {
        let bins = bins.max(1);
        if pairs.is_empty() {
            return Self {
                sample_count: 0,
                brier_score: 0.0,
                expected_calibration_error: 0.0,
                reliability_curve: Vec::new(),
            };
        }

        let mut brier_sum = 0.0;
        let mut bin_count = vec![0usize; bins];
        let mut bin_predicted = vec![0.0f64; bins];
        let mut bin_observed = vec![0.0f64; bins];
        for &(predicted, observed) in pairs {
            let p = predicted.clamp(0.0, 1.0);
            let y = if observed { 1.0 } else { 0.0 };
            brier_sum += (p - y) * (p - y);
            let idx = ((p * bins as f64).floor() as usize).min(bins - 1);
            bin_count[idx] += 1;
            bin_predicted[idx] += p;
            bin_observed[idx] += y;
        }

        let total = pairs.len() as f64;
        let mut ece = 0.0;
        let mut curve = Vec::new();
        for idx in 0..bins {
            if bin_count[idx] == 0 {
                continue;
            }
            let n = bin_count[idx] as f64;
            let predicted_mean = bin_predicted[idx] / n;
            let observed_frequency = bin_observed[idx] / n;
            ece += (n / total) * (predicted_mean - observed_frequency).abs();
            curve.push(ReliabilityBin {
                midpoint: (idx as f64 + 0.5) / bins as f64,
                predicted_mean,
                observed_frequency,
                count: bin_count[idx],
            });
        }

        Self {
            sample_count: pairs.len(),
            brier_score: brier_sum / total,
            expected_calibration_error: ece,
            reliability_curve: curve,
        }
    }
}
