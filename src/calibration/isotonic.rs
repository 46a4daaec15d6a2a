use serde::{Deserialize, Serialize};

/// Monotone non-decreasing step mapping from raw confidence to observed
/// outcome frequency, fit with pool-adjacent-violators over bucketed
/// (predicted, observed) history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsotonicCalibrator {
    /// (bucket midpoint, calibrated value), sorted by midpoint.
    points: Vec<(f64, f64)>,
}

impl IsotonicCalibrator {
    /// Fit from labeled (raw_confidence, outcome) pairs. Returns `None`
    /// when the history is empty, leaving mode selection to the caller.
    pub fn fit(pairs: &[(f64, bool)], buckets: usize) -> Option<Self> {
        if pairs.is_empty() {
            return None;
        }
        let buckets = buckets.max(2);

        // Bucket by predicted confidence.
        let mut count = vec![0usize; buckets];
        let mut observed = vec![0.0f64; buckets];
        for &(raw, outcome) in pairs {
            let p = raw.clamp(0.0, 1.0);
            let idx = ((p * buckets as f64).floor() as usize).min(buckets - 1);
            count[idx] += 1;
            if outcome {
                observed[idx] += 1.0;
            }
        }

        // Pool adjacent violators over the occupied buckets.
        struct Block {
            midpoint_sum: f64,
            value_sum: f64,
            weight: f64,
        }
        let mut blocks: Vec<Block> = Vec::new();
        for idx in 0..buckets {
            if count[idx] == 0 {
                continue;
            }
            let weight = count[idx] as f64;
            let midpoint = (idx as f64 + 0.5) / buckets as f64;
            blocks.push(Block {
                midpoint_sum: midpoint * weight,
                value_sum: observed[idx],
                weight,
            });
            while blocks.len() >= 2 {
                let last = blocks.len() - 1;
                let mean_last = blocks[last].value_sum / blocks[last].weight;
                let mean_prev = blocks[last - 1].value_sum / blocks[last - 1].weight;
                if mean_prev <= mean_last {
                    break;
                }
                let Some(merged) = blocks.pop() else { break };
                let prev_idx = blocks.len() - 1;
                blocks[prev_idx].midpoint_sum += merged.midpoint_sum;
                blocks[prev_idx].value_sum += merged.value_sum;
                blocks[prev_idx].weight += merged.weight;
            }
        }

        let points: Vec<(f64, f64)> = blocks
            .iter()
            .map(|b| (b.midpoint_sum / b.weight, (b.value_sum / b.weight).clamp(0.0, 1.0)))
            .collect();
        Some(Self { points })
    }

    /// Look up the calibrated probability for a raw confidence, linearly
    /// interpolating between adjacent step levels.
    pub fn apply(&self, raw_confidence: f64) -> f64 {
        let x = raw_confidence.clamp(0.0, 1.0);
        match self.points.len() {
            0 => x,
            1 => self.points[0].1,
            _ => {
                if x <= self.points[0].0 {
                    return self.points[0].1;
                }
                if x >= self.points[self.points.len() - 1].0 {
                    return self.points[self.points.len() - 1].1;
                }
                let hi = self
                    .points
                    .partition_point(|&(mid, _)| mid < x)
                    .min(self.points.len() - 1);
                let (x0, y0) = self.points[hi - 1];
                let (x1, y1) = self.points[hi];
                let t = if (x1 - x0).abs() < f64::EPSILON {
                    0.0
                } else {
                    (x - x0) / (x1 - x0)
                };
                (y0 + t * (y1 - y0)).clamp(0.0, 1.0)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_empty_history_is_none() {
        assert!(IsotonicCalibrator::fit(&[], 10).is_none());
    }

    #[test]
    fn fitted_mapping_is_monotone() {
        // Deliberately noisy history: low raws win sometimes, high raws win
        // most of the time.
        let mut pairs = Vec::new();
        for i in 0..300 {
            let raw = (i % 100) as f64 / 100.0;
            let win = (i * 7 % 100) as f64 / 100.0 < raw * 0.8 + 0.1;
            pairs.push((raw, win));
        }
        let iso = IsotonicCalibrator::fit(&pairs, 10).unwrap();
        let mut prev = -1.0;
        for i in 0..=50 {
            let p = iso.apply(i as f64 / 50.0);
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= prev - 1e-12, "mapping must be non-decreasing");
            prev = p;
        }
    }

    #[test]
    fn perfectly_calibrated_history_maps_near_identity() {
        let mut pairs = Vec::new();
        for bucket in 0..10 {
            let raw = bucket as f64 / 10.0 + 0.05;
            let wins = (raw * 100.0).round() as usize;
            for i in 0..100 {
                pairs.push((raw, i < wins));
            }
        }
        let iso = IsotonicCalibrator::fit(&pairs, 10).unwrap();
        assert!((iso.apply(0.25) - 0.25).abs() < 0.08);
        assert!((iso.apply(0.75) - 0.75).abs() < 0.08);
    }
}
