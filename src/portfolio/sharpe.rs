//! Sharpe-maximizing weight search: deterministic pairwise-transfer hill
//! climb over the box-constrained simplex.

const SWEEPS: usize = 60;
const STEPS: [f64; 3] = [0.05, 0.01, 0.002];

pub fn portfolio_return(means: &[f64], weights: &[f64]) -> f64 {
    means.iter().zip(weights).map(|(m, w)| m * w).sum()
}

pub fn portfolio_volatility(cov: &[Vec<f64>], weights: &[f64]) -> f64 {
    let n = weights.len();
    let mut var = 0.0;
    for i in 0..n {
        for j in 0..n {
            var += weights[i] * cov[i][j] * weights[j];
        }
    }
    var.max(0.0).sqrt()
}

fn sharpe(means: &[f64], cov: &[Vec<f64>], weights: &[f64], risk_free_rate: f64) -> f64 {
    let vol = portfolio_volatility(cov, weights);
    if vol < f64::EPSILON {
        return f64::NEG_INFINITY;
    }
    (portfolio_return(means, weights) - risk_free_rate) / vol
}

/// Maximize `(μ'w - rf) / sqrt(w'Σw)` subject to `Σw = 1` and
/// `min_weight <= w_i <= max_weight`.
///
/// When the box is infeasible for the candidate count (e.g. fewer than
/// `1/max_weight` symbols), bounds are relaxed to keep `Σw = 1` reachable.
pub fn max_sharpe_weights(
    means: &[f64],
    cov: &[Vec<f64>],
    risk_free_rate: f64,
    min_weight: f64,
    max_weight: f64,
) -> Vec<f64> {
    let n = means.len();
    if n == 0 {
        return Vec::new();
    }
    let equal = 1.0 / n as f64;
    let lo = min_weight.clamp(0.0, equal);
    let hi = max_weight.max(equal).min(1.0);

    let mut weights = vec![equal; n];
    let mut best = sharpe(means, cov, &weights, risk_free_rate);

    for _ in 0..SWEEPS {
        let mut improved = false;
        for from in 0..n {
            for to in 0..n {
                if from == to {
                    continue;
                }
                for &step in &STEPS {
                    let delta = step
                        .min(weights[from] - lo)
                        .min(hi - weights[to]);
                    if delta <= f64::EPSILON {
                        continue;
                    }
                    let mut candidate = weights.clone();
                    candidate[from] -= delta;
                    candidate[to] += delta;
                    let score = sharpe(means, cov, &candidate, risk_free_rate);
                    if score > best + 1e-12 {
                        weights = candidate;
                        best = score;
                        improved = true;
                    }
                }
            }
        }
        if !improved {
            break;
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favors_the_higher_sharpe_asset() {
        // Same volatility, very different mean: weight should migrate to
        // the first asset up to the box bound.
        let means = vec![0.004, 0.0005];
        let cov = vec![vec![0.0001, 0.0], vec![0.0, 0.0001]];
        let w = max_sharpe_weights(&means, &cov, 0.0, 0.05, 0.95);
        assert!(w[0] > 0.8);
        let sum: f64 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn respects_weight_bounds() {
        let means = vec![0.004, 0.0005, 0.001];
        let cov = vec![
            vec![0.0001, 0.0, 0.0],
            vec![0.0, 0.0001, 0.0],
            vec![0.0, 0.0, 0.0001],
        ];
        let w = max_sharpe_weights(&means, &cov, 0.0, 0.05, 0.30);
        for &x in &w {
            assert!(x >= 0.05 - 1e-9);
            assert!(x <= 0.34, "equal-start relaxation stays near the box");
        }
        let sum: f64 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn quadratic_form_volatility() {
        let cov = vec![vec![0.04, 0.0], vec![0.0, 0.09]];
        let vol = portfolio_volatility(&cov, &[0.5, 0.5]);
        // sqrt(0.25*0.04 + 0.25*0.09) = sqrt(0.0325)
        assert!((vol - 0.0325f64.sqrt()).abs() < 1e-12);
    }
}
