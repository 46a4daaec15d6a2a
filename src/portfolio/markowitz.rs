//! Minimum-variance weighting (Markowitz) via projected gradient descent
//! on the simplex, with an inverse-volatility heuristic when no covariance
//! estimate exists.

const ITERATIONS: usize = 400;
const STEP: f64 = 0.05;
/// Penalty strength pulling the portfolio toward the target return.
const RETURN_PENALTY: f64 = 4.0;

/// Minimize `w' Σ w` subject to `Σw = 1, w >= 0`, tilted toward
/// `μ' w ≈ target_return` through a quadratic penalty.
pub fn min_variance_weights(means: &[f64], cov: &[Vec<f64>], target_return: f64) -> Vec<f64> {
    let n = means.len();
    if n == 0 {
        return Vec::new();
    }
    let mut weights = vec![1.0 / n as f64; n];

    for _ in 0..ITERATIONS {
        // grad of w'Σw is 2Σw; grad of penalty (μ'w - t)^2 is 2(μ'w - t)μ.
        let port_return: f64 = means.iter().zip(&weights).map(|(m, w)| m * w).sum();
        let return_gap = port_return - target_return;
        let mut grad = vec![0.0; n];
        for i in 0..n {
            let mut sigma_w = 0.0;
            for j in 0..n {
                sigma_w += cov[i][j] * weights[j];
            }
            grad[i] = 2.0 * sigma_w + 2.0 * RETURN_PENALTY * return_gap * means[i];
        }
        for i in 0..n {
            weights[i] -= STEP * grad[i];
        }
        weights = project_to_simplex(&weights);
    }
    weights
}

/// Equal-risk-contribution heuristic: weight inversely to volatility.
/// Symbols with unknown or zero volatility contribute zero raw weight and
/// are resolved by the caller's normalization fallback.
pub fn inverse_volatility_weights(volatilities: &[Option<f64>]) -> Vec<f64> {
    volatilities
        .iter()
        .map(|v| match v {
            Some(vol) if *vol > f64::EPSILON => 1.0 / vol,
            _ => 0.0,
        })
        .collect()
}

/// Euclidean projection onto `{ w : Σw = 1, w >= 0 }` (sort-based).
pub fn project_to_simplex(weights: &[f64]) -> Vec<f64> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    let mut sorted = weights.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let mut cumulative = 0.0;
    let mut rho = 0;
    let mut theta = 0.0;
    for (k, &v) in sorted.iter().enumerate() {
        cumulative += v;
        let candidate = (cumulative - 1.0) / (k + 1) as f64;
        if v - candidate > 0.0 {
            rho = k + 1;
            theta = candidate;
        }
    }
    if rho == 0 {
        // Degenerate input (all mass unreachable): fall back to uniform.
        return vec![1.0 / n as f64; n];
    }
    weights.iter().map(|&w| (w - theta).max(0.0)).collect()
}
