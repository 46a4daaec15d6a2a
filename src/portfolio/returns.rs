use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-symbol daily return series supplied by the caller.
///
/// Keyed with a BTreeMap so estimation and optimization are deterministic
/// regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnPanel {
    series: BTreeMap<String, Vec<f64>>,
}

impl ReturnPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, returns: Vec<f64>) {
        self.series.insert(symbol.into(), returns);
    }

    pub fn get(&self, symbol: &str) -> Option<&[f64]> {
        self.series.get(symbol).map(|v| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Panel restricted to the trailing `days` observations of each series.
    pub fn trailing(&self, days: usize) -> Self {
        let mut out = Self::new();
        for (symbol, returns) in &self.series {
            let start = returns.len().saturating_sub(days);
            out.insert(symbol.clone(), returns[start..].to_vec());
        }
        out
    }

    pub fn mean_return(&self, symbol: &str) -> Option<f64> {
        let returns = self.series.get(symbol)?;
        if returns.is_empty() {
            return None;
        }
        Some(returns.iter().sum::<f64>() / returns.len() as f64)
    }

    pub fn volatility(&self, symbol: &str) -> Option<f64> {
        let returns = self.series.get(symbol)?;
        sample_std(returns)
    }

    /// Sample covariance over the overlapping tail of two series.
    pub fn covariance(&self, a: &str, b: &str) -> Option<f64> {
        let sa = self.series.get(a)?;
        let sb = self.series.get(b)?;
        let n = sa.len().min(sb.len());
        if n < 2 {
            return None;
        }
        let sa = &sa[sa.len() - n..];
        let sb = &sb[sb.len() - n..];
        let ma = sa.iter().sum::<f64>() / n as f64;
        let mb = sb.iter().sum::<f64>() / n as f64;
        let cov = sa
            .iter()
            .zip(sb)
            .map(|(x, y)| (x - ma) * (y - mb))
            .sum::<f64>()
            / (n - 1) as f64;
        Some(cov)
    }

    /// Full covariance matrix for `symbols`, or `None` when any pair lacks
    /// enough overlapping history.
    pub fn covariance_matrix(&self, symbols: &[String]) -> Option<Vec<Vec<f64>>> {
        let n = symbols.len();
        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i..n {
                let cov = self.covariance(&symbols[i], &symbols[j])?;
                matrix[i][j] = cov;
                matrix[j][i] = cov;
            }
        }
        Some(matrix)
    }

    /// Combined daily return path implied by a weight vector, truncated to
    /// the shortest member series.
    pub fn weighted_path(&self, symbols: &[String], weights: &[f64]) -> Vec<f64> {
        let mut len = usize::MAX;
        for symbol in symbols {
            match self.series.get(symbol) {
                Some(s) if !s.is_empty() => len = len.min(s.len()),
                _ => return Vec::new(),
            }
        }
        if len == usize::MAX {
            return Vec::new();
        }
        let mut path = vec![0.0; len];
        for (symbol, &weight) in symbols.iter().zip(weights) {
            let series = &self.series[symbol];
            let tail = &series[series.len() - len..];
            for (t, r) in tail.iter().enumerate() {
                path[t] += weight * r;
            }
        }
        path
    }
}

pub(crate) fn sample_std(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}
