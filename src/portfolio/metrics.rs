use crate::model::portfolio::PortfolioMetrics;
use crate::portfolio::returns::{sample_std, ReturnPanel};
use crate::portfolio::sharpe::{portfolio_return, portfolio_volatility};

/// Summarize a weight set: expected return, volatility, Sharpe ratio, and
/// the max drawdown of the cumulative path implied by the weights.
///
/// Volatility uses the covariance quadratic form when a matrix is
/// available, otherwise the sample deviation of the combined return path.
pub fn summarize(
    symbols: &[String],
    weights: &[f64],
    means: &[f64],
    cov: Option<&Vec<Vec<f64>>>,
    panel: &ReturnPanel,
    risk_free_rate: f64,
) -> PortfolioMetrics {
    let expected_return = portfolio_return(means, weights);
    let path = panel.weighted_path(symbols, weights);

    let volatility = match cov {
        Some(matrix) => portfolio_volatility(matrix, weights),
        None => sample_std(&path).unwrap_or(0.0),
    };
    let sharpe_ratio = if volatility > f64::EPSILON {
        (expected_return - risk_free_rate) / volatility
    } else {
        0.0
    };

    PortfolioMetrics {
        expected_return,
        volatility,
        sharpe_ratio,
        max_drawdown: max_drawdown(&path),
    }
}

/// Largest peak-to-trough loss of the cumulative return path, as a
/// positive fraction.
pub fn max_drawdown(path: &[f64]) -> f64 {
    let mut equity = 1.0;
    let mut peak = 1.0;
    let mut worst = 0.0f64;
    for &r in path {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        }
        let drawdown = (peak - equity) / peak;
        if drawdown > worst {
            worst = drawdown;
        }
    }
    worst
}
