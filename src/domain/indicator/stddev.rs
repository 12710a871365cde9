//! Simple returns and their sample standard deviation.
//!
//! Returns are close-to-close: r[i] = C[i] / C[i-1] - 1, with r[0] = 0.

use crate::domain::ohlcv::OhlcvBar;

/// Simple returns of the bar closes; the first (undefined) return is 0.
pub fn simple_returns(bars: &[OhlcvBar]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(bars.len());
    if !bars.is_empty() {
        returns.push(0.0);
    }
    for w in bars.windows(2) {
        returns.push(w[1].simple_return(w[0].close));
    }
    returns
}

/// Sample standard deviation. Fewer than two values give 0.0.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
