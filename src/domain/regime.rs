//! Market regime classification.
//!
//! Labels a series from two statistics over its most recent bars:
//! - volatility: sample stddev of simple returns over the trailing `window`
//!   bars, or over the whole series when it is shorter than `window`
//! - trend slope: OLS slope of ln(close) against bar offset 0..w-1 over the
//!   last w = min(window, len) bars
//!
//! Priority: |slope| > trend_threshold => trending, else volatility >
//! vol_threshold => volatile, else ranging. Fewer than `min_points` bars for
//! the fit gives unknown.

use crate::domain::indicator::stddev::{sample_stddev, simple_returns};
use crate::domain::ohlcv::OhlcvBar;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeConfig {
    pub window: usize,
    pub min_points: usize,
    pub trend_threshold: f64,
    pub vol_threshold: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            window: 50,
            min_points: 3,
            trend_threshold: 0.0005,
            vol_threshold: 0.005,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    Trending,
    Ranging,
    Volatile,
    Unknown,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Trending => "trending",
            Regime::Ranging => "ranging",
            Regime::Volatile => "volatile",
            Regime::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeReport {
    pub regime: Regime,
    pub volatility: f64,
    pub trend_slope: f64,
}

pub fn classify_regime(bars: &[OhlcvBar], config: &RegimeConfig) -> RegimeReport {
    let returns = simple_returns(bars);
    let volatility = if config.window > 0 && returns.len() >= config.window {
        sample_stddev(&returns[returns.len() - config.window..])
    } else {
        sample_stddev(&returns)
    };

    let w = config.window.min(bars.len());
    if w < config.min_points || w == 0 {
        return RegimeReport {
            regime: Regime::Unknown,
            volatility,
            trend_slope: 0.0,
        };
    }

    let log_closes: Vec<f64> = bars[bars.len() - w..].iter().map(|b| b.close.ln()).collect();
    let trend_slope = ols_slope(&log_closes);

    let regime = if trend_slope.abs() > config.trend_threshold {
        Regime::Trending
    } else if volatility > config.vol_threshold {
        Regime::Volatile
    } else {
        Regime::Ranging
    };

    RegimeReport {
        regime,
        volatility,
        trend_slope,
    }
}

/// Least-squares slope of `values` against 0..n-1. Zero when undetermined.
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let (mut num, mut den) = (0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }

    if den == 0.0 { 0.0 } else { num / den }
}
