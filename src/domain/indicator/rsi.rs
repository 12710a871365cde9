//! RSI (Relative Strength Index) indicator implementation.
//!
//! Average gain/loss use an unadjusted exponential moving average with
//! `alpha = 1/period`, seeded by the first price change:
//! - avg[1] = x[1]
//! - avg[t] = (1 - alpha) * avg[t-1] + alpha * x[t]
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / (avg_loss + RSI_EPSILON)))
//!
//! Warmup: the first `period` bars are invalid. Bar 0 has no price change at all.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{closes, OhlcvBar};

/// Guard added to the average loss so runs without down-moves stay defined.
pub const RSI_EPSILON: f64 = 1e-9;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let raw = rsi_values(&closes(bars), period);

    let values = bars
        .iter()
        .zip(raw)
        .map(|(bar, rsi)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: rsi.is_some(),
            value: rsi.unwrap_or(0.0),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

/// RSI over a bare close-price sequence; `None` marks warm-up entries.
pub fn rsi_values(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < 2 {
        return out;
    }

    let alpha = 1.0 / period as f64;
    let mut averages: Option<(f64, f64)> = None;

    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        if !change.is_finite() {
            continue;
        }

        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        let (avg_gain, avg_loss) = match averages {
            None => (gain, loss),
            Some((prev_gain, prev_loss)) => (
                (1.0 - alpha) * prev_gain + alpha * gain,
                (1.0 - alpha) * prev_loss + alpha * loss,
            ),
        };
        averages = Some((avg_gain, avg_loss));

        if i >= period {
            let rs = avg_gain / (avg_loss + RSI_EPSILON);
            out[i] = Some(100.0 - (100.0 / (1.0 + rs)));
        }
    }

    out
}
