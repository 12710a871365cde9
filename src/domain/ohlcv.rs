//! OHLCV bar representation.

use chrono::NaiveDateTime;

/// One bar of a market series. Only `close` is guaranteed finite after
/// loading; the other price fields and volume may be NaN when the source
/// file lacked the column.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// Simple return of this bar's close against `prev_close`.
    pub fn simple_return(&self, prev_close: f64) -> f64 {
        (self.close - prev_close) / prev_close
    }
}

/// Close prices of a bar slice, in order.
pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// True when the bars are sorted ascending by timestamp (ties allowed).
pub fn is_time_sorted(bars: &[OhlcvBar]) -> bool {
    bars.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
}
