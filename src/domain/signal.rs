//! RSI signal state machine.
//!
//! Walks an RSI series bar by bar and turns threshold crossings into trades.
//! States are `Flat` and `Open { side, entry_index }`; entries are only
//! considered while flat, so a second concurrent position cannot exist and an
//! exit can never be followed by a re-entry on the same bar.
//!
//! Bar 0 is never evaluated. Bars with undefined RSI are skipped without a
//! transition. A position still open after the last bar is closed on it.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::{Position, Side, Trade};
use crate::domain::strategy::{StrategyConfig, RSI_MIDLINE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Open(Side),
    Close,
}

/// Transition table keyed by strategy mode and current position.
///
/// `prev` is the RSI of the preceding bar, read only by the trend-following
/// entries.
pub fn transition(
    strategy: &StrategyConfig,
    position: Position,
    rsi: f64,
    prev: Option<f64>,
) -> Transition {
    use Position::{Flat, Open};

    match (*strategy, position) {
        (StrategyConfig::MeanReversion { lower, .. }, Flat) if rsi < lower => {
            Transition::Open(Side::Long)
        }
        (StrategyConfig::MeanReversion { exit_level, .. }, Open { side: Side::Long, .. })
            if rsi > exit_level =>
        {
            Transition::Close
        }

        (StrategyConfig::OverboughtReversal { upper, .. }, Flat) if rsi > upper => {
            Transition::Open(Side::Short)
        }
        (StrategyConfig::OverboughtReversal { exit_level, .. }, Open { side: Side::Short, .. })
            if rsi < exit_level =>
        {
            Transition::Close
        }

        (StrategyConfig::TrendFollowRsi, Flat) => match prev {
            Some(p) if p < RSI_MIDLINE && rsi > RSI_MIDLINE => Transition::Open(Side::Long),
            Some(p) if p > RSI_MIDLINE && rsi < RSI_MIDLINE => Transition::Open(Side::Short),
            _ => Transition::Stay,
        },
        (StrategyConfig::TrendFollowRsi, Open { side: Side::Long, .. }) if rsi < RSI_MIDLINE => {
            Transition::Close
        }
        (StrategyConfig::TrendFollowRsi, Open { side: Side::Short, .. }) if rsi > RSI_MIDLINE => {
            Transition::Close
        }

        _ => Transition::Stay,
    }
}

/// Walk `rsi` (aligned with `bars`) and return trades in the order they closed.
pub fn generate_trades(
    bars: &[OhlcvBar],
    rsi: &IndicatorSeries,
    strategy: &StrategyConfig,
) -> Vec<Trade> {
    let mut trades = Vec::new();
    let mut position = Position::Flat;

    for i in 1..bars.len() {
        let Some(value) = rsi.value_at(i) else {
            continue;
        };

        match transition(strategy, position, value, rsi.value_at(i - 1)) {
            Transition::Stay => {}
            Transition::Open(side) => {
                position = Position::Open {
                    side,
                    entry_index: i,
                };
            }
            Transition::Close => {
                trades.extend(position.close(i));
                position = Position::Flat;
            }
        }
    }

    // An entry on the final bar has no later bar to exit on and is dropped.
    if let Some(last) = bars.len().checked_sub(1) {
        trades.extend(position.close(last));
    }

    trades
}
