//! Backtest entry points.
//!
//! A run is stateless: bars + RSI + strategy in, trades + ledger + summary out.

use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::metrics::{build_ledger, LedgerRow, Summary};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::Trade;
use crate::domain::regime::{classify_regime, RegimeConfig, RegimeReport};
use crate::domain::signal::generate_trades;
use crate::domain::strategy::StrategyConfig;

/// One series evaluated against one or more strategies at a single RSI period.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub rsi_period: usize,
    pub strategies: Vec<StrategyConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub ledger: Vec<LedgerRow>,
    pub summary: Summary,
}

/// Run one strategy over bars with a precomputed, aligned RSI series.
pub fn run_backtest(
    bars: &[OhlcvBar],
    rsi: &IndicatorSeries,
    strategy: &StrategyConfig,
) -> BacktestResult {
    let trades = generate_trades(bars, rsi, strategy);
    let ledger = build_ledger(&trades, bars);
    let summary = Summary::compute(&ledger);

    BacktestResult {
        trades,
        ledger,
        summary,
    }
}

/// Everything one invocation produces for a single series and config.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// One result per configured strategy, in the same order.
    pub results: Vec<BacktestResult>,
    pub regime: RegimeReport,
}

/// Compute RSI once, run every strategy over it and classify the regime.
pub fn evaluate(
    bars: &[OhlcvBar],
    config: &BacktestConfig,
    regime_config: &RegimeConfig,
) -> Evaluation {
    let rsi = calculate_rsi(bars, config.rsi_period);
    Evaluation {
        results: config
            .strategies
            .iter()
            .map(|strategy| run_backtest(bars, &rsi, strategy))
            .collect(),
        regime: classify_regime(bars, regime_config),
    }
}
