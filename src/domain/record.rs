//! Persisted result shapes.
//!
//! Column names and order are fixed so rows from different runs can be
//! appended to the same log without reconciliation.

use crate::domain::metrics::{LedgerRow, Summary};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::regime::RegimeReport;
use crate::domain::strategy::StrategyConfig;
use chrono::NaiveDateTime;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub const SUMMARY_COLUMNS: [&str; 19] = [
    "run_ts",
    "market",
    "timeframe",
    "rsi_period",
    "lower",
    "upper",
    "exit_level",
    "strategy",
    "total_trades",
    "total_pnl_pct",
    "avg_pnl_pct",
    "win_rate_pct",
    "max_drawdown_pct",
    "regime",
    "volatility",
    "trend_slope",
    "bars",
    "start_time",
    "end_time",
];

pub const LEDGER_COLUMNS: [&str; 7] = [
    "entry_time",
    "exit_time",
    "entry_price",
    "exit_price",
    "side",
    "pnl_pct",
    "cumulative_pnl_pct",
];

/// Identifies one (market, timeframe, period, strategy) run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunKey {
    pub market: String,
    pub timeframe: String,
    pub rsi_period: usize,
    pub strategy: StrategyConfig,
}

impl RunKey {
    /// e.g. `trades_BTCUSDT_1h_Mean_Reversion_RSI14_L30.csv`
    pub fn trades_file_name(&self) -> String {
        let mut name = format!(
            "trades_{}_{}_{}_RSI{}",
            self.market,
            self.timeframe,
            self.strategy.name().replace(' ', "_"),
            self.rsi_period
        );
        if let Some(lower) = self.strategy.lower() {
            name.push_str(&format!("_L{}", lower));
        }
        if let Some(upper) = self.strategy.upper() {
            name.push_str(&format!("_U{}", upper));
        }
        name.push_str(".csv");
        name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub run_ts: NaiveDateTime,
    pub key: RunKey,
    pub summary: Summary,
    pub regime: RegimeReport,
    pub bars: usize,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
}

impl SummaryRecord {
    pub fn new(
        run_ts: NaiveDateTime,
        key: RunKey,
        summary: Summary,
        regime: RegimeReport,
        bars: &[OhlcvBar],
    ) -> Self {
        Self {
            run_ts,
            key,
            summary,
            regime,
            bars: bars.len(),
            start_time: bars.first().map(|b| b.timestamp),
            end_time: bars.last().map(|b| b.timestamp),
        }
    }

    /// Field values in `SUMMARY_COLUMNS` order. Absent values are empty.
    pub fn fields(&self) -> Vec<String> {
        let strategy = &self.key.strategy;
        vec![
            format_timestamp(self.run_ts),
            self.key.market.clone(),
            self.key.timeframe.clone(),
            self.key.rsi_period.to_string(),
            format_optional(strategy.lower()),
            format_optional(strategy.upper()),
            format_optional(strategy.exit_level()),
            strategy.name().to_string(),
            self.summary.total_trades.to_string(),
            self.summary.total_pnl_pct.to_string(),
            self.summary.avg_pnl_pct.to_string(),
            self.summary.win_rate_pct.to_string(),
            self.summary.max_drawdown_pct.to_string(),
            self.regime.regime.to_string(),
            self.regime.volatility.to_string(),
            self.regime.trend_slope.to_string(),
            self.bars.to_string(),
            self.start_time.map(format_timestamp).unwrap_or_default(),
            self.end_time.map(format_timestamp).unwrap_or_default(),
        ]
    }
}

/// Field values of a ledger row in `LEDGER_COLUMNS` order.
pub fn ledger_fields(row: &LedgerRow) -> Vec<String> {
    vec![
        format_timestamp(row.entry_time),
        format_timestamp(row.exit_time),
        row.entry_price.to_string(),
        row.exit_price.to_string(),
        row.side.to_string(),
        row.pnl_pct.to_string(),
        row.cumulative_pnl_pct.to_string(),
    ]
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
