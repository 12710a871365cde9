//! Parameter sweep over market files.
//!
//! Every market file is loaded once, its regime classified once, RSI computed
//! once per period, and each strategy case of the grid run against it. Files
//! that fail to load, or have fewer than `min_bars` bars after the first, are
//! skipped; sink errors abort.

use crate::domain::backtest::run_backtest;
use crate::domain::error::RsiLabError;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::record::{RunKey, SummaryRecord};
use crate::domain::regime::{classify_regime, RegimeConfig};
use crate::domain::strategy::StrategyConfig;
use crate::ports::data_port::DataPort;
use crate::ports::result_port::ResultPort;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub data_dir: PathBuf,
    pub results_dir: PathBuf,
    pub rsi_periods: Vec<usize>,
    pub lower_thresholds: Vec<f64>,
    pub upper_thresholds: Vec<f64>,
    pub exit_level: f64,
    pub timeframes: Vec<String>,
    pub min_bars: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            results_dir: PathBuf::from("results"),
            rsi_periods: vec![7, 14, 21],
            lower_thresholds: vec![30.0, 25.0, 20.0, 15.0],
            upper_thresholds: vec![70.0, 75.0, 80.0, 85.0],
            exit_level: 50.0,
            timeframes: ["1m", "5m", "15m", "1h", "4h"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_bars: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketFile {
    pub path: PathBuf,
    pub market: String,
    pub timeframe: String,
}

/// Split a file stem like `BTC_USDT_15m` into (`BTCUSDT`, `15m`). The longest
/// matching timeframe suffix wins so `15m` is not read as `5m`.
pub fn parse_market_name(stem: &str, timeframes: &[String]) -> Option<(String, String)> {
    let timeframe = timeframes
        .iter()
        .filter(|tf| !tf.is_empty() && stem.ends_with(tf.as_str()))
        .max_by_key(|tf| tf.len())?;

    let market: String = stem[..stem.len() - timeframe.len()]
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | '/'))
        .collect();

    if market.is_empty() {
        return None;
    }
    Some((market, timeframe.clone()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepCase {
    pub rsi_period: usize,
    pub strategy: StrategyConfig,
}

/// Cases grouped by RSI period, in config order: mean reversion per lower
/// threshold, overbought reversal per upper threshold, then trend-follow.
pub fn build_grid(config: &SweepConfig) -> Vec<SweepCase> {
    let mut grid = Vec::new();
    for &rsi_period in &config.rsi_periods {
        for &lower in &config.lower_thresholds {
            grid.push(SweepCase {
                rsi_period,
                strategy: StrategyConfig::MeanReversion {
                    lower,
                    exit_level: config.exit_level,
                },
            });
        }
        for &upper in &config.upper_thresholds {
            grid.push(SweepCase {
                rsi_period,
                strategy: StrategyConfig::OverboughtReversal {
                    upper,
                    exit_level: config.exit_level,
                },
            });
        }
        grid.push(SweepCase {
            rsi_period,
            strategy: StrategyConfig::TrendFollowRsi,
        });
    }
    grid
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub runs: usize,
    pub trades: usize,
}

pub fn run_sweep(
    data: &dyn DataPort,
    sink: &dyn ResultPort,
    config: &SweepConfig,
    regime_config: &RegimeConfig,
    run_ts: NaiveDateTime,
) -> Result<SweepReport, RsiLabError> {
    let markets = data.list_markets(&config.data_dir, &config.timeframes)?;
    if markets.is_empty() {
        return Err(RsiLabError::NoData {
            path: config.data_dir.display().to_string(),
        });
    }

    let grid = build_grid(config);
    info!(
        files = markets.len(),
        cases = grid.len(),
        "starting sweep"
    );

    let mut report = SweepReport::default();

    for market in &markets {
        let bars = match data.load_series(&market.path) {
            Ok(bars) => bars,
            Err(e) => {
                warn!("skipping {}: {}", market.path.display(), e);
                report.files_skipped += 1;
                continue;
            }
        };

        // The first bar carries no price change and does not count.
        let usable = bars.len().saturating_sub(1);
        if usable < config.min_bars {
            let err = RsiLabError::InsufficientData {
                path: market.path.display().to_string(),
                bars: usable,
                minimum: config.min_bars,
            };
            warn!("skipping: {}", err);
            report.files_skipped += 1;
            continue;
        }

        let regime = classify_regime(&bars, regime_config);
        info!(
            market = %market.market,
            timeframe = %market.timeframe,
            bars = bars.len(),
            regime = %regime.regime,
            "processing"
        );

        for cases in grid.chunk_by(|a, b| a.rsi_period == b.rsi_period) {
            let rsi = calculate_rsi(&bars, cases[0].rsi_period);

            for case in cases {
                let result = run_backtest(&bars, &rsi, &case.strategy);
                debug!(
                    strategy = %case.strategy,
                    rsi_period = case.rsi_period,
                    trades = result.summary.total_trades,
                    "run complete"
                );

                let key = RunKey {
                    market: market.market.clone(),
                    timeframe: market.timeframe.clone(),
                    rsi_period: case.rsi_period,
                    strategy: case.strategy,
                };
                let record = SummaryRecord::new(run_ts, key, result.summary.clone(), regime, &bars);
                sink.record_run(&record, &result.ledger)?;

                report.runs += 1;
                report.trades += result.summary.total_trades;
            }
        }

        report.files_processed += 1;
    }

    info!(
        processed = report.files_processed,
        skipped = report.files_skipped,
        runs = report.runs,
        "sweep complete"
    );
    Ok(report)
}
