//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_result_adapter::CsvResultAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{evaluate, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    parse_f64_list, parse_usize_list, validate_backtest_params, validate_regime_config,
    validate_sweep_config,
};
use crate::domain::error::RsiLabError;
use crate::domain::metrics::LedgerRow;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::record::{format_timestamp, RunKey, SummaryRecord};
use crate::domain::regime::{classify_regime, RegimeConfig, RegimeReport};
use crate::domain::strategy::StrategyConfig;
use crate::domain::sweep::{build_grid, parse_market_name, run_sweep, SweepConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::result_port::ResultPort;

#[derive(Parser, Debug)]
#[command(name = "rsilab", about = "RSI strategy backtester and parameter sweeper")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest one strategy (or all three) on a single OHLCV file
    Backtest {
        #[arg(short, long)]
        file: PathBuf,
        /// mean_reversion, overbought_reversal, trend_follow_rsi or all
        #[arg(short, long, default_value = "mean_reversion")]
        mode: String,
        #[arg(short, long, default_value_t = 14)]
        period: usize,
        #[arg(long, default_value_t = 30.0)]
        lower: f64,
        #[arg(long, default_value_t = 70.0)]
        upper: f64,
        #[arg(long, default_value_t = 50.0)]
        exit_level: f64,
        #[arg(long)]
        market: Option<String>,
        #[arg(long)]
        timeframe: Option<String>,
        /// Persist summary and trades under this directory
        #[arg(long)]
        results_dir: Option<PathBuf>,
        #[arg(long)]
        show_trades: bool,
        /// INI file whose [regime] section overrides the regime thresholds
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run the parameter sweep over every market file in the data directory
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Classify the market regime of a single file
    Regime {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a sweep configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Options for a single-file backtest.
#[derive(Debug, Clone)]
pub struct BacktestArgs {
    pub file: PathBuf,
    pub mode: String,
    pub period: usize,
    pub lower: f64,
    pub upper: f64,
    pub exit_level: f64,
    pub market: Option<String>,
    pub timeframe: Option<String>,
    pub results_dir: Option<PathBuf>,
    pub show_trades: bool,
    pub config: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            file,
            mode,
            period,
            lower,
            upper,
            exit_level,
            market,
            timeframe,
            results_dir,
            show_trades,
            config,
        } => run_backtest_command(&BacktestArgs {
            file,
            mode,
            period,
            lower,
            upper,
            exit_level,
            market,
            timeframe,
            results_dir,
            show_trades,
            config,
        }),
        Command::Sweep { config } => run_sweep_command(&config),
        Command::Regime { file, config } => run_regime_command(&file, config.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, RsiLabError> {
    info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Strategies selected by `mode`; `all` expands to every mode in order.
pub fn build_strategies(
    mode: &str,
    lower: f64,
    upper: f64,
    exit_level: f64,
) -> Result<Vec<StrategyConfig>, RsiLabError> {
    if mode.trim().eq_ignore_ascii_case("all") {
        StrategyConfig::MODES
            .iter()
            .map(|m| StrategyConfig::from_mode(m, lower, upper, exit_level))
            .collect()
    } else {
        Ok(vec![StrategyConfig::from_mode(mode, lower, upper, exit_level)?])
    }
}

/// Market and timeframe for a file: explicit values win, then the file name,
/// then the bare stem with an `unknown` timeframe.
pub fn resolve_market(
    file: &Path,
    market: Option<&str>,
    timeframe: Option<&str>,
) -> (String, String) {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parsed = parse_market_name(&stem, &SweepConfig::default().timeframes);

    let market = market
        .map(str::to_string)
        .or_else(|| parsed.as_ref().map(|(m, _)| m.clone()))
        .unwrap_or_else(|| stem.clone());
    let timeframe = timeframe
        .map(str::to_string)
        .or_else(|| parsed.map(|(_, tf)| tf))
        .unwrap_or_else(|| "unknown".to_string());
    (market, timeframe)
}

pub fn build_sweep_config(config: &dyn ConfigPort) -> Result<SweepConfig, RsiLabError> {
    validate_sweep_config(config)?;
    let defaults = SweepConfig::default();

    let min_bars = config.get_int("sweep", "min_bars", defaults.min_bars as i64);

    Ok(SweepConfig {
        data_dir: config
            .get_string("sweep", "data_dir")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir),
        results_dir: config
            .get_string("sweep", "results_dir")
            .map(PathBuf::from)
            .unwrap_or(defaults.results_dir),
        rsi_periods: parse_usize_list(config, "sweep", "rsi_periods", &defaults.rsi_periods)?,
        lower_thresholds: parse_f64_list(
            config,
            "sweep",
            "lower_thresholds",
            &defaults.lower_thresholds,
        )?,
        upper_thresholds: parse_f64_list(
            config,
            "sweep",
            "upper_thresholds",
            &defaults.upper_thresholds,
        )?,
        exit_level: config.get_double("sweep", "exit_level", defaults.exit_level),
        timeframes: config
            .get_list("sweep", "timeframes")
            .unwrap_or(defaults.timeframes),
        min_bars: usize::try_from(min_bars).unwrap_or(defaults.min_bars),
    })
}

pub fn build_regime_config(config: &dyn ConfigPort) -> Result<RegimeConfig, RsiLabError> {
    validate_regime_config(config)?;
    let defaults = RegimeConfig::default();

    let window = config.get_int("regime", "window", defaults.window as i64);
    let min_points = config.get_int("regime", "min_points", defaults.min_points as i64);

    Ok(RegimeConfig {
        window: usize::try_from(window).unwrap_or(defaults.window),
        min_points: usize::try_from(min_points).unwrap_or(defaults.min_points),
        trend_threshold: config.get_double("regime", "trend_threshold", defaults.trend_threshold),
        vol_threshold: config.get_double("regime", "vol_threshold", defaults.vol_threshold),
    })
}

/// Regime settings from an optional INI file, defaults otherwise.
pub fn load_regime_config(path: Option<&Path>) -> Result<RegimeConfig, RsiLabError> {
    match path {
        Some(path) => build_regime_config(&load_config(path)?),
        None => Ok(RegimeConfig::default()),
    }
}

fn load_bars(data: &dyn DataPort, file: &Path) -> Result<Vec<OhlcvBar>, RsiLabError> {
    let bars = data.load_series(file)?;
    if bars.is_empty() {
        return Err(RsiLabError::NoData {
            path: file.display().to_string(),
        });
    }
    info!("loaded {} bars from {}", bars.len(), file.display());
    Ok(bars)
}

fn run_backtest_command(args: &BacktestArgs) -> Result<(), RsiLabError> {
    validate_backtest_params(args.period, args.lower, args.upper, args.exit_level)?;
    let strategies = build_strategies(&args.mode, args.lower, args.upper, args.exit_level)?;
    let regime_config = load_regime_config(args.config.as_deref())?;
    let bars = load_bars(&CsvAdapter::new(), &args.file)?;
    let (market, timeframe) =
        resolve_market(&args.file, args.market.as_deref(), args.timeframe.as_deref());

    let sink = args
        .results_dir
        .as_ref()
        .map(|dir| CsvResultAdapter::new(dir.clone()))
        .transpose()?;

    let config = BacktestConfig {
        rsi_period: args.period,
        strategies,
    };
    let evaluation = evaluate(&bars, &config, &regime_config);
    let run_ts = Utc::now().naive_utc();

    println!(
        "{} {} | {} bars | {} .. {}",
        market,
        timeframe,
        bars.len(),
        bars.first().map(|b| format_timestamp(b.timestamp)).unwrap_or_default(),
        bars.last().map(|b| format_timestamp(b.timestamp)).unwrap_or_default(),
    );
    print_regime(&evaluation.regime);

    for (strategy, result) in config.strategies.iter().zip(&evaluation.results) {
        print_result(strategy, args.period, result);
        if args.show_trades {
            print_ledger(&result.ledger);
        }

        if let Some(sink) = &sink {
            let key = RunKey {
                market: market.clone(),
                timeframe: timeframe.clone(),
                rsi_period: args.period,
                strategy: *strategy,
            };
            let record = SummaryRecord::new(
                run_ts,
                key,
                result.summary.clone(),
                evaluation.regime,
                &bars,
            );
            sink.record_run(&record, &result.ledger)?;
        }
    }

    if let Some(sink) = &sink {
        println!("\nResults appended to: {}", sink.summary_path().display());
    }
    Ok(())
}

fn run_sweep_command(config_path: &Path) -> Result<(), RsiLabError> {
    let adapter = load_config(config_path)?;
    let sweep_config = build_sweep_config(&adapter)?;
    let regime_config = build_regime_config(&adapter)?;

    let data = CsvAdapter::new();
    let sink = CsvResultAdapter::new(sweep_config.results_dir.clone())?;

    let report = run_sweep(
        &data,
        &sink,
        &sweep_config,
        &regime_config,
        Utc::now().naive_utc(),
    )?;

    println!("=== Sweep Complete ===");
    println!("Files processed:  {}", report.files_processed);
    println!("Files skipped:    {}", report.files_skipped);
    println!("Runs:             {}", report.runs);
    println!("Trades:           {}", report.trades);
    println!("Summary log:      {}", sink.summary_path().display());
    Ok(())
}

fn run_regime_command(file: &Path, config_path: Option<&Path>) -> Result<(), RsiLabError> {
    let regime_config = load_regime_config(config_path)?;
    let bars = load_bars(&CsvAdapter::new(), file)?;
    print_regime(&classify_regime(&bars, &regime_config));
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), RsiLabError> {
    let adapter = load_config(config_path)?;
    let sweep_config = build_sweep_config(&adapter)?;
    build_regime_config(&adapter)?;

    println!("Configuration is valid");
    println!("  Data dir:     {}", sweep_config.data_dir.display());
    println!("  Results dir:  {}", sweep_config.results_dir.display());
    println!("  RSI periods:  {:?}", sweep_config.rsi_periods);
    println!("  Timeframes:   {}", sweep_config.timeframes.join(","));
    println!("  Grid size:    {} runs per file", build_grid(&sweep_config).len());
    Ok(())
}

fn print_regime(report: &RegimeReport) {
    println!(
        "Regime: {} (volatility={:.6}, slope={:.6})",
        report.regime, report.volatility, report.trend_slope
    );
}

fn print_result(strategy: &StrategyConfig, period: usize, result: &BacktestResult) {
    let s = &result.summary;
    println!("\n=== {} RSI({}) ===", strategy, period);
    println!("Total Trades:     {}", s.total_trades);
    println!("Total PnL:        {:.2}%", s.total_pnl_pct);
    println!("Avg PnL:          {:.2}%", s.avg_pnl_pct);
    println!("Win Rate:         {:.1}%", s.win_rate_pct);
    println!("Max Drawdown:     {:.2}%", s.max_drawdown_pct);
}

fn print_ledger(ledger: &[LedgerRow]) {
    if ledger.is_empty() {
        return;
    }
    println!(
        "  {:<26} {:<26} {:>12} {:>12} {:<5} {:>9} {:>9}",
        "entry", "exit", "entry_px", "exit_px", "side", "pnl%", "cum%"
    );
    for row in ledger {
        println!(
            "  {:<26} {:<26} {:>12.4} {:>12.4} {:<5} {:>9.2} {:>9.2}",
            format_timestamp(row.entry_time),
            format_timestamp(row.exit_time),
            row.entry_price,
            row.exit_price,
            row.side,
            row.pnl_pct,
            row.cumulative_pnl_pct,
        );
    }
}
