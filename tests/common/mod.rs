#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rsilab::domain::error::RsiLabError;
use rsilab::domain::metrics::LedgerRow;
pub use rsilab::domain::ohlcv::OhlcvBar;
use rsilab::domain::record::{RunKey, SummaryRecord};
use rsilab::domain::sweep::MarketFile;
use rsilab::ports::data_port::DataPort;
use rsilab::ports::result_port::ResultPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// In-memory market files keyed by path.
pub struct MockDataPort {
    pub markets: Vec<MarketFile>,
    pub data: HashMap<PathBuf, Vec<OhlcvBar>>,
    pub errors: HashMap<PathBuf, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            markets: Vec::new(),
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_market(mut self, market: &str, timeframe: &str, bars: Vec<OhlcvBar>) -> Self {
        let path = PathBuf::from(format!("{}_{}.csv", market, timeframe));
        self.markets.push(MarketFile {
            path: path.clone(),
            market: market.to_string(),
            timeframe: timeframe.to_string(),
        });
        self.data.insert(path, bars);
        self
    }

    pub fn with_error(mut self, market: &str, timeframe: &str, reason: &str) -> Self {
        let path = PathBuf::from(format!("{}_{}.csv", market, timeframe));
        self.markets.push(MarketFile {
            path: path.clone(),
            market: market.to_string(),
            timeframe: timeframe.to_string(),
        });
        self.errors.insert(path, reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_series(&self, path: &Path) -> Result<Vec<OhlcvBar>, RsiLabError> {
        if let Some(reason) = self.errors.get(path) {
            return Err(RsiLabError::DataLoad {
                path: path.display().to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(path).cloned().unwrap_or_default())
    }

    fn list_markets(
        &self,
        _dir: &Path,
        _timeframes: &[String],
    ) -> Result<Vec<MarketFile>, RsiLabError> {
        Ok(self.markets.clone())
    }
}

/// Records everything it is handed.
#[derive(Default)]
pub struct MockResultPort {
    pub summaries: RefCell<Vec<SummaryRecord>>,
    pub trades: RefCell<Vec<(RunKey, Vec<LedgerRow>)>>,
    pub fail_summaries: bool,
}

impl MockResultPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_summaries: true,
            ..Self::default()
        }
    }
}

impl ResultPort for MockResultPort {
    fn append_summary(&self, record: &SummaryRecord) -> Result<(), RsiLabError> {
        if self.fail_summaries {
            return Err(RsiLabError::ResultWrite {
                path: "mock".into(),
                reason: "disk full".into(),
            });
        }
        self.summaries.borrow_mut().push(record.clone());
        Ok(())
    }

    fn write_trades(&self, key: &RunKey, ledger: &[LedgerRow]) -> Result<(), RsiLabError> {
        self.trades.borrow_mut().push((key.clone(), ledger.to_vec()));
        Ok(())
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn run_ts() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 30)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Hourly bars with the given closes.
pub fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            timestamp: start_time() + chrono::Duration::hours(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        })
        .collect()
}

pub fn alternating(n: usize, a: f64, b: f64) -> Vec<f64> {
    (0..n).map(|i| if i % 2 == 0 { a } else { b }).collect()
}

/// Falls 100 -> 70 in steps of 5, then rises back to 110.
pub fn v_shape() -> Vec<f64> {
    vec![
        100.0, 95.0, 90.0, 85.0, 80.0, 75.0, 70.0, 75.0, 80.0, 85.0, 90.0, 95.0, 100.0, 105.0,
        110.0,
    ]
}

/// Deterministic oscillating series with drift, long enough for every period.
pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            100.0 + 8.0 * (x / 5.0).sin() + 3.0 * (x / 2.3).cos() + 0.02 * x
        })
        .collect()
}

pub fn csv_content(closes: &[f64]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for bar in make_bars(closes) {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    out
}
