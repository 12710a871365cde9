//! CSV file data adapter.

use crate::domain::error::RsiLabError;
use crate::domain::ohlcv::{is_time_sorted, OhlcvBar};
use crate::domain::sweep::{parse_market_name, MarketFile};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const TIMESTAMP_COLUMNS: [&str; 4] = ["timestamp", "datetime", "date", "time"];

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Epoch values at or above this are read as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvAdapter;

impl CsvAdapter {
    pub fn new() -> Self {
        Self
    }
}

struct Columns {
    timestamp: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord, path: &Path) -> Result<Self, RsiLabError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| names.iter().position(|h| h == name);

        let timestamp = TIMESTAMP_COLUMNS
            .iter()
            .find_map(|&name| find(name))
            .ok_or_else(|| RsiLabError::DataLoad {
                path: path.display().to_string(),
                reason: "no timestamp column".into(),
            })?;
        let close = find("close").ok_or_else(|| RsiLabError::DataLoad {
            path: path.display().to_string(),
            reason: "no close column".into(),
        })?;

        Ok(Self {
            timestamp,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            close,
            volume: find("volume"),
        })
    }

    fn parse_row(&self, record: &csv::StringRecord) -> Option<OhlcvBar> {
        let timestamp = parse_timestamp(record.get(self.timestamp)?)?;
        let close = parse_number(record.get(self.close))?;
        if !close.is_finite() {
            return None;
        }
        let optional = |idx: Option<usize>| {
            parse_number(idx.and_then(|i| record.get(i))).unwrap_or(f64::NAN)
        };

        Some(OhlcvBar {
            timestamp,
            open: optional(self.open),
            high: optional(self.high),
            low: optional(self.low),
            close,
            volume: optional(self.volume),
        })
    }
}

fn parse_number(field: Option<&str>) -> Option<f64> {
    field.and_then(|s| s.trim().parse::<f64>().ok())
}

/// Parse the timestamp formats found in exchange exports.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    let epoch: i64 = s.parse().ok()?;
    let dt = if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(epoch)
    } else {
        DateTime::from_timestamp(epoch, 0)
    };
    dt.map(|d| d.naive_utc())
}

impl DataPort for CsvAdapter {
    fn load_series(&self, path: &Path) -> Result<Vec<OhlcvBar>, RsiLabError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| RsiLabError::DataLoad {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let headers = rdr.headers().map_err(|e| RsiLabError::DataLoad {
            path: path.display().to_string(),
            reason: format!("CSV header error: {}", e),
        })?;
        let columns = Columns::from_headers(headers, path)?;

        let mut bars = Vec::new();
        let mut dropped = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| RsiLabError::DataLoad {
                path: path.display().to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;
            match columns.parse_row(&record) {
                Some(bar) => bars.push(bar),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(path = %path.display(), dropped, "dropped unparseable rows");
        }

        if !is_time_sorted(&bars) {
            debug!(path = %path.display(), "sorting rows by timestamp");
            bars.sort_by_key(|b| b.timestamp);
        }
        Ok(bars)
    }

    fn list_markets(
        &self,
        dir: &Path,
        timeframes: &[String],
    ) -> Result<Vec<MarketFile>, RsiLabError> {
        let entries = fs::read_dir(dir).map_err(|e| RsiLabError::DataLoad {
            path: dir.display().to_string(),
            reason: format!("failed to read directory: {}", e),
        })?;

        let mut markets = Vec::new();

        for entry in entries {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if !path.is_file() || !is_csv {
                continue;
            }

            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            match parse_market_name(&stem, timeframes) {
                Some((market, timeframe)) => markets.push(MarketFile {
                    path,
                    market,
                    timeframe,
                }),
                None => warn!("skipping {}: no recognised timeframe", path.display()),
            }
        }

        markets.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(markets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ts(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn timeframes() -> Vec<String> {
        ["1m", "5m", "15m", "1h", "4h"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn load_series_reads_all_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "BTCUSDT_1h.csv",
            "timestamp,open,high,low,close,volume\n\
             2024-01-15 00:00:00,100.0,110.0,90.0,105.0,50000\n\
             2024-01-15 01:00:00,105.0,115.0,100.0,110.0,60000\n",
        );

        let bars = CsvAdapter::new().load_series(&path).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, ts(2024, 1, 15, 0, 0, 0));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000.0);
    }

    #[test]
    fn load_series_matches_headers_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "ETH_5m.csv",
            "Date,Close\n2024-03-01,10.5\n2024-03-02,11\n",
        );

        let bars = CsvAdapter::new().load_series(&path).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].timestamp, ts(2024, 3, 2, 0, 0, 0));
        assert_eq!(bars[1].close, 11.0);
        assert!(bars[0].open.is_nan());
        assert!(bars[0].volume.is_nan());
    }

    #[test]
    fn load_series_drops_bad_rows_and_sorts() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "X_1m.csv",
            "timestamp,close\n\
             2024-01-01T00:03:00,4\n\
             not a date,9\n\
             2024-01-01T00:01:00,\n\
             2024-01-01T00:02:00,abc\n\
             2024-01-01T00:00:00,1\n\
             2024-01-01T00:05:00,NaN\n",
        );

        let bars = CsvAdapter::new().load_series(&path).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 1.0);
        assert_eq!(bars[1].close, 4.0);
    }

    #[test]
    fn load_series_without_close_column_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "X_1m.csv", "timestamp,open\n2024-01-01,1\n");

        let err = CsvAdapter::new().load_series(&path).unwrap_err();
        assert!(matches!(err, RsiLabError::DataLoad { reason, .. } if reason.contains("close")));
    }

    #[test]
    fn load_series_without_timestamp_column_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "X_1m.csv", "open,close\n1,2\n");

        let err = CsvAdapter::new().load_series(&path).unwrap_err();
        assert!(matches!(err, RsiLabError::DataLoad { .. }));
    }

    #[test]
    fn load_series_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = CsvAdapter::new().load_series(&dir.path().join("nope.csv"));
        assert!(matches!(result, Err(RsiLabError::DataLoad { .. })));
    }

    #[test]
    fn parse_timestamp_formats() {
        let expected = ts(2024, 5, 6, 7, 8, 9);
        assert_eq!(parse_timestamp("2024-05-06T07:08:09Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-06T09:08:09+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-06 07:08:09"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-06T07:08:09"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-05-06 07:08"),
            Some(ts(2024, 5, 6, 7, 8, 0))
        );
        assert_eq!(parse_timestamp("2024-05-06"), Some(ts(2024, 5, 6, 0, 0, 0)));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn parse_timestamp_epochs() {
        let expected = ts(2024, 1, 1, 0, 0, 0);
        assert_eq!(parse_timestamp("1704067200"), Some(expected));
        assert_eq!(parse_timestamp("1704067200000"), Some(expected));
    }

    #[test]
    fn list_markets_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in [
            "SOL_USDT_15m.csv",
            "BTC-USDT_1h.csv",
            "ETHUSDT_5m.csv",
            "SPY_1d.csv",
            "notes.txt",
        ] {
            write_file(&dir, name, "timestamp,close\n");
        }

        let markets = CsvAdapter::new()
            .list_markets(dir.path(), &timeframes())
            .unwrap();

        let summary: Vec<(&str, &str)> = markets
            .iter()
            .map(|m| (m.market.as_str(), m.timeframe.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("BTCUSDT", "1h"), ("ETHUSDT", "5m"), ("SOLUSDT", "15m")]
        );
    }

    #[test]
    fn list_markets_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let result = CsvAdapter::new().list_markets(&dir.path().join("missing"), &timeframes());
        assert!(matches!(result, Err(RsiLabError::DataLoad { .. })));
    }
}
