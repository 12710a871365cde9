//! CSV result sink.
//!
//! Summaries accumulate in one append-only log across runs; each run with
//! trades gets its own ledger file next to it.

use crate::domain::error::RsiLabError;
use crate::domain::metrics::LedgerRow;
use crate::domain::record::{ledger_fields, RunKey, SummaryRecord, LEDGER_COLUMNS, SUMMARY_COLUMNS};
use crate::ports::result_port::ResultPort;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SUMMARY_FILE_NAME: &str = "rsi_strategy_results.csv";

pub struct CsvResultAdapter {
    results_dir: PathBuf,
}

impl CsvResultAdapter {
    /// Create the adapter, creating `results_dir` if needed.
    pub fn new(results_dir: PathBuf) -> Result<Self, RsiLabError> {
        fs::create_dir_all(&results_dir).map_err(|e| write_error(&results_dir, e))?;
        Ok(Self { results_dir })
    }

    pub fn summary_path(&self) -> PathBuf {
        self.results_dir.join(SUMMARY_FILE_NAME)
    }

    pub fn trades_path(&self, key: &RunKey) -> PathBuf {
        self.results_dir.join(key.trades_file_name())
    }
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> RsiLabError {
    RsiLabError::ResultWrite {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

impl ResultPort for CsvResultAdapter {
    fn append_summary(&self, record: &SummaryRecord) -> Result<(), RsiLabError> {
        let path = self.summary_path();
        let is_new = !path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| write_error(&path, e))?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            wtr.write_record(SUMMARY_COLUMNS)
                .map_err(|e| write_error(&path, e))?;
        }
        wtr.write_record(record.fields())
            .map_err(|e| write_error(&path, e))?;
        wtr.flush().map_err(|e| write_error(&path, e))?;
        Ok(())
    }

    fn write_trades(&self, key: &RunKey, ledger: &[LedgerRow]) -> Result<(), RsiLabError> {
        if ledger.is_empty() {
            return Ok(());
        }

        let path = self.trades_path(key);
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| write_error(&path, e))?;

        wtr.write_record(LEDGER_COLUMNS)
            .map_err(|e| write_error(&path, e))?;
        for row in ledger {
            wtr.write_record(ledger_fields(row))
                .map_err(|e| write_error(&path, e))?;
        }
        wtr.flush().map_err(|e| write_error(&path, e))?;

        debug!(path = %path.display(), trades = ledger.len(), "wrote trade ledger");
        Ok(())
    }
}
