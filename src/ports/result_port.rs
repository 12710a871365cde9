//! Result persistence port trait.

use crate::domain::error::RsiLabError;
use crate::domain::metrics::LedgerRow;
use crate::domain::record::{RunKey, SummaryRecord};

/// Sink for run outputs. Summaries are appended to a shared log; each run's
/// trade ledger goes to its own table.
pub trait ResultPort {
    fn append_summary(&self, record: &SummaryRecord) -> Result<(), RsiLabError>;

    fn write_trades(&self, key: &RunKey, ledger: &[LedgerRow]) -> Result<(), RsiLabError>;

    /// Persist a run: always the summary, the ledger only when non-empty.
    fn record_run(&self, record: &SummaryRecord, ledger: &[LedgerRow]) -> Result<(), RsiLabError> {
        self.append_summary(record)?;
        if !ledger.is_empty() {
            self.write_trades(&record.key, ledger)?;
        }
        Ok(())
    }
}
