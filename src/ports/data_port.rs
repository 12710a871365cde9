//! Data access port trait.

use crate::domain::error::RsiLabError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::sweep::MarketFile;
use std::path::Path;

pub trait DataPort {
    /// Load one cleaned series, sorted ascending by timestamp.
    fn load_series(&self, path: &Path) -> Result<Vec<OhlcvBar>, RsiLabError>;

    /// Market files under `dir` whose names end in one of `timeframes`.
    fn list_markets(&self, dir: &Path, timeframes: &[String])
    -> Result<Vec<MarketFile>, RsiLabError>;
}
