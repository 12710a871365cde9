//! Domain error types.

/// Top-level error type for rsilab.
#[derive(Debug, thiserror::Error)]
pub enum RsiLabError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid strategy mode '{mode}' (expected mean_reversion, overbought_reversal or trend_follow_rsi)")]
    InvalidStrategy { mode: String },

    #[error("failed to load {path}: {reason}")]
    DataLoad { path: String, reason: String },

    #[error("no data in {path}")]
    NoData { path: String },

    #[error("insufficient data in {path}: have {bars} bars, need {minimum}")]
    InsufficientData {
        path: String,
        bars: usize,
        minimum: usize,
    },

    #[error("failed to write results to {path}: {reason}")]
    ResultWrite { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&RsiLabError> for std::process::ExitCode {
    fn from(err: &RsiLabError) -> Self {
        let code: u8 = match err {
            RsiLabError::Io(_) => 1,
            RsiLabError::ConfigParse { .. } | RsiLabError::ConfigInvalid { .. } => 2,
            RsiLabError::InvalidStrategy { .. } => 4,
            RsiLabError::DataLoad { .. }
            | RsiLabError::NoData { .. }
            | RsiLabError::InsufficientData { .. } => 5,
            RsiLabError::ResultWrite { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
