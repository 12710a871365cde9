//! Strategy configuration.
//!
//! Each variant carries exactly the thresholds its rules read. No defaults are
//! injected here; the CLI and sweep config supply them.

use crate::domain::error::RsiLabError;
use std::fmt;

/// RSI midline used by the trend-following rules.
pub const RSI_MIDLINE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyConfig {
    /// Long when RSI drops below `lower`, flat when it rises above `exit_level`.
    MeanReversion { lower: f64, exit_level: f64 },
    /// Short when RSI rises above `upper`, flat when it falls below `exit_level`.
    OverboughtReversal { upper: f64, exit_level: f64 },
    /// Enter on RSI crossing the midline, exit on the return cross.
    TrendFollowRsi,
}

impl StrategyConfig {
    pub const MODES: [&'static str; 3] =
        ["mean_reversion", "overbought_reversal", "trend_follow_rsi"];

    /// Build a strategy from its mode string. Thresholds not read by the mode
    /// are ignored.
    pub fn from_mode(
        mode: &str,
        lower: f64,
        upper: f64,
        exit_level: f64,
    ) -> Result<Self, RsiLabError> {
        match mode.trim().to_lowercase().as_str() {
            "mean_reversion" => Ok(StrategyConfig::MeanReversion { lower, exit_level }),
            "overbought_reversal" => Ok(StrategyConfig::OverboughtReversal { upper, exit_level }),
            "trend_follow_rsi" => Ok(StrategyConfig::TrendFollowRsi),
            _ => Err(RsiLabError::InvalidStrategy {
                mode: mode.to_string(),
            }),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            StrategyConfig::MeanReversion { .. } => "mean_reversion",
            StrategyConfig::OverboughtReversal { .. } => "overbought_reversal",
            StrategyConfig::TrendFollowRsi => "trend_follow_rsi",
        }
    }

    /// Human-readable name, as written to result logs.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::MeanReversion { .. } => "Mean Reversion",
            StrategyConfig::OverboughtReversal { .. } => "Overbought Reversal",
            StrategyConfig::TrendFollowRsi => "Trend-follow RSI",
        }
    }

    pub fn lower(&self) -> Option<f64> {
        match self {
            StrategyConfig::MeanReversion { lower, .. } => Some(*lower),
            _ => None,
        }
    }

    pub fn upper(&self) -> Option<f64> {
        match self {
            StrategyConfig::OverboughtReversal { upper, .. } => Some(*upper),
            _ => None,
        }
    }

    pub fn exit_level(&self) -> Option<f64> {
        match self {
            StrategyConfig::MeanReversion { exit_level, .. }
            | StrategyConfig::OverboughtReversal { exit_level, .. } => Some(*exit_level),
            StrategyConfig::TrendFollowRsi => None,
        }
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyConfig::MeanReversion { lower, exit_level } => {
                write!(f, "{}(lower={}, exit={})", self.mode(), lower, exit_level)
            }
            StrategyConfig::OverboughtReversal { upper, exit_level } => {
                write!(f, "{}(upper={}, exit={})", self.mode(), upper, exit_level)
            }
            StrategyConfig::TrendFollowRsi => write!(f, "{}", self.mode()),
        }
    }
}
