//! Core domain types and the signal-to-trade engine.

pub mod ohlcv;
pub mod indicator;
pub mod strategy;
pub mod position;
pub mod signal;
pub mod metrics;
pub mod regime;
pub mod backtest;
pub mod config_validation;
pub mod record;
pub mod sweep;
pub mod error;
