//! Configuration validation.
//!
//! Validates the `[sweep]` and `[regime]` sections, and single-run backtest
//! parameters, before any file is read.
//! Threshold ordering (lower < exit_level < upper) is deliberately not checked.

use crate::domain::error::RsiLabError;
use crate::ports::config_port::ConfigPort;

pub fn validate_sweep_config(config: &dyn ConfigPort) -> Result<(), RsiLabError> {
    validate_rsi_periods(config)?;
    validate_thresholds(config, "lower_thresholds")?;
    validate_thresholds(config, "upper_thresholds")?;
    validate_exit_level(config)?;
    validate_timeframes(config)?;
    validate_min_bars(config)?;
    Ok(())
}

pub fn validate_regime_config(config: &dyn ConfigPort) -> Result<(), RsiLabError> {
    validate_at_least(config, "window", 50, 2)?;
    validate_at_least(config, "min_points", 3, 2)?;
    validate_non_negative(config, "trend_threshold")?;
    validate_non_negative(config, "vol_threshold")?;
    Ok(())
}

/// Single-file run parameters: a positive RSI period and levels in [0, 100].
pub fn validate_backtest_params(
    period: usize,
    lower: f64,
    upper: f64,
    exit_level: f64,
) -> Result<(), RsiLabError> {
    if period == 0 {
        return Err(RsiLabError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "period".to_string(),
            reason: "period must be positive".to_string(),
        });
    }
    for (key, value) in [("lower", lower), ("upper", upper), ("exit_level", exit_level)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(RsiLabError::ConfigInvalid {
                section: "backtest".to_string(),
                key: key.to_string(),
                reason: format!("{} must be between 0 and 100, got {}", key, value),
            });
        }
    }
    Ok(())
}

/// Parse a comma-separated list of positive integers, or `default` when the
/// key is absent.
pub fn parse_usize_list(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: &[usize],
) -> Result<Vec<usize>, RsiLabError> {
    match config.get_list(section, key) {
        None => Ok(default.to_vec()),
        Some(items) => items
            .iter()
            .map(|s| {
                s.parse::<usize>().map_err(|_| RsiLabError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: format!("'{}' is not a non-negative integer", s),
                })
            })
            .collect(),
    }
}

/// Parse a comma-separated list of numbers, or `default` when the key is absent.
pub fn parse_f64_list(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: &[f64],
) -> Result<Vec<f64>, RsiLabError> {
    match config.get_list(section, key) {
        None => Ok(default.to_vec()),
        Some(items) => items
            .iter()
            .map(|s| {
                s.parse::<f64>().map_err(|_| RsiLabError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: format!("'{}' is not a number", s),
                })
            })
            .collect(),
    }
}

fn validate_rsi_periods(config: &dyn ConfigPort) -> Result<(), RsiLabError> {
    let periods = parse_usize_list(config, "sweep", "rsi_periods", &[14])?;
    if periods.is_empty() || periods.contains(&0) {
        return Err(RsiLabError::ConfigInvalid {
            section: "sweep".to_string(),
            key: "rsi_periods".to_string(),
            reason: "rsi_periods must list at least one positive period".to_string(),
        });
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort, key: &str) -> Result<(), RsiLabError> {
    let values = parse_f64_list(config, "sweep", key, &[])?;
    if values.iter().any(|v| !(0.0..=100.0).contains(v)) {
        return Err(RsiLabError::ConfigInvalid {
            section: "sweep".to_string(),
            key: key.to_string(),
            reason: format!("{} must be between 0 and 100", key),
        });
    }
    Ok(())
}

fn validate_exit_level(config: &dyn ConfigPort) -> Result<(), RsiLabError> {
    let raw = config.get_string("sweep", "exit_level");
    let value = match raw {
        None => return Ok(()),
        Some(s) => s.trim().parse::<f64>().map_err(|_| RsiLabError::ConfigInvalid {
            section: "sweep".to_string(),
            key: "exit_level".to_string(),
            reason: format!("'{}' is not a number", s),
        })?,
    };
    if !(0.0..=100.0).contains(&value) {
        return Err(RsiLabError::ConfigInvalid {
            section: "sweep".to_string(),
            key: "exit_level".to_string(),
            reason: "exit_level must be between 0 and 100".to_string(),
        });
    }
    Ok(())
}

fn validate_timeframes(config: &dyn ConfigPort) -> Result<(), RsiLabError> {
    match config.get_list("sweep", "timeframes") {
        Some(list) if list.is_empty() => Err(RsiLabError::ConfigInvalid {
            section: "sweep".to_string(),
            key: "timeframes".to_string(),
            reason: "timeframes must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_min_bars(config: &dyn ConfigPort) -> Result<(), RsiLabError> {
    let value = config.get_int("sweep", "min_bars", 20);
    if value < 1 {
        return Err(RsiLabError::ConfigInvalid {
            section: "sweep".to_string(),
            key: "min_bars".to_string(),
            reason: "min_bars must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_at_least(
    config: &dyn ConfigPort,
    key: &str,
    default: i64,
    minimum: i64,
) -> Result<(), RsiLabError> {
    let value = config.get_int("regime", key, default);
    if value < minimum {
        return Err(RsiLabError::ConfigInvalid {
            section: "regime".to_string(),
            key: key.to_string(),
            reason: format!("{} must be at least {}", key, minimum),
        });
    }
    Ok(())
}

fn validate_non_negative(config: &dyn ConfigPort, key: &str) -> Result<(), RsiLabError> {
    let value = config.get_double("regime", key, 0.0);
    if value < 0.0 {
        return Err(RsiLabError::ConfigInvalid {
            section: "regime".to_string(),
            key: key.to_string(),
            reason: format!("{} must be non-negative", key),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_sweep_config_passes() {
        let config = make_config(
            r#"
[sweep]
data_dir = data
results_dir = results
rsi_periods = 7,14,21
lower_thresholds = 30,25,20,15
upper_thresholds = 70,75,80,85
exit_level = 50
timeframes = 1m,5m,15m,1h,4h
min_bars = 20
"#,
        );
        assert!(validate_sweep_config(&config).is_ok());
    }

    #[test]
    fn empty_sweep_section_uses_defaults() {
        let config = make_config("[sweep]\n");
        assert!(validate_sweep_config(&config).is_ok());
        assert!(validate_regime_config(&config).is_ok());
    }

    #[test]
    fn zero_rsi_period_fails() {
        let config = make_config("[sweep]\nrsi_periods = 7,0\n");
        let err = validate_sweep_config(&config).unwrap_err();
        assert!(matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "rsi_periods"));
    }

    #[test]
    fn non_numeric_rsi_period_fails() {
        let config = make_config("[sweep]\nrsi_periods = 7,abc\n");
        let err = validate_sweep_config(&config).unwrap_err();
        assert!(matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "rsi_periods"));
    }

    #[test]
    fn threshold_out_of_range_fails() {
        let config = make_config("[sweep]\nupper_thresholds = 70,120\n");
        let err = validate_sweep_config(&config).unwrap_err();
        assert!(
            matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "upper_thresholds")
        );
    }

    #[test]
    fn inverted_threshold_ordering_is_allowed() {
        let config =
            make_config("[sweep]\nlower_thresholds = 80\nupper_thresholds = 20\nexit_level = 90\n");
        assert!(validate_sweep_config(&config).is_ok());
    }

    #[test]
    fn exit_level_out_of_range_fails() {
        let config = make_config("[sweep]\nexit_level = -1\n");
        let err = validate_sweep_config(&config).unwrap_err();
        assert!(matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "exit_level"));
    }

    #[test]
    fn empty_timeframes_fail() {
        let config = make_config("[sweep]\ntimeframes = ,\n");
        let err = validate_sweep_config(&config).unwrap_err();
        assert!(matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "timeframes"));
    }

    #[test]
    fn min_bars_zero_fails() {
        let config = make_config("[sweep]\nmin_bars = 0\n");
        let err = validate_sweep_config(&config).unwrap_err();
        assert!(matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "min_bars"));
    }

    #[test]
    fn regime_window_too_small_fails() {
        let config = make_config("[regime]\nwindow = 1\n");
        let err = validate_regime_config(&config).unwrap_err();
        assert!(matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn negative_regime_threshold_fails() {
        let config = make_config("[regime]\nvol_threshold = -0.1\n");
        let err = validate_regime_config(&config).unwrap_err();
        assert!(matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "vol_threshold"));
    }

    #[test]
    fn backtest_params_accept_defaults_and_bounds() {
        assert!(validate_backtest_params(14, 30.0, 70.0, 50.0).is_ok());
        assert!(validate_backtest_params(1, 0.0, 100.0, 100.0).is_ok());
    }

    #[test]
    fn backtest_zero_period_fails() {
        let err = validate_backtest_params(0, 30.0, 70.0, 50.0).unwrap_err();
        assert!(matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "period"));
    }

    #[test]
    fn backtest_levels_out_of_range_fail() {
        let err = validate_backtest_params(14, -5.0, 70.0, 50.0).unwrap_err();
        assert!(matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "lower"));

        let err = validate_backtest_params(14, 30.0, 170.0, 50.0).unwrap_err();
        assert!(matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "upper"));

        let err = validate_backtest_params(14, 30.0, 70.0, f64::NAN).unwrap_err();
        assert!(matches!(err, RsiLabError::ConfigInvalid { key, .. } if key == "exit_level"));
    }

    #[test]
    fn parse_lists_with_defaults() {
        let config = make_config("[sweep]\nrsi_periods = 5, 9\nlower_thresholds = 30.5\n");
        assert_eq!(
            parse_usize_list(&config, "sweep", "rsi_periods", &[14]).unwrap(),
            vec![5, 9]
        );
        assert_eq!(
            parse_usize_list(&config, "sweep", "missing", &[14]).unwrap(),
            vec![14]
        );
        assert_eq!(
            parse_f64_list(&config, "sweep", "lower_thresholds", &[]).unwrap(),
            vec![30.5]
        );
    }
}
