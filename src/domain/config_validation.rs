//! Configuration validation.
//!
//! Checks every `[simulation]` and `[strategy_params]` value before a run
//! starts, so bad input fails with the offending key named.

use crate::domain::config::{
    direction_override, invalid, parse_tickers, required_f64, required_string, EXIT_PARAM_KEYS,
    INDICATOR_SLOTS, SIMULATION, STRATEGY_PARAMS,
};
use crate::domain::error::ScoretraderError;
use crate::domain::window;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

/// Exit parameters that are multipliers rather than periods.
const FRACTIONAL_PARAM_KEYS: &[&str] = &["exit_ind_3_param_2"];

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), ScoretraderError> {
    validate_initial_capital(config)?;
    validate_tickers(config)?;
    validate_strategy(config)?;
    validate_dates(config)?;
    validate_entry_indicators(config)?;
    validate_exit_indicators(config)?;
    validate_knobs(config)?;
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), ScoretraderError> {
    let value = required_f64(config, SIMULATION, "initial_capital")?;
    if value <= 0.0 {
        return Err(invalid(
            SIMULATION,
            "initial_capital",
            "initial_capital must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), ScoretraderError> {
    parse_tickers(&required_string(config, SIMULATION, "tickers")?)?;
    Ok(())
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), ScoretraderError> {
    required_string(config, SIMULATION, "strategy")?;
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), ScoretraderError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    if start_date >= end_date {
        return Err(ScoretraderError::InvalidRange {
            start: start_date,
            end: end_date,
        });
    }
    Ok(())
}

fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<NaiveDate, ScoretraderError> {
    window::parse_date(&required_string(config, SIMULATION, field)?, field)
}

fn validate_weight(config: &dyn ConfigPort, key: &str) -> Result<(), ScoretraderError> {
    if required_f64(config, STRATEGY_PARAMS, key)? < 0.0 {
        return Err(invalid(
            STRATEGY_PARAMS,
            key,
            format!("{} must be non-negative", key),
        ));
    }
    Ok(())
}

fn validate_entry_indicators(config: &dyn ConfigPort) -> Result<(), ScoretraderError> {
    for slot in 1..=INDICATOR_SLOTS {
        let key = format!("volume_ind_{slot}");
        required_string(config, STRATEGY_PARAMS, &key)?;
        direction_override(config, &key)?;
        validate_weight(config, &format!("weight_vol_{slot}"))?;
        required_f64(config, STRATEGY_PARAMS, &format!("buy_limit_vol_{slot}"))?;
    }
    Ok(())
}

fn validate_exit_indicators(config: &dyn ConfigPort) -> Result<(), ScoretraderError> {
    for (i, param_keys) in EXIT_PARAM_KEYS.iter().enumerate() {
        let slot = i + 1;
        let key = format!("exit_ind_{slot}");
        required_string(config, STRATEGY_PARAMS, &key)?;
        direction_override(config, &key)?;
        for param in param_keys.iter() {
            let value = required_f64(config, STRATEGY_PARAMS, param)?;
            if value <= 0.0 {
                return Err(invalid(
                    STRATEGY_PARAMS,
                    param,
                    format!("{} must be positive", param),
                ));
            }
            if !FRACTIONAL_PARAM_KEYS.contains(param) && value.fract() != 0.0 {
                return Err(invalid(
                    STRATEGY_PARAMS,
                    param,
                    format!("{} must be a whole number of rows, got {}", param, value),
                ));
            }
        }
        validate_weight(config, &format!("weight_exit_{slot}"))?;
    }
    Ok(())
}

fn validate_knobs(config: &dyn ConfigPort) -> Result<(), ScoretraderError> {
    for key in ["entry_score_threshold", "exit_score_threshold"] {
        if config.has_key(STRATEGY_PARAMS, key) {
            required_f64(config, STRATEGY_PARAMS, key)?;
        }
    }
    for key in ["scale_out_gain_pct", "stop_loss_pct"] {
        if config.has_key(STRATEGY_PARAMS, key) {
            validate_weight(config, key)?;
        }
    }
    Ok(())
}
