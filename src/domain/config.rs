//! Typed simulation configuration built from a [`ConfigPort`].
//!
//! `[simulation]` carries the run parameters and `[strategy_params]` the
//! three entry indicators, three confirmation indicators and the strategy
//! knobs.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::domain::error::ScoretraderError;
use crate::domain::indicator::{IndicatorParam, IndicatorSpec};
use crate::domain::scoring::{Direction, ExitIndicator, ScoredIndicator};
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;

pub const SIMULATION: &str = "simulation";
pub const STRATEGY_PARAMS: &str = "strategy_params";

/// Number of indicators on each side of the score tables.
pub const INDICATOR_SLOTS: usize = 3;

/// Parameter keys of the confirmation indicators, per slot.
pub const EXIT_PARAM_KEYS: [&[&str]; INDICATOR_SLOTS] = [
    &["exit_ind_1_param"],
    &["exit_ind_2_param"],
    &["exit_ind_3_param", "exit_ind_3_param_2"],
];

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    pub tickers: Vec<String>,
    pub strategy: String,
    /// Requested window bounds, `YYYY-MM-DD`; reconciled against the data later.
    pub start_date: String,
    pub end_date: String,
    pub data_dir: Option<PathBuf>,
    pub entry_indicators: Vec<ScoredIndicator>,
    pub exit_indicators: Vec<ExitIndicator>,
    pub strategy_params: StrategyParams,
}

impl SimulationConfig {
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, ScoretraderError> {
        let initial_capital = required_f64(config, SIMULATION, "initial_capital")?;
        let tickers = parse_tickers(&required_string(config, SIMULATION, "tickers")?)?;
        let strategy = required_string(config, SIMULATION, "strategy")?;
        let start_date = required_string(config, SIMULATION, "start_date")?;
        let end_date = required_string(config, SIMULATION, "end_date")?;
        let data_dir = config
            .get_string(SIMULATION, "data_dir")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let mut entry_indicators = Vec::with_capacity(INDICATOR_SLOTS);
        for slot in 1..=INDICATOR_SLOTS {
            let key = format!("volume_ind_{slot}");
            let column = required_string(config, STRATEGY_PARAMS, &key)?;
            let weight = required_f64(config, STRATEGY_PARAMS, &format!("weight_vol_{slot}"))?;
            let limit = required_f64(config, STRATEGY_PARAMS, &format!("buy_limit_vol_{slot}"))?;
            let mut indicator = ScoredIndicator::new(column, weight, limit);
            if let Some(direction) = direction_override(config, &key)? {
                indicator.direction = direction;
            }
            entry_indicators.push(indicator);
        }

        let mut exit_indicators = Vec::with_capacity(INDICATOR_SLOTS);
        for (i, param_keys) in EXIT_PARAM_KEYS.iter().enumerate() {
            let slot = i + 1;
            let key = format!("exit_ind_{slot}");
            let id = required_string(config, STRATEGY_PARAMS, &key)?;
            let params = param_keys
                .iter()
                .map(|k| required_f64(config, STRATEGY_PARAMS, k).map(IndicatorParam))
                .collect::<Result<Vec<_>, _>>()?;
            let weight = required_f64(config, STRATEGY_PARAMS, &format!("weight_exit_{slot}"))?;
            let mut indicator = ExitIndicator::new(IndicatorSpec::new(id, params), weight);
            if let Some(direction) = direction_override(config, &key)? {
                indicator.direction = direction;
            }
            exit_indicators.push(indicator);
        }

        let defaults = StrategyParams::default();
        let strategy_params = StrategyParams {
            entry_score_threshold: optional_f64(
                config,
                "entry_score_threshold",
                defaults.entry_score_threshold,
            )?,
            exit_score_threshold: optional_f64(
                config,
                "exit_score_threshold",
                defaults.exit_score_threshold,
            )?,
            scale_out_gain_pct: optional_f64(
                config,
                "scale_out_gain_pct",
                defaults.scale_out_gain_pct,
            )?,
            stop_loss_pct: optional_f64(config, "stop_loss_pct", defaults.stop_loss_pct)?,
        };

        Ok(SimulationConfig {
            initial_capital,
            tickers,
            strategy,
            start_date,
            end_date,
            data_dir,
            entry_indicators,
            exit_indicators,
            strategy_params,
        })
    }
}

/// Split a comma list into upper-cased tickers.
///
/// Empty tokens and duplicates are rejected.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, ScoretraderError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(invalid(SIMULATION, "tickers", "empty ticker in list".to_string()));
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(invalid(
                SIMULATION,
                "tickers",
                format!("duplicate ticker {ticker}"),
            ));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

pub(crate) fn required_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, ScoretraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ScoretraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

pub(crate) fn required_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<f64, ScoretraderError> {
    let raw = required_string(config, section, key)?;
    parse_f64(section, key, &raw)
}

fn optional_f64(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, ScoretraderError> {
    match config.get_string(STRATEGY_PARAMS, key) {
        Some(raw) if !raw.trim().is_empty() => parse_f64(STRATEGY_PARAMS, key, raw.trim()),
        _ => Ok(default),
    }
}

fn parse_f64(section: &str, key: &str, raw: &str) -> Result<f64, ScoretraderError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(section, key, format!("{raw:?} is not a number"))),
    }
}

/// `<indicator key>_direction` overrides the direction implied by the name.
pub(crate) fn direction_override(
    config: &dyn ConfigPort,
    indicator_key: &str,
) -> Result<Option<Direction>, ScoretraderError> {
    let key = format!("{indicator_key}_direction");
    match config.get_string(STRATEGY_PARAMS, &key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse::<Direction>()
            .map(Some)
            .map_err(|reason| invalid(STRATEGY_PARAMS, &key, reason)),
        _ => Ok(None),
    }
}

pub(crate) fn invalid(section: &str, key: &str, reason: String) -> ScoretraderError {
    ScoretraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
