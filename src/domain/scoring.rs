//! Weighted binary-indicator score tables.
//!
//! Each indicator value is turned into a 0/1 score against a threshold, and
//! the per-ticker `total_score` column is the weighted sum of those scores.
//! Two tables are built: the entry ("volume") table from indicator columns
//! already present in the dataset, and the confirmation ("exit") table from
//! ratio indicators appended by an [`IndicatorPort`] provider.

use crate::domain::dataset::{ColumnKey, Dataset, PRICE_FIELDS};
use crate::domain::error::ScoretraderError;
use crate::domain::indicator::IndicatorSpec;
use crate::ports::indicator_port::IndicatorPort;
use std::fmt;
use std::str::FromStr;

pub const TOTAL_SCORE: &str = "total_score";

/// Sell-side indicators are pre-normalized so the sign carries the signal.
pub const EXIT_THRESHOLD: f64 = 0.0;

/// Indicator ids whose low readings are bullish unless configured otherwise.
pub const LESSER_IS_BULLISH_DEFAULTS: &[&str] = &["rsi14"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Scores 1 when `value > threshold`.
    GreaterIsBullish,
    /// Scores 1 when `value < threshold`.
    LesserIsBullish,
}

impl Direction {
    pub fn default_for(column: &str) -> Self {
        if LESSER_IS_BULLISH_DEFAULTS.contains(&column) {
            Direction::LesserIsBullish
        } else {
            Direction::GreaterIsBullish
        }
    }

    /// NaN never scores.
    pub fn is_bullish(&self, value: f64, threshold: f64) -> bool {
        match self {
            Direction::GreaterIsBullish => value > threshold,
            Direction::LesserIsBullish => value < threshold,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "greater" | "greater_is_bullish" | ">" => Ok(Direction::GreaterIsBullish),
            "lesser" | "lesser_is_bullish" | "<" => Ok(Direction::LesserIsBullish),
            other => Err(format!("unknown direction {other:?}, expected greater or lesser")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::GreaterIsBullish => write!(f, ">"),
            Direction::LesserIsBullish => write!(f, "<"),
        }
    }
}

/// One weighted indicator column scored against a threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredIndicator {
    pub column: String,
    pub weight: f64,
    pub threshold: f64,
    pub direction: Direction,
}

impl ScoredIndicator {
    /// Indicator with the direction implied by its column name.
    pub fn new(column: impl Into<String>, weight: f64, threshold: f64) -> Self {
        let column = column.into();
        let direction = Direction::default_for(&column);
        ScoredIndicator {
            column,
            weight,
            threshold,
            direction,
        }
    }

    pub fn score_field(&self) -> String {
        score_field(&self.column)
    }
}

/// Confirmation-side indicator: computed by the provider, scored against zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitIndicator {
    pub spec: IndicatorSpec,
    pub weight: f64,
    pub direction: Direction,
}

impl ExitIndicator {
    pub fn new(spec: IndicatorSpec, weight: f64) -> Self {
        let direction = Direction::default_for(&spec.column_name());
        ExitIndicator {
            spec,
            weight,
            direction,
        }
    }

    fn scored(&self) -> ScoredIndicator {
        ScoredIndicator {
            column: self.spec.column_name(),
            weight: self.weight,
            threshold: EXIT_THRESHOLD,
            direction: self.direction,
        }
    }
}

pub fn score_field(column: &str) -> String {
    format!("score_{column}")
}

pub fn score_binary(values: &[f64], threshold: f64, direction: Direction) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if direction.is_bullish(v, threshold) { 1.0 } else { 0.0 })
        .collect()
}

/// Append `score_*` and `total_score` columns for every ticker.
fn add_scores(
    table: &mut Dataset,
    tickers: &[String],
    indicators: &[ScoredIndicator],
) -> Result<(), ScoretraderError> {
    for ticker in tickers {
        let mut total = vec![0.0; table.len()];
        for ind in indicators {
            let values = table.require_column(ticker, &ind.column)?;
            let scores = score_binary(values, ind.threshold, ind.direction);
            for (t, s) in total.iter_mut().zip(&scores) {
                *t += ind.weight * s;
            }
            table.insert_column(ColumnKey::new(ticker.as_str(), ind.score_field()), scores)?;
        }
        table.insert_column(ColumnKey::new(ticker.as_str(), TOTAL_SCORE), total)?;
    }
    Ok(())
}

/// Entry ("volume") table from indicator columns already in `dataset`.
pub fn entry_score_table(
    dataset: &Dataset,
    tickers: &[String],
    indicators: &[ScoredIndicator],
) -> Result<Dataset, ScoretraderError> {
    let fields: Vec<&str> = indicators.iter().map(|i| i.column.as_str()).collect();
    let mut table = dataset.select(tickers, &fields)?;
    add_scores(&mut table, tickers, indicators)?;
    Ok(table)
}

/// Confirmation ("exit") table: price fields plus provider-computed ratios.
///
/// Not truncated here; the caller applies the simulation window.
pub fn confirmation_score_table(
    dataset: &Dataset,
    tickers: &[String],
    indicators: &[ExitIndicator],
    provider: &dyn IndicatorPort,
) -> Result<Dataset, ScoretraderError> {
    let mut table = dataset.select(tickers, &PRICE_FIELDS)?;
    for ind in indicators {
        provider.compute_ratio(&mut table, tickers, &ind.spec)?;
    }
    let scored: Vec<ScoredIndicator> = indicators.iter().map(ExitIndicator::scored).collect();
    add_scores(&mut table, tickers, &scored)?;
    Ok(table)
}
