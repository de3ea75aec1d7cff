//! Strategy trait, order intents, and the built-in score-threshold strategy.

use chrono::NaiveDate;
use std::fmt;

use super::dataset::{Dataset, CLOSE};
use super::error::ScoretraderError;
use super::order::ExitType;
use super::portfolio::Portfolio;
use super::scoring::TOTAL_SCORE;

pub const SCORE_THRESHOLD: &str = "score_threshold";

/// What a strategy asks the engine to do with one ticker today.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderIntent {
    Buy { ticker: String },
    Sell { ticker: String, exit_type: ExitType },
    ScaleOut { ticker: String },
}

impl OrderIntent {
    pub fn ticker(&self) -> &str {
        match self {
            OrderIntent::Buy { ticker }
            | OrderIntent::Sell { ticker, .. }
            | OrderIntent::ScaleOut { ticker } => ticker,
        }
    }
}

impl fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderIntent::Buy { ticker } => write!(f, "buy {}", ticker),
            OrderIntent::Sell { ticker, exit_type } => write!(f, "sell {} ({})", ticker, exit_type),
            OrderIntent::ScaleOut { ticker } => write!(f, "scale_out {}", ticker),
        }
    }
}

/// Read-only view of the simulation handed to a strategy each day.
pub struct MarketView<'a> {
    pub day: NaiveDate,
    pub tickers: &'a [String],
    pub prices: &'a Dataset,
    pub entry_scores: &'a Dataset,
    pub exit_scores: &'a Dataset,
    pub portfolio: &'a Portfolio,
}

impl MarketView<'_> {
    pub fn entry_score(&self, ticker: &str) -> Option<f64> {
        self.entry_scores.value(ticker, TOTAL_SCORE, self.day)
    }

    pub fn exit_score(&self, ticker: &str) -> Option<f64> {
        self.exit_scores.value(ticker, TOTAL_SCORE, self.day)
    }

    /// `None` when the close is missing for the day.
    pub fn close(&self, ticker: &str) -> Option<f64> {
        self.prices
            .value(ticker, CLOSE, self.day)
            .filter(|p| !p.is_nan())
    }
}

pub trait Strategy {
    fn name(&self) -> &str;

    /// Today's intents, applied by the engine in the returned order.
    fn simulate_day(&mut self, view: &MarketView<'_>) -> Result<Vec<OrderIntent>, ScoretraderError>;
}

/// Knobs for the built-in strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    /// Buy when the entry `total_score` reaches this value.
    pub entry_score_threshold: f64,
    /// Sell when the confirmation `total_score` falls below this value.
    pub exit_score_threshold: f64,
    /// Scale out once when the gain reaches this percentage; 0 disables.
    pub scale_out_gain_pct: f64,
    /// Sell when the loss reaches this percentage; 0 disables.
    pub stop_loss_pct: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            entry_score_threshold: 0.5,
            exit_score_threshold: 0.5,
            scale_out_gain_pct: 0.0,
            stop_loss_pct: 0.0,
        }
    }
}

/// Enter on a strong entry score, exit on a weak confirmation score.
#[derive(Debug, Clone)]
pub struct ScoreThreshold {
    name: String,
    params: StrategyParams,
}

impl ScoreThreshold {
    pub fn new(params: StrategyParams) -> Self {
        ScoreThreshold {
            name: SCORE_THRESHOLD.to_string(),
            params,
        }
    }
}

impl Strategy for ScoreThreshold {
    fn name(&self) -> &str {
        &self.name
    }

    fn simulate_day(&mut self, view: &MarketView<'_>) -> Result<Vec<OrderIntent>, ScoretraderError> {
        let p = &self.params;
        let mut intents = Vec::new();

        for ticker in view.tickers {
            let Some(price) = view.close(ticker) else {
                continue;
            };

            match view.portfolio.open_order(ticker) {
                Some(order) => {
                    let gain_pct = order.unrealized_return(price) * 100.0;
                    if p.stop_loss_pct > 0.0 && gain_pct <= -p.stop_loss_pct {
                        intents.push(OrderIntent::Sell {
                            ticker: ticker.clone(),
                            exit_type: ExitType::StopLoss,
                        });
                    } else if view
                        .exit_score(ticker)
                        .is_some_and(|s| s < p.exit_score_threshold)
                    {
                        intents.push(OrderIntent::Sell {
                            ticker: ticker.clone(),
                            exit_type: ExitType::Confirmation,
                        });
                    } else if p.scale_out_gain_pct > 0.0
                        && order.scale_outs == 0
                        && gain_pct >= p.scale_out_gain_pct
                    {
                        intents.push(OrderIntent::ScaleOut {
                            ticker: ticker.clone(),
                        });
                    }
                }
                None => {
                    if view
                        .entry_score(ticker)
                        .is_some_and(|s| s >= p.entry_score_threshold)
                    {
                        intents.push(OrderIntent::Buy {
                            ticker: ticker.clone(),
                        });
                    }
                }
            }
        }

        Ok(intents)
    }
}

/// Construct a strategy by its configured name.
pub fn build_strategy(
    name: &str,
    params: &StrategyParams,
) -> Result<Box<dyn Strategy>, ScoretraderError> {
    match name.trim().to_lowercase().as_str() {
        SCORE_THRESHOLD => Ok(Box::new(ScoreThreshold::new(params.clone()))),
        _ => Err(ScoretraderError::UnknownStrategy(name.to_string())),
    }
}
