//! Simulation engine.
//!
//! A `Trader` resolves the requested window against the dataset, builds the
//! entry and confirmation score tables, and then walks the trading calendar
//! one day at a time, handing each day to its strategy and applying the
//! returned intents to the portfolio.

use chrono::NaiveDate;
use std::fmt;

use super::config::SimulationConfig;
use super::dataset::{Dataset, CLOSE};
use super::error::ScoretraderError;
use super::order::ClosedTrade;
use super::portfolio::{EntryResult, Holdings, Portfolio};
use super::report::SimulationReport;
use super::scoring::{confirmation_score_table, entry_score_table};
use super::strategy::{build_strategy, MarketView, OrderIntent, Strategy};
use super::window::reconcile;
use crate::ports::indicator_port::IndicatorPort;

/// Mutable part of a running simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationState {
    pub current_day: NaiveDate,
}

pub struct Trader {
    config: SimulationConfig,
    start_date: NaiveDate,
    end_date: NaiveDate,
    dataset: Dataset,
    entry_scores: Dataset,
    exit_scores: Dataset,
    portfolio: Portfolio,
    strategy: Box<dyn Strategy>,
    state: SimulationState,
}

impl Trader {
    /// Build a trader running the strategy named in `config`.
    pub fn new(
        dataset: &Dataset,
        config: SimulationConfig,
        indicators: &dyn IndicatorPort,
    ) -> Result<Self, ScoretraderError> {
        let strategy = build_strategy(&config.strategy, &config.strategy_params)?;
        Self::with_strategy(dataset, config, indicators, strategy)
    }

    /// Build a trader around an already constructed strategy.
    pub fn with_strategy(
        dataset: &Dataset,
        config: SimulationConfig,
        indicators: &dyn IndicatorPort,
        strategy: Box<dyn Strategy>,
    ) -> Result<Self, ScoretraderError> {
        let window = reconcile(dataset.dates(), &config.start_date, &config.end_date)?;
        for ticker in &config.tickers {
            dataset.require_column(ticker, CLOSE)?;
        }

        // Indicators see the whole history so warmup rows fall before the window.
        let entry_scores = entry_score_table(dataset, &config.tickers, &config.entry_indicators)?
            .truncate(&window);
        let exit_scores = confirmation_score_table(
            dataset,
            &config.tickers,
            &config.exit_indicators,
            indicators,
        )?
        .truncate(&window);
        let prices = dataset.truncate(&window);

        let Some(end_date) = prices.last_date() else {
            return Err(ScoretraderError::EmptyWindow {
                start: window.start_date,
                end: window.end_date,
            });
        };
        for (name, table) in [("entry", &entry_scores), ("exit", &exit_scores)] {
            let other = table.last_date();
            if other != Some(end_date) {
                return Err(ScoretraderError::WindowMismatch {
                    table: name.to_string(),
                    prices: end_date,
                    other: other.unwrap_or(window.start_date),
                });
            }
        }

        let portfolio = Portfolio::new(config.initial_capital, window.start_date, &prices)?;
        let start_date = portfolio.start_day();

        tracing::info!(
            strategy = strategy.name(),
            tickers = %config.tickers.join(","),
            %start_date,
            %end_date,
            days = prices.len(),
            "simulation ready"
        );

        Ok(Trader {
            config,
            start_date,
            end_date,
            dataset: prices,
            entry_scores,
            exit_scores,
            portfolio,
            strategy,
            state: SimulationState {
                current_day: start_date,
            },
        })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn tickers(&self) -> &[String] {
        &self.config.tickers
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn current_day(&self) -> NaiveDate {
        self.state.current_day
    }

    /// Price data restricted to the simulation window.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn entry_scores(&self) -> &Dataset {
        &self.entry_scores
    }

    pub fn exit_scores(&self) -> &Dataset {
        &self.exit_scores
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn get_holdings(&self) -> Holdings {
        self.portfolio.get_holdings()
    }

    /// Ask the strategy for today's intents and apply them in order.
    pub fn simulate_day(&mut self) -> Result<Vec<OrderIntent>, ScoretraderError> {
        let day = self.state.current_day;
        let view = MarketView {
            day,
            tickers: &self.config.tickers,
            prices: &self.dataset,
            entry_scores: &self.entry_scores,
            exit_scores: &self.exit_scores,
            portfolio: &self.portfolio,
        };
        let intents = self.strategy.simulate_day(&view)?;

        for intent in &intents {
            self.apply(intent)?;
        }
        Ok(intents)
    }

    fn apply(&mut self, intent: &OrderIntent) -> Result<(), ScoretraderError> {
        let day = self.state.current_day;
        match intent {
            OrderIntent::Buy { ticker } => {
                let share = self.portfolio.net_worth() / self.config.tickers.len() as f64;
                let position = self.portfolio.current_cash().min(share);
                match self.portfolio.add_open_order(ticker, position)? {
                    EntryResult::Opened {
                        shares,
                        price,
                        cost,
                    } => {
                        tracing::debug!(%day, %ticker, shares, price, cost, "buy");
                    }
                    EntryResult::InsufficientCapital => {
                        tracing::warn!(%day, %ticker, position, "buy skipped, insufficient capital");
                    }
                }
            }
            OrderIntent::Sell { ticker, exit_type } => {
                let trade = self.portfolio.get_open_order(ticker)?.sell_stock(*exit_type)?;
                self.portfolio.close_order(ticker);
                tracing::debug!(
                    %day,
                    %ticker,
                    exit = %exit_type,
                    shares = trade.shares,
                    pnl = trade.pnl,
                    "sell"
                );
            }
            OrderIntent::ScaleOut { ticker } => {
                match self.portfolio.get_open_order(ticker)?.scale_out_stock()? {
                    Some(fill) => {
                        tracing::debug!(
                            %day,
                            %ticker,
                            shares = fill.shares,
                            price = fill.price,
                            "scale out"
                        );
                    }
                    None => tracing::debug!(%day, %ticker, "scale out skipped, single share"),
                }
            }
        }
        Ok(())
    }

    /// Advance to the next trading day.
    pub fn next_day(&mut self) -> NaiveDate {
        self.state.current_day = self.portfolio.next_day();
        self.state.current_day
    }

    /// Run every day from the start date up to the end date, then liquidate.
    pub fn run_simulation(&mut self) -> Result<SimulationReport, ScoretraderError> {
        while self.state.current_day < self.end_date {
            self.simulate_day()?;
            self.next_day();
        }
        let liquidated: Vec<ClosedTrade> = self.portfolio.sell_all_stocks()?;

        let report = SimulationReport::new(
            self.strategy.name(),
            &self.config.tickers,
            self.start_date,
            self.end_date,
            self.portfolio.initial_capital(),
            self.portfolio.closed_trades().to_vec(),
            self.portfolio.equity_curve().to_vec(),
        );

        tracing::info!(
            trades = report.closed_trades.len(),
            liquidated = liquidated.len(),
            final_net_worth = report.final_net_worth,
            "simulation complete"
        );
        Ok(report)
    }
}

impl fmt::Display for Trader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy:        {}", self.strategy.name())?;
        writeln!(f, "Tickers:         {}", self.config.tickers.join(", "))?;
        writeln!(f, "Window:          {} to {}", self.start_date, self.end_date)?;
        writeln!(f, "Trading days:    {}", self.dataset.len())?;
        writeln!(f, "Initial capital: {:.2}", self.config.initial_capital)?;
        writeln!(f, "Entry indicators:")?;
        for ind in &self.config.entry_indicators {
            writeln!(
                f,
                "  {} {} {} (weight {})",
                ind.column, ind.direction, ind.threshold, ind.weight
            )?;
        }
        writeln!(f, "Exit indicators:")?;
        for ind in &self.config.exit_indicators {
            writeln!(
                f,
                "  {} {} 0 (weight {})",
                ind.spec.column_name(),
                ind.direction,
                ind.weight
            )?;
        }
        Ok(())
    }
}
