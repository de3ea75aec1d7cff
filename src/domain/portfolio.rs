//! Portfolio state, trading calendar and equity tracking.
//!
//! The portfolio owns cash, the open-order registry and the calendar of
//! tradable days. Every fill happens at the ticker's close on the current
//! day, and net worth is re-marked after each fill and calendar advance.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use super::dataset::{Dataset, CLOSE};
use super::error::ScoretraderError;
use super::order::{ClosedTrade, ExitType, Order, ScaleOutFill};

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub ticker: String,
    pub shares: i64,
    pub entry_price: f64,
    pub market_price: f64,
    pub market_value: f64,
}

/// Point-in-time snapshot returned by `get_holdings`.
#[derive(Debug, Clone, PartialEq)]
pub struct Holdings {
    pub day: NaiveDate,
    pub cash: f64,
    pub net_worth: f64,
    pub positions: Vec<Holding>,
}

/// Result of an entry request.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Opened { shares: i64, price: f64, cost: f64 },
    InsufficientCapital,
}

#[derive(Debug, Clone)]
pub struct Portfolio {
    initial_capital: f64,
    cash: f64,
    net_worth: f64,
    calendar: Vec<NaiveDate>,
    cursor: usize,
    closes: HashMap<String, Vec<f64>>,
    open_orders: BTreeMap<String, Order>,
    closed_trades: Vec<ClosedTrade>,
    equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    /// Start trading on the first dataset day at or after `start_day`.
    pub fn new(
        initial_capital: f64,
        start_day: NaiveDate,
        dataset: &Dataset,
    ) -> Result<Self, ScoretraderError> {
        let calendar = dataset.dates().to_vec();
        let cursor = calendar.partition_point(|d| *d < start_day);
        if cursor == calendar.len() {
            return Err(ScoretraderError::EmptyWindow {
                start: start_day,
                end: calendar.last().copied().unwrap_or(start_day),
            });
        }

        let closes = dataset
            .columns()
            .filter(|(key, _)| key.field == CLOSE)
            .map(|(key, values)| (key.ticker.clone(), values.to_vec()))
            .collect();

        let mut portfolio = Portfolio {
            initial_capital,
            cash: initial_capital,
            net_worth: initial_capital,
            calendar,
            cursor,
            closes,
            open_orders: BTreeMap::new(),
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
        };
        portfolio.record_equity();
        Ok(portfolio)
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn current_cash(&self) -> f64 {
        self.cash
    }

    pub fn net_worth(&self) -> f64 {
        self.net_worth
    }

    /// First tradable day.
    pub fn start_day(&self) -> NaiveDate {
        self.equity_curve
            .first()
            .map(|p| p.date)
            .unwrap_or(self.calendar[self.cursor])
    }

    pub fn current_day(&self) -> NaiveDate {
        self.calendar[self.cursor]
    }

    /// Advance to the next tradable day and re-mark open orders.
    ///
    /// Stays on the last day once the calendar is exhausted.
    pub fn next_day(&mut self) -> NaiveDate {
        if self.cursor + 1 < self.calendar.len() {
            self.cursor += 1;
            self.revalue();
            self.record_equity();
        }
        self.current_day()
    }

    /// Close of `ticker` on the current day.
    pub fn price(&self, ticker: &str) -> Result<f64, ScoretraderError> {
        self.closes
            .get(ticker)
            .map(|series| series[self.cursor])
            .filter(|p| !p.is_nan())
            .ok_or_else(|| ScoretraderError::MissingPrice {
                ticker: ticker.to_string(),
                field: CLOSE.to_string(),
                date: self.current_day(),
            })
    }

    pub fn get_holdings(&self) -> Holdings {
        let positions = self
            .open_orders
            .values()
            .map(|order| Holding {
                ticker: order.ticker.clone(),
                shares: order.shares,
                entry_price: order.entry_price,
                market_price: order.last_price,
                market_value: order.market_value(order.last_price),
            })
            .collect();
        Holdings {
            day: self.current_day(),
            cash: self.cash,
            net_worth: self.net_worth,
            positions,
        }
    }

    /// Open a new order for `ticker` with `position` cash allocated.
    pub fn add_open_order(
        &mut self,
        ticker: &str,
        position: f64,
    ) -> Result<EntryResult, ScoretraderError> {
        if self.open_orders.contains_key(ticker) {
            return Err(ScoretraderError::DuplicateOrder {
                ticker: ticker.to_string(),
            });
        }
        let price = self.price(ticker)?;
        let Some(order) = Order::open(ticker, position.min(self.cash), price, self.current_day())
        else {
            return Ok(EntryResult::InsufficientCapital);
        };

        let result = EntryResult::Opened {
            shares: order.shares,
            price,
            cost: order.cost,
        };
        self.cash -= order.cost;
        self.open_orders.insert(ticker.to_string(), order);
        self.revalue();
        Ok(result)
    }

    pub fn has_open_order(&self, ticker: &str) -> bool {
        self.open_orders.contains_key(ticker)
    }

    pub fn open_order(&self, ticker: &str) -> Option<&Order> {
        self.open_orders.get(ticker)
    }

    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.open_orders.values()
    }

    pub fn open_order_count(&self) -> usize {
        self.open_orders.len()
    }

    /// Handle to the open order for `ticker`.
    pub fn get_open_order(&mut self, ticker: &str) -> Result<OrderHandle<'_>, ScoretraderError> {
        if !self.open_orders.contains_key(ticker) {
            return Err(ScoretraderError::NoOpenOrder {
                ticker: ticker.to_string(),
            });
        }
        Ok(OrderHandle {
            portfolio: self,
            ticker: ticker.to_string(),
        })
    }

    /// Remove an order from the registry.
    pub fn close_order(&mut self, ticker: &str) -> Option<Order> {
        let order = self.open_orders.remove(ticker);
        self.revalue();
        order
    }

    /// Liquidate and remove every open order.
    pub fn sell_all_stocks(&mut self) -> Result<Vec<ClosedTrade>, ScoretraderError> {
        let tickers: Vec<String> = self.open_orders.keys().cloned().collect();
        let mut trades = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            trades.push(self.get_open_order(&ticker)?.sell_stock(ExitType::EndOfSimulation)?);
            self.close_order(&ticker);
        }
        Ok(trades)
    }

    pub fn closed_trades(&self) -> &[ClosedTrade] {
        &self.closed_trades
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// Mark open orders to today's close; missing closes keep the last mark.
    fn revalue(&mut self) {
        let cursor = self.cursor;
        let mut value = 0.0;
        for order in self.open_orders.values_mut() {
            if let Some(p) = self.closes.get(&order.ticker).map(|s| s[cursor]) {
                if !p.is_nan() {
                    order.last_price = p;
                }
            }
            value += order.market_value(order.last_price);
        }
        self.net_worth = self.cash + value;
    }

    fn record_equity(&mut self) {
        let date = self.current_day();
        self.equity_curve.push(EquityPoint {
            date,
            equity: self.net_worth,
        });
    }
}

/// Mutable access to one open order, settling fills against portfolio cash.
pub struct OrderHandle<'a> {
    portfolio: &'a mut Portfolio,
    ticker: String,
}

impl OrderHandle<'_> {
    pub fn order(&self) -> &Order {
        &self.portfolio.open_orders[&self.ticker]
    }

    /// Sell the whole position. The order stays registered until `close_order`.
    ///
    /// The terminal sweep falls back to the last mark when today's close is missing.
    pub fn sell_stock(self, exit_type: ExitType) -> Result<ClosedTrade, ScoretraderError> {
        let quote = self.portfolio.price(&self.ticker);
        let day = self.portfolio.current_day();
        let order = self
            .portfolio
            .open_orders
            .get_mut(&self.ticker)
            .ok_or_else(|| ScoretraderError::NoOpenOrder {
                ticker: self.ticker.clone(),
            })?;
        let price = match quote {
            Ok(p) => p,
            Err(_) if exit_type == ExitType::EndOfSimulation => order.last_price,
            Err(e) => return Err(e),
        };

        let proceeds = order.market_value(price);
        let trade = order.sell_all(price, day, exit_type);
        self.portfolio.cash += proceeds;
        self.portfolio.closed_trades.push(trade.clone());
        self.portfolio.revalue();
        Ok(trade)
    }

    /// Sell part of the position; `None` when nothing could be sold.
    pub fn scale_out_stock(self) -> Result<Option<ScaleOutFill>, ScoretraderError> {
        let price = self.portfolio.price(&self.ticker)?;
        let order = self
            .portfolio
            .open_orders
            .get_mut(&self.ticker)
            .ok_or_else(|| ScoretraderError::NoOpenOrder {
                ticker: self.ticker.clone(),
            })?;

        let fill = order.scale_out(price);
        if let Some(ref f) = fill {
            self.portfolio.cash += f.proceeds;
        }
        self.portfolio.revalue();
        Ok(fill)
    }
}
