//! Open orders and their fills.
//!
//! An `Order` is one open long position in one ticker. It is sized once at
//! entry, reduced by scale-outs, and closed exactly once.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitType {
    /// Confirmation score turned against the position.
    Confirmation,
    StopLoss,
    /// Terminal sweep at the end of the simulation.
    EndOfSimulation,
}

impl fmt::Display for ExitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitType::Confirmation => "confirmation",
            ExitType::StopLoss => "stop_loss",
            ExitType::EndOfSimulation => "end_of_simulation",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub ticker: String,
    /// Cash allocated at entry.
    pub position: f64,
    pub shares: i64,
    pub entry_price: f64,
    pub entry_day: NaiveDate,
    /// Cost of the shares bought at entry.
    pub cost: f64,
    /// Proceeds of scale-outs so far.
    pub realized: f64,
    pub scale_outs: u32,
    /// Last close the order was marked at.
    pub last_price: f64,
}

/// Partial exit fill.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleOutFill {
    pub shares: i64,
    pub price: f64,
    pub proceeds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub ticker: String,
    /// Shares sold by the final exit.
    pub shares: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_day: NaiveDate,
    pub exit_day: NaiveDate,
    pub exit_type: ExitType,
    pub scale_outs: u32,
    /// Final proceeds plus scale-out proceeds minus entry cost.
    pub pnl: f64,
}

impl Order {
    /// Buy whole shares worth at most `position` at `price`.
    ///
    /// Returns `None` when not even one share fits.
    pub fn open(ticker: &str, position: f64, price: f64, day: NaiveDate) -> Option<Order> {
        if price.is_nan() || price <= 0.0 || position.is_nan() || position <= 0.0 {
            return None;
        }
        let shares = (position / price).floor() as i64;
        if shares == 0 {
            return None;
        }
        Some(Order {
            ticker: ticker.to_string(),
            position,
            shares,
            entry_price: price,
            entry_day: day,
            cost: shares as f64 * price,
            realized: 0.0,
            scale_outs: 0,
            last_price: price,
        })
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    pub fn unrealized_return(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price
    }

    /// Sell half of the held shares. Single-share positions are left alone.
    pub fn scale_out(&mut self, price: f64) -> Option<ScaleOutFill> {
        let sold = self.shares / 2;
        if sold == 0 {
            return None;
        }
        let proceeds = sold as f64 * price;
        self.shares -= sold;
        self.realized += proceeds;
        self.scale_outs += 1;
        self.last_price = price;
        Some(ScaleOutFill {
            shares: sold,
            price,
            proceeds,
        })
    }

    /// Sell every remaining share.
    pub fn sell_all(&mut self, price: f64, day: NaiveDate, exit_type: ExitType) -> ClosedTrade {
        let shares = self.shares;
        let proceeds = shares as f64 * price;
        self.shares = 0;
        self.last_price = price;
        ClosedTrade {
            ticker: self.ticker.clone(),
            shares,
            entry_price: self.entry_price,
            exit_price: price,
            entry_day: self.entry_day,
            exit_day: day,
            exit_type,
            scale_outs: self.scale_outs,
            pnl: self.realized + proceeds - self.cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn open_buys_whole_shares() {
        let order = Order::open("AAPL", 5000.0, 30.0, day(2)).unwrap();
        assert_eq!(order.shares, 166);
        assert_relative_eq!(order.cost, 4980.0);
        assert_relative_eq!(order.position, 5000.0);
    }

    #[test]
    fn open_too_small_position() {
        assert!(Order::open("AAPL", 20.0, 30.0, day(2)).is_none());
        assert!(Order::open("AAPL", 100.0, 0.0, day(2)).is_none());
        assert!(Order::open("AAPL", 100.0, f64::NAN, day(2)).is_none());
    }

    #[test]
    fn scale_out_sells_half() {
        let mut order = Order::open("AAPL", 1000.0, 10.0, day(2)).unwrap();
        let fill = order.scale_out(12.0).unwrap();
        assert_eq!(fill.shares, 50);
        assert_relative_eq!(fill.proceeds, 600.0);
        assert_eq!(order.shares, 50);
        assert_eq!(order.scale_outs, 1);
    }

    #[test]
    fn scale_out_single_share_is_noop() {
        let mut order = Order::open("AAPL", 15.0, 10.0, day(2)).unwrap();
        assert!(order.scale_out(12.0).is_none());
        assert_eq!(order.shares, 1);
    }

    #[test]
    fn sell_all_includes_scale_out_proceeds() {
        let mut order = Order::open("AAPL", 1000.0, 10.0, day(2)).unwrap();
        order.scale_out(12.0);
        let trade = order.sell_all(9.0, day(5), ExitType::StopLoss);

        assert_eq!(trade.shares, 50);
        // 600 + 450 - 1000
        assert_relative_eq!(trade.pnl, 50.0);
        assert_eq!(trade.exit_type, ExitType::StopLoss);
        assert_eq!(trade.scale_outs, 1);
        assert_eq!(order.shares, 0);
    }

    #[test]
    fn exit_type_names() {
        assert_eq!(ExitType::StopLoss.to_string(), "stop_loss");
        assert_eq!(ExitType::EndOfSimulation.to_string(), "end_of_simulation");
    }
}
