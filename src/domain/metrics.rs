//! Performance metrics over a finished simulation.

use super::order::{ClosedTrade, ExitType};
use super::portfolio::EquityPoint;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// Longest run of equity points below the running peak.
    pub max_drawdown_duration: usize,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub scale_outs: u32,
    /// Closed trades per exit type, in first-seen order.
    pub exits: Vec<(ExitType, usize)>,
}

impl Metrics {
    pub fn compute(
        initial_capital: f64,
        equity_curve: &[EquityPoint],
        trades: &[ClosedTrade],
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            (final_equity - initial_capital) / initial_capital
        } else {
            0.0
        };

        let years = equity_curve.len() as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);
        let sharpe_ratio = compute_sharpe(equity_curve);

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut scale_outs = 0u32;
        let mut exits: Vec<(ExitType, usize)> = Vec::new();

        for trade in trades {
            if trade.pnl > 0.0 {
                trades_won += 1;
                total_wins += trade.pnl;
                largest_win = largest_win.max(trade.pnl);
            } else if trade.pnl < 0.0 {
                trades_lost += 1;
                total_losses += trade.pnl.abs();
                largest_loss = largest_loss.max(trade.pnl.abs());
            }
            scale_outs += trade.scale_outs;
            match exits.iter_mut().find(|(t, _)| *t == trade.exit_type) {
                Some((_, n)) => *n += 1,
                None => exits.push((trade.exit_type, 1)),
            }
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        Metrics {
            total_return,
            annualized_return,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            total_trades,
            trades_won,
            trades_lost,
            win_rate,
            profit_factor,
            largest_win,
            largest_loss,
            scale_outs,
            exits,
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut run = 0usize;
    let mut max_run = 0usize;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            run = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
            run += 1;
            max_run = max_run.max(run);
        }
    }

    (max_dd, max_run)
}

/// Annualized Sharpe ratio of daily equity returns, zero risk-free rate.
fn compute_sharpe(equity_curve: &[EquityPoint]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            if w[0].equity > 0.0 {
                (w[1].equity - w[0].equity) / w[0].equity
            } else {
                0.0
            }
        })
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                equity: v,
            })
            .collect()
    }

    fn trade(ticker: &str, pnl: f64, exit_type: ExitType) -> ClosedTrade {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ClosedTrade {
            ticker: ticker.to_string(),
            shares: 10,
            entry_price: 100.0,
            exit_price: 100.0 + pnl / 10.0,
            entry_day: day,
            exit_day: day + chrono::Duration::days(3),
            exit_type,
            scale_outs: 0,
            pnl,
        }
    }

    #[test]
    fn empty_run() {
        let m = Metrics::compute(10_000.0, &[], &[]);
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.profit_factor, 0.0);
        assert!(m.exits.is_empty());
    }

    #[test]
    fn total_return_from_last_point() {
        let m = Metrics::compute(100_000.0, &curve(&[100_000.0, 90_000.0]), &[]);
        assert_relative_eq!(m.total_return, -0.10);
    }

    #[test]
    fn flat_year_has_zero_annualized_return() {
        let m = Metrics::compute(100.0, &curve(&[100.0; 252]), &[]);
        assert_relative_eq!(m.annualized_return, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
    }

    #[test]
    fn trade_stats_and_exit_breakdown() {
        let trades = vec![
            trade("A", 100.0, ExitType::Confirmation),
            trade("B", -50.0, ExitType::StopLoss),
            trade("C", 200.0, ExitType::Confirmation),
            trade("D", 0.0, ExitType::EndOfSimulation),
        ];
        let m = Metrics::compute(10_000.0, &curve(&[10_000.0, 10_250.0]), &trades);

        assert_eq!(m.total_trades, 4);
        assert_eq!(m.trades_won, 2);
        assert_eq!(m.trades_lost, 1);
        assert_relative_eq!(m.win_rate, 0.5);
        assert_relative_eq!(m.profit_factor, 6.0);
        assert_relative_eq!(m.largest_win, 200.0);
        assert_relative_eq!(m.largest_loss, 50.0);
        assert_eq!(
            m.exits,
            vec![
                (ExitType::Confirmation, 2),
                (ExitType::StopLoss, 1),
                (ExitType::EndOfSimulation, 1)
            ]
        );
    }

    #[test]
    fn only_winners_have_infinite_profit_factor() {
        let m = Metrics::compute(10_000.0, &[], &[trade("A", 5.0, ExitType::Confirmation)]);
        assert!(m.profit_factor.is_infinite());
    }

    #[test]
    fn drawdown_depth_and_duration() {
        let equity = [100.0, 110.0, 100.0, 90.0, 85.0, 95.0, 120.0];
        let (dd, duration) = compute_drawdown(&curve(&equity));
        assert_relative_eq!(dd, 25.0 / 110.0);
        assert_eq!(duration, 4);
    }

    #[test]
    fn rising_curve_has_positive_sharpe() {
        let values: Vec<f64> = (0..50)
            .map(|i| 100.0 * (1.0 + 0.001 * i as f64 + 0.0005 * (i % 3) as f64))
            .collect();
        assert!(compute_sharpe(&curve(&values)) > 0.0);
    }
}
