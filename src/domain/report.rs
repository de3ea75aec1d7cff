//! Result of a completed simulation run.

use chrono::NaiveDate;
use std::fmt;

use super::metrics::Metrics;
use super::order::ClosedTrade;
use super::portfolio::EquityPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub strategy: String,
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub final_net_worth: f64,
    pub closed_trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: Metrics,
}

impl SimulationReport {
    pub fn new(
        strategy: &str,
        tickers: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
        initial_capital: f64,
        closed_trades: Vec<ClosedTrade>,
        equity_curve: Vec<EquityPoint>,
    ) -> Self {
        let metrics = Metrics::compute(initial_capital, &equity_curve, &closed_trades);
        let final_net_worth = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);
        SimulationReport {
            strategy: strategy.to_string(),
            tickers: tickers.to_vec(),
            start_date,
            end_date,
            initial_capital,
            final_net_worth,
            closed_trades,
            equity_curve,
            metrics,
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;
        writeln!(f, "=== Simulation Results ===")?;
        writeln!(f, "Strategy:          {}", self.strategy)?;
        writeln!(f, "Tickers:           {}", self.tickers.join(", "))?;
        writeln!(f, "Period:            {} to {}", self.start_date, self.end_date)?;
        writeln!(f, "Initial Capital:   {:.2}", self.initial_capital)?;
        writeln!(f, "Final Net Worth:   {:.2}", self.final_net_worth)?;
        writeln!(f, "Total Return:      {:.2}%", m.total_return * 100.0)?;
        writeln!(f, "Annualized Return: {:.2}%", m.annualized_return * 100.0)?;
        writeln!(f, "Sharpe Ratio:      {:.3}", m.sharpe_ratio)?;
        writeln!(f, "Max Drawdown:      {:.2}%", m.max_drawdown * 100.0)?;
        writeln!(f, "Total Trades:      {}", m.total_trades)?;
        writeln!(f, "Win Rate:          {:.1}%", m.win_rate * 100.0)?;
        writeln!(f, "Profit Factor:     {:.2}", m.profit_factor)?;
        writeln!(f, "Scale-outs:        {}", m.scale_outs)?;
        for (exit_type, count) in &m.exits {
            writeln!(f, "  {:<16} {}", exit_type.to_string(), count)?;
        }
        Ok(())
    }
}
