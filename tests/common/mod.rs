#![allow(dead_code)]

use chrono::NaiveDate;
use scoretrader::domain::config::SimulationConfig;
use scoretrader::domain::dataset::{ColumnKey, Dataset, CLOSE, HIGH, LOW, OPEN};
use scoretrader::domain::error::ScoretraderError;
use scoretrader::domain::indicator::{IndicatorParam, IndicatorSpec};
use scoretrader::domain::scoring::{ExitIndicator, ScoredIndicator};
use scoretrader::domain::strategy::{MarketView, OrderIntent, Strategy, StrategyParams};
use scoretrader::ports::data_port::DataPort;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

/// One ticker's rows: close plus the three entry indicator columns.
#[derive(Debug, Clone)]
pub struct Series {
    pub closes: Vec<f64>,
    pub adx: f64,
    pub obv: f64,
    pub rsi14: f64,
}

impl Series {
    /// Bullish on every entry indicator of [`sample_config`].
    pub fn bullish(closes: Vec<f64>) -> Self {
        Series {
            closes,
            adx: 30.0,
            obv: 1.0,
            rsi14: 25.0,
        }
    }

    /// Bearish on every entry indicator of [`sample_config`].
    pub fn bearish(closes: Vec<f64>) -> Self {
        Series {
            closes,
            adx: 10.0,
            obv: -1.0,
            rsi14: 70.0,
        }
    }
}

pub struct MockDataPort {
    pub start: NaiveDate,
    pub data: HashMap<String, Series>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            start,
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, ticker: &str, series: Series) -> Self {
        self.data.insert(ticker.to_string(), series);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_dataset(&self, tickers: &[String]) -> Result<Dataset, ScoretraderError> {
        let mut columns = Vec::new();
        let mut len = None;
        for ticker in tickers {
            if let Some(reason) = self.errors.get(ticker) {
                return Err(ScoretraderError::Data {
                    reason: reason.clone(),
                });
            }
            let series = self.data.get(ticker).ok_or_else(|| ScoretraderError::Data {
                reason: format!("no data for {ticker}"),
            })?;
            let n = series.closes.len();
            len.get_or_insert(n);
            columns.extend(series_columns(ticker, series));
        }
        let Some(n) = len.filter(|&n| n > 0) else {
            return Err(ScoretraderError::EmptyDataset);
        };
        Dataset::from_columns(daily_dates(self.start, n), columns)
    }
}

/// Records every view it is shown and replays fixed intents per day.
pub struct ScriptedStrategy {
    pub script: HashMap<NaiveDate, Vec<OrderIntent>>,
    pub seen: std::rc::Rc<std::cell::RefCell<Vec<NaiveDate>>>,
}

impl ScriptedStrategy {
    pub fn new(script: Vec<(NaiveDate, Vec<OrderIntent>)>) -> Self {
        Self {
            script: script.into_iter().collect(),
            seen: Default::default(),
        }
    }
}

impl Strategy for ScriptedStrategy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn simulate_day(&mut self, view: &MarketView<'_>) -> Result<Vec<OrderIntent>, ScoretraderError> {
        self.seen.borrow_mut().push(view.day);
        Ok(self.script.remove(&view.day).unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn daily_dates(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

/// Closes `base, base + step, ...` for `n` rows.
pub fn linear(base: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| base + step * i as f64).collect()
}

fn series_columns(ticker: &str, series: &Series) -> Vec<(ColumnKey, Vec<f64>)> {
    let n = series.closes.len();
    let mut columns: Vec<(ColumnKey, Vec<f64>)> = [OPEN, HIGH, LOW, CLOSE]
        .into_iter()
        .map(|field| (ColumnKey::new(ticker, field), series.closes.clone()))
        .collect();
    columns.push((ColumnKey::new(ticker, "adx"), vec![series.adx; n]));
    columns.push((ColumnKey::new(ticker, "obv"), vec![series.obv; n]));
    columns.push((ColumnKey::new(ticker, "rsi14"), vec![series.rsi14; n]));
    columns
}

/// Daily dataset starting at `start` with one [`Series`] per ticker.
pub fn make_dataset(start: NaiveDate, series: &[(&str, Series)]) -> Dataset {
    let n = series[0].1.closes.len();
    let columns = series
        .iter()
        .flat_map(|(ticker, s)| series_columns(ticker, s))
        .collect::<Vec<_>>();
    Dataset::from_columns(daily_dates(start, n), columns).unwrap()
}

pub fn sample_config(tickers: &[&str], start: &str, end: &str) -> SimulationConfig {
    SimulationConfig {
        initial_capital: 10_000.0,
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        strategy: "score_threshold".to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
        data_dir: None,
        entry_indicators: vec![
            ScoredIndicator::new("adx", 0.5, 20.0),
            ScoredIndicator::new("obv", 0.3, 0.0),
            ScoredIndicator::new("rsi14", 0.2, 30.0),
        ],
        exit_indicators: vec![
            ExitIndicator::new(IndicatorSpec::new("roc", vec![IndicatorParam(12.0)]), 0.4),
            ExitIndicator::new(IndicatorSpec::new("ema", vec![IndicatorParam(10.0)]), 0.3),
            ExitIndicator::new(
                IndicatorSpec::new("bb", vec![IndicatorParam(20.0), IndicatorParam(2.0)]),
                0.3,
            ),
        ],
        strategy_params: StrategyParams::default(),
    }
}

pub fn buy(ticker: &str) -> OrderIntent {
    OrderIntent::Buy {
        ticker: ticker.to_string(),
    }
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Write `<dir>/<TICKER>.csv` in the layout the CSV adapter reads.
pub fn write_ticker_csv(dir: &Path, ticker: &str, start: NaiveDate, series: &Series) {
    let mut out = String::from("date,open,high,low,close,adx,obv,rsi14\n");
    for (day, close) in daily_dates(start, series.closes.len())
        .into_iter()
        .zip(&series.closes)
    {
        out.push_str(&format!(
            "{},{c},{c},{c},{c},{},{},{}\n",
            day.format("%Y-%m-%d"),
            series.adx,
            series.obv,
            series.rsi14,
            c = close
        ));
    }
    std::fs::write(dir.join(format!("{ticker}.csv")), out).unwrap();
}

/// INI text for a run over `tickers` reading CSVs from `data_dir`.
pub fn simulation_ini(tickers: &str, start: &str, end: &str, data_dir: &Path) -> String {
    format!(
        r#"
[simulation]
initial_capital = 10000
tickers = {tickers}
strategy = score_threshold
start_date = {start}
end_date = {end}
data_dir = {}

[strategy_params]
volume_ind_1 = adx
weight_vol_1 = 0.5
buy_limit_vol_1 = 20
volume_ind_2 = obv
weight_vol_2 = 0.3
buy_limit_vol_2 = 0
volume_ind_3 = rsi14
weight_vol_3 = 0.2
buy_limit_vol_3 = 30
exit_ind_1 = roc
exit_ind_1_param = 12
exit_ind_2 = ema
exit_ind_2_param = 10
exit_ind_3 = bb
exit_ind_3_param = 20
exit_ind_3_param_2 = 2
weight_exit_1 = 0.4
weight_exit_2 = 0.3
weight_exit_3 = 0.3
"#,
        data_dir.display()
    )
}
