//! Built-in confirmation indicator provider.
//!
//! Every ratio is computed from the ticker's Close series and shifted so that
//! its sign carries the signal, which lets the confirmation table score all
//! of them against zero:
//!
//! | id    | value                                   |
//! |-------|-----------------------------------------|
//! | `roc` | percent change over `n` rows            |
//! | `ema` | `close / EMA(n) - 1`                    |
//! | `sma` | `close / SMA(n) - 1`                    |
//! | `rsi` | `RSI(n) - 50`                           |
//! | `bb`  | close position within `k` std-dev bands |

use crate::domain::dataset::{ColumnKey, Dataset, CLOSE};
use crate::domain::error::ScoretraderError;
use crate::domain::indicator::bollinger::bollinger_position;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::roc::calculate_roc;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorKind, IndicatorSpec};
use crate::ports::indicator_port::IndicatorPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalIndicators;

impl TechnicalIndicators {
    pub fn new() -> Self {
        TechnicalIndicators
    }

    fn period(spec: &IndicatorSpec, index: usize) -> Result<usize, ScoretraderError> {
        spec.params[index]
            .as_period()
            .ok_or_else(|| ScoretraderError::Data {
                reason: format!(
                    "{}: parameter {} must be a positive whole number",
                    spec, spec.params[index]
                ),
            })
    }

    fn compute(
        kind: IndicatorKind,
        spec: &IndicatorSpec,
        closes: &[f64],
    ) -> Result<Vec<f64>, ScoretraderError> {
        let period = Self::period(spec, 0)?;
        let values = match kind {
            IndicatorKind::Roc => calculate_roc(closes, period),
            IndicatorKind::Ema => relative_to(closes, &calculate_ema(closes, period)),
            IndicatorKind::Sma => relative_to(closes, &calculate_sma(closes, period)),
            IndicatorKind::Rsi => calculate_rsi(closes, period)
                .into_iter()
                .map(|v| v - 50.0)
                .collect(),
            IndicatorKind::Bollinger => bollinger_position(closes, period, spec.params[1].0),
        };
        Ok(values)
    }
}

/// `close / baseline - 1`, NaN where the baseline is missing or zero.
fn relative_to(closes: &[f64], baseline: &[f64]) -> Vec<f64> {
    closes
        .iter()
        .zip(baseline)
        .map(|(&c, &b)| if b == 0.0 { f64::NAN } else { c / b - 1.0 })
        .collect()
}

impl IndicatorPort for TechnicalIndicators {
    fn compute_ratio(
        &self,
        table: &mut Dataset,
        tickers: &[String],
        spec: &IndicatorSpec,
    ) -> Result<(), ScoretraderError> {
        let kind = IndicatorKind::from_id(&spec.id)
            .ok_or_else(|| ScoretraderError::UnknownIndicator(spec.id.clone()))?;
        if spec.params.len() != kind.arity() {
            return Err(ScoretraderError::Data {
                reason: format!(
                    "{} takes {} parameter(s), got {}",
                    spec.id,
                    kind.arity(),
                    spec.params.len()
                ),
            });
        }

        let column = spec.column_name();
        for ticker in tickers {
            let values = Self::compute(kind, spec, table.require_column(ticker, CLOSE)?)?;
            table.insert_column(ColumnKey::new(ticker.as_str(), column.as_str()), values)?;
        }
        tracing::debug!(indicator = %spec, %column, "computed confirmation ratio");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn table(closes: Vec<f64>) -> Dataset {
        let dates = (0..closes.len())
            .map(|i| {
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
            })
            .collect();
        Dataset::from_columns(dates, vec![(ColumnKey::new("AAPL", CLOSE), closes)]).unwrap()
    }

    fn tickers() -> Vec<String> {
        vec!["AAPL".to_string()]
    }

    #[test]
    fn roc_column_is_percent_change() {
        let mut t = table(vec![100.0, 105.0, 110.0]);
        let spec = IndicatorSpec::new("roc", vec![2i64.into()]);
        TechnicalIndicators::new()
            .compute_ratio(&mut t, &tickers(), &spec)
            .unwrap();

        let roc = t.column("AAPL", "roc2").unwrap();
        assert!(roc[1].is_nan());
        assert_relative_eq!(roc[2], 10.0);
    }

    #[test]
    fn sma_ratio_sign_follows_trend() {
        let mut t = table(vec![10.0, 10.0, 10.0, 13.0]);
        let spec = IndicatorSpec::new("sma", vec![3i64.into()]);
        TechnicalIndicators::new()
            .compute_ratio(&mut t, &tickers(), &spec)
            .unwrap();

        let sma = t.column("AAPL", "sma3").unwrap();
        assert_relative_eq!(sma[2], 0.0);
        assert!(sma[3] > 0.0);
    }

    #[test]
    fn ema_ratio_recovers_after_missing_close() {
        let mut closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        closes[5] = f64::NAN;
        let mut t = table(closes);
        let spec = IndicatorSpec::new("ema", vec![10i64.into()]);
        TechnicalIndicators::new()
            .compute_ratio(&mut t, &tickers(), &spec)
            .unwrap();

        let ema = t.column("AAPL", "ema10").unwrap();
        assert!(ema[5].is_nan());
        assert_eq!(ema[10..].iter().filter(|v| v.is_nan()).count(), 0);
        assert!(ema[59] > 0.0);
    }

    #[test]
    fn rsi_is_centered_on_fifty() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let mut t = table(closes);
        let spec = IndicatorSpec::new("rsi", vec![14i64.into()]);
        TechnicalIndicators::new()
            .compute_ratio(&mut t, &tickers(), &spec)
            .unwrap();

        let rsi = t.column("AAPL", "rsi14").unwrap();
        assert!(rsi[13].is_nan());
        assert_relative_eq!(rsi[19], 50.0);
    }

    #[test]
    fn bollinger_uses_two_params() {
        let mut t = table(vec![10.0, 20.0, 30.0, 5.0]);
        let spec = IndicatorSpec::new("bb", vec![3i64.into(), 2i64.into()]);
        TechnicalIndicators::new()
            .compute_ratio(&mut t, &tickers(), &spec)
            .unwrap();

        let bb = t.column("AAPL", "bb3_2").unwrap();
        assert!(bb[2] > 0.0);
        assert!(bb[3] < 0.0);
    }

    #[test]
    fn unknown_indicator_fails() {
        let mut t = table(vec![1.0, 2.0]);
        let spec = IndicatorSpec::new("adx", vec![14i64.into()]);
        let err = TechnicalIndicators::new()
            .compute_ratio(&mut t, &tickers(), &spec)
            .unwrap_err();
        assert!(matches!(err, ScoretraderError::UnknownIndicator(ref id) if id == "adx"));
    }

    #[test]
    fn wrong_arity_fails() {
        let mut t = table(vec![1.0, 2.0]);
        let spec = IndicatorSpec::new("bb", vec![20i64.into()]);
        assert!(TechnicalIndicators::new()
            .compute_ratio(&mut t, &tickers(), &spec)
            .is_err());
    }

    #[test]
    fn fractional_period_fails() {
        let mut t = table(vec![1.0, 2.0]);
        let spec = IndicatorSpec::new("ema", vec![2.5.into()]);
        let err = TechnicalIndicators::new()
            .compute_ratio(&mut t, &tickers(), &spec)
            .unwrap_err();
        assert!(matches!(err, ScoretraderError::Data { .. }));
    }
}
