//! Date-indexed columnar dataset keyed by `(ticker, field)`.
//!
//! Price data, indicator columns and score tables all share this shape, so
//! the same truncation and lookup logic applies to each of them.

use crate::domain::error::ScoretraderError;
use crate::domain::window::ResolvedWindow;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";

/// Price fields carried into the confirmation table.
pub const PRICE_FIELDS: [&str; 4] = [CLOSE, OPEN, HIGH, LOW];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey {
    pub ticker: String,
    pub field: String,
}

impl ColumnKey {
    pub fn new(ticker: impl Into<String>, field: impl Into<String>) -> Self {
        ColumnKey {
            ticker: ticker.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.ticker, self.field)
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    dates: Vec<NaiveDate>,
    date_index: HashMap<NaiveDate, usize>,
    columns: BTreeMap<ColumnKey, Vec<f64>>,
}

impl Dataset {
    /// Create an empty table over `dates`, which must be strictly increasing.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, ScoretraderError> {
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ScoretraderError::Data {
                reason: format!(
                    "dates must be strictly increasing: {} followed by {}",
                    pair[0], pair[1]
                ),
            });
        }
        let date_index = dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        Ok(Dataset {
            dates,
            date_index,
            columns: BTreeMap::new(),
        })
    }

    pub fn from_columns<I>(dates: Vec<NaiveDate>, columns: I) -> Result<Self, ScoretraderError>
    where
        I: IntoIterator<Item = (ColumnKey, Vec<f64>)>,
    {
        let mut dataset = Dataset::new(dates)?;
        for (key, values) in columns {
            dataset.insert_column(key, values)?;
        }
        Ok(dataset)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn date_position(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    /// Insert or replace a column. The series must have one value per date.
    pub fn insert_column(&mut self, key: ColumnKey, values: Vec<f64>) -> Result<(), ScoretraderError> {
        if values.len() != self.dates.len() {
            return Err(ScoretraderError::Data {
                reason: format!(
                    "column {} has {} values, expected {}",
                    key,
                    values.len(),
                    self.dates.len()
                ),
            });
        }
        self.columns.insert(key, values);
        Ok(())
    }

    pub fn has_column(&self, ticker: &str, field: &str) -> bool {
        self.column(ticker, field).is_some()
    }

    pub fn column(&self, ticker: &str, field: &str) -> Option<&[f64]> {
        self.columns
            .get(&ColumnKey::new(ticker, field))
            .map(Vec::as_slice)
    }

    pub fn require_column(&self, ticker: &str, field: &str) -> Result<&[f64], ScoretraderError> {
        self.column(ticker, field)
            .ok_or_else(|| ScoretraderError::MissingColumn {
                ticker: ticker.to_string(),
                field: field.to_string(),
            })
    }

    /// Value on `date`, or `None` when the date or column is absent or the cell is NaN.
    pub fn value(&self, ticker: &str, field: &str, date: NaiveDate) -> Option<f64> {
        let idx = self.date_position(date)?;
        let v = self.column(ticker, field)?[idx];
        if v.is_nan() { None } else { Some(v) }
    }

    pub fn columns(&self) -> impl Iterator<Item = (&ColumnKey, &[f64])> {
        self.columns.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn tickers(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.columns.keys().map(|k| k.ticker.as_str()).collect();
        set.into_iter().collect()
    }

    pub fn fields(&self, ticker: &str) -> Vec<&str> {
        self.columns
            .keys()
            .filter(|k| k.ticker == ticker)
            .map(|k| k.field.as_str())
            .collect()
    }

    /// Check that every ticker carries the same field set.
    pub fn validate_uniform_fields(&self) -> Result<(), ScoretraderError> {
        let tickers = self.tickers();
        let Some((first, rest)) = tickers.split_first() else {
            return Ok(());
        };
        let expected = self.fields(first);
        for ticker in rest {
            let fields = self.fields(ticker);
            if fields != expected {
                return Err(ScoretraderError::Data {
                    reason: format!(
                        "ticker {} has fields [{}], expected [{}] as for {}",
                        ticker,
                        fields.join(", "),
                        expected.join(", "),
                        first
                    ),
                });
            }
        }
        Ok(())
    }

    /// Copy of the given `(ticker, field)` columns over the full date index.
    pub fn select(&self, tickers: &[String], fields: &[&str]) -> Result<Dataset, ScoretraderError> {
        let mut out = Dataset {
            dates: self.dates.clone(),
            date_index: self.date_index.clone(),
            columns: BTreeMap::new(),
        };
        for ticker in tickers {
            for field in fields {
                let values = self.require_column(ticker, field)?;
                out.columns
                    .insert(ColumnKey::new(ticker.as_str(), *field), values.to_vec());
            }
        }
        Ok(out)
    }

    /// Rows with `start_date <= date <= end_date`, all columns kept.
    pub fn truncate(&self, window: &ResolvedWindow) -> Dataset {
        let lo = self.dates.partition_point(|d| *d < window.start_date);
        let hi = self.dates.partition_point(|d| *d <= window.end_date);
        let hi = hi.max(lo);

        let dates: Vec<NaiveDate> = self.dates[lo..hi].to_vec();
        let date_index = dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        let columns = self
            .columns
            .iter()
            .map(|(k, v)| (k.clone(), v[lo..hi].to_vec()))
            .collect();

        Dataset {
            dates,
            date_index,
            columns,
        }
    }
}
