//! CSV file data adapter.
//!
//! One file per ticker, `<base>/<TICKER>.csv`, with a `date` column followed
//! by any number of numeric fields. Price headers are matched
//! case-insensitively; every other header is kept as written.

use crate::domain::dataset::{ColumnKey, Dataset, CLOSE, HIGH, LOW, OPEN};
use crate::domain::error::ScoretraderError;
use crate::domain::window::DATE_FORMAT;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Parsed contents of one ticker file, rows sorted by date.
struct TickerFile {
    dates: Vec<NaiveDate>,
    fields: Vec<(String, Vec<f64>)>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn field_name(header: &str) -> String {
        let header = header.trim();
        match header.to_lowercase().as_str() {
            "open" => OPEN.to_string(),
            "high" => HIGH.to_string(),
            "low" => LOW.to_string(),
            "close" => CLOSE.to_string(),
            _ => header.to_string(),
        }
    }

    fn read_ticker(&self, ticker: &str) -> Result<TickerFile, ScoretraderError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| ScoretraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| ScoretraderError::Data {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;

        match headers.get(0) {
            Some(h) if h.trim().eq_ignore_ascii_case("date") => {}
            _ => {
                return Err(ScoretraderError::Data {
                    reason: format!("{}: first column must be date", path.display()),
                })
            }
        }
        let names: Vec<String> = headers.iter().skip(1).map(Self::field_name).collect();

        let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| ScoretraderError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(0).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
                ScoretraderError::Data {
                    reason: format!("{}: invalid date {:?}: {}", ticker, date_str, e),
                }
            })?;

            let mut values = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                let cell = record.get(i + 1).unwrap_or_default().trim();
                let value = if cell.is_empty() {
                    f64::NAN
                } else {
                    cell.parse::<f64>().map_err(|e| ScoretraderError::Data {
                        reason: format!(
                            "{}: invalid {} value {:?} on {}: {}",
                            ticker, name, cell, date, e
                        ),
                    })?
                };
                values.push(value);
            }
            rows.push((date, values));
        }

        rows.sort_by_key(|(date, _)| *date);

        let dates: Vec<NaiveDate> = rows.iter().map(|(d, _)| *d).collect();
        let fields = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, rows.iter().map(|(_, v)| v[i]).collect()))
            .collect();

        Ok(TickerFile { dates, fields })
    }
}

impl DataPort for CsvAdapter {
    fn load_dataset(&self, tickers: &[String]) -> Result<Dataset, ScoretraderError> {
        let Some((first, rest)) = tickers.split_first() else {
            return Err(ScoretraderError::EmptyDataset);
        };

        let file = self.read_ticker(first)?;
        let mut dataset = Dataset::new(file.dates)?;
        insert_fields(&mut dataset, first, file.fields)?;

        for ticker in rest {
            let file = self.read_ticker(ticker)?;
            if dataset.dates() != file.dates.as_slice() {
                return Err(ScoretraderError::Data {
                    reason: format!(
                        "{} dates do not match {} ({} rows vs {})",
                        ticker,
                        first,
                        file.dates.len(),
                        dataset.len()
                    ),
                });
            }
            insert_fields(&mut dataset, ticker, file.fields)?;
        }

        if dataset.is_empty() {
            return Err(ScoretraderError::EmptyDataset);
        }
        dataset.validate_uniform_fields()?;
        Ok(dataset)
    }
}

fn insert_fields(
    dataset: &mut Dataset,
    ticker: &str,
    fields: Vec<(String, Vec<f64>)>,
) -> Result<(), ScoretraderError> {
    for (field, values) in fields {
        dataset.insert_column(ColumnKey::new(ticker, field), values)?;
    }
    tracing::debug!(%ticker, rows = dataset.len(), "loaded ticker");
    Ok(())
}
