//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for scoretrader.
#[derive(Debug, thiserror::Error)]
pub enum ScoretraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid {field} date {value:?}, expected YYYY-MM-DD")]
    InvalidDate { field: String, value: String },

    #[error("invalid range: start date {start} is not before end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("simulation {bound} date {requested} is outside dataset coverage {first}..{last}")]
    RangeOutsideDataset {
        bound: RangeBound,
        requested: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("no dataset rows between {start} and {end}")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },

    #[error("truncated tables disagree on final date: prices end {prices}, {table} ends {other}")]
    WindowMismatch {
        table: String,
        prices: NaiveDate,
        other: NaiveDate,
    },

    #[error("missing column ({ticker}, {field})")]
    MissingColumn { ticker: String, field: String },

    #[error("no {field} price for {ticker} on {date}")]
    MissingPrice {
        ticker: String,
        field: String,
        date: NaiveDate,
    },

    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("no open order for ticker {ticker}")]
    NoOpenOrder { ticker: String },

    #[error("order already open for ticker {ticker}")]
    DuplicateOrder { ticker: String },

    #[error("data error: {reason}")]
    Data { reason: String },
}

/// Which side of the requested window fell outside the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Start,
    End,
}

impl std::fmt::Display for RangeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeBound::Start => write!(f, "start"),
            RangeBound::End => write!(f, "end"),
        }
    }
}

impl From<&ScoretraderError> for std::process::ExitCode {
    fn from(err: &ScoretraderError) -> Self {
        let code: u8 = match err {
            ScoretraderError::ConfigParse { .. }
            | ScoretraderError::ConfigMissing { .. }
            | ScoretraderError::ConfigInvalid { .. }
            | ScoretraderError::UnknownStrategy(_)
            | ScoretraderError::UnknownIndicator(_) => 2,
            ScoretraderError::Data { .. }
            | ScoretraderError::EmptyDataset
            | ScoretraderError::MissingColumn { .. }
            | ScoretraderError::MissingPrice { .. } => 3,
            ScoretraderError::NoOpenOrder { .. } | ScoretraderError::DuplicateOrder { .. } => 4,
            ScoretraderError::InvalidDate { .. }
            | ScoretraderError::InvalidRange { .. }
            | ScoretraderError::RangeOutsideDataset { .. }
            | ScoretraderError::EmptyWindow { .. }
            | ScoretraderError::WindowMismatch { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
