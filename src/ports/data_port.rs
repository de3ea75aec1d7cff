//! Data access port trait.

use crate::domain::dataset::Dataset;
use crate::domain::error::ScoretraderError;

pub trait DataPort {
    /// Load the full date-indexed dataset for `tickers`.
    fn load_dataset(&self, tickers: &[String]) -> Result<Dataset, ScoretraderError>;
}
