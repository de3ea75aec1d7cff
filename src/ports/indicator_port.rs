//! Indicator provider port trait.

use crate::domain::dataset::Dataset;
use crate::domain::error::ScoretraderError;
use crate::domain::indicator::IndicatorSpec;

pub trait IndicatorPort {
    /// Append one `(ticker, spec.column_name())` column per ticker to `table`.
    fn compute_ratio(
        &self,
        table: &mut Dataset,
        tickers: &[String],
        spec: &IndicatorSpec,
    ) -> Result<(), ScoretraderError>;
}
