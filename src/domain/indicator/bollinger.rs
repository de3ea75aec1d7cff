//! Bollinger Bands.
//!
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//! Warmup: first (period-1) rows are NaN in every band.

use super::sma::calculate_sma;
use super::stddev::calculate_stddev;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, mult: f64) -> BollingerBands {
    let middle = calculate_sma(closes, period);
    let stddev = calculate_stddev(closes, period);

    let upper = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m + mult * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m - mult * s)
        .collect();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// Distance of the close from the middle band in units of the band half-width.
///
/// Positive above the middle band, negative below; `0` when the bands collapse.
pub fn bollinger_position(closes: &[f64], period: usize, mult: f64) -> Vec<f64> {
    let bands = calculate_bollinger(closes, period, mult);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let (upper, middle) = (bands.upper[i], bands.middle[i]);
            if middle.is_nan() {
                f64::NAN
            } else if upper == middle {
                0.0
            } else {
                (close - middle) / (upper - middle)
            }
        })
        .collect()
}
