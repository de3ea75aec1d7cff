//! Simple Moving Average.
//!
//! Warmup: first (n-1) rows are NaN. A window holding a NaN is NaN.

pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    let mut values = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() < period {
        return values;
    }

    for (i, window) in closes.windows(period).enumerate() {
        values[i + period - 1] = window.iter().sum::<f64>() / period as f64;
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sma_basic() {
        let sma = calculate_sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert!(sma[1].is_nan());
        assert_relative_eq!(sma[2], 2.0);
        assert_relative_eq!(sma[3], 3.0);
        assert_relative_eq!(sma[4], 4.0);
    }

    #[test]
    fn sma_zero_period() {
        assert!(calculate_sma(&[1.0], 0)[0].is_nan());
    }
}
