//! RSI (Relative Strength Index).
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n rows are NaN.

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut values = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() <= period {
        return values;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |c: f64| if c > 0.0 { c } else { 0.0 };
    let loss = |c: f64| if c < 0.0 { -c } else { 0.0 };

    let mut avg_gain = changes[..period].iter().map(|&c| gain(c)).sum::<f64>() / period as f64;
    let mut avg_loss = changes[..period].iter().map(|&c| loss(c)).sum::<f64>() / period as f64;
    values[period] = rsi_from(avg_gain, avg_loss);

    for i in period..changes.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gain(changes[i])) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss(changes[i])) / period as f64;
        values[i + 1] = rsi_from(avg_gain, avg_loss);
    }

    values
}

fn rsi_from(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let rsi = calculate_rsi(&closes, 14);

        assert_eq!(rsi.len(), 15);
        for (i, v) in rsi.iter().take(14).enumerate() {
            assert!(v.is_nan(), "row {} should be warmup", i);
        }
        assert!(!rsi[14].is_nan());
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert!((rsi[14] - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert!(rsi[14].abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_in_range() {
        let closes: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        for v in calculate_rsi(&closes, 14).into_iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(&v), "RSI {} out of range", v);
        }
    }

    #[test]
    fn rsi_zero_period_is_all_warmup() {
        let rsi = calculate_rsi(&[100.0, 101.0], 0);
        assert!(rsi.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_known_calculation() {
        let closes = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        let rsi = calculate_rsi(&closes, 14);
        assert!(rsi[14] > 50.0 && rsi[14] < 100.0);
    }
}
