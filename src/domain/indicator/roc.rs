//! ROC (Rate of Change).
//!
//! ROC(n)[i] = ((C[i] - C[i-n]) / C[i-n]) * 100
//! If C[i-n] == 0: ROC = 0
//! Warmup: first n rows are NaN.

pub fn calculate_roc(closes: &[f64], period: usize) -> Vec<f64> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &curr)| {
            if period == 0 || i < period {
                return f64::NAN;
            }
            let prev = closes[i - period];
            if prev == 0.0 {
                0.0
            } else {
                (curr - prev) / prev * 100.0
            }
        })
        .collect()
}
