//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the SMA of the first n valid closes, then
//! EMA[i] = C[i]*k + EMA[prev]*(1-k).
//! Warmup rows and rows with a NaN close are NaN; a gap does not reset the average.

pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    let mut values = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() < period {
        return values;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;
    let mut seed_sum = 0.0;
    let mut seed_rows = 0;

    for (i, &close) in closes.iter().enumerate() {
        if close.is_nan() {
            continue;
        }
        let next = match ema {
            Some(prev) => close * k + prev * (1.0 - k),
            None => {
                seed_sum += close;
                seed_rows += 1;
                if seed_rows < period {
                    continue;
                }
                seed_sum / period as f64
            }
        };
        ema = Some(next);
        values[i] = next;
    }

    values
}
