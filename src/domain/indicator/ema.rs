//! Exponential moving average.
//!
//! k = 2/(span+1), seeded with the first value, then ema[i] = v[i]*k + ema[i-1]*(1-k).
//! Valid from the first sample.

pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.is_empty() {
        return Vec::new();
    }

    let k = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = values[0];
    out.push(ema);

    for &v in &values[1..] {
        ema = v * k + ema * (1.0 - k);
        out.push(ema);
    }

    out
}
