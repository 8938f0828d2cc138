//! Bollinger bands.
//!
//! Middle: rolling mean over n periods. Upper/lower: middle ± multiplier ×
//! rolling sample standard deviation (divides by N-1).
//! Warmup: first (period-1) samples are NaN.

pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub mid: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, mult: f64) -> BollingerSeries {
    let n = closes.len();
    let mut upper = vec![f64::NAN; n];
    let mut mid = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];

    if period < 2 || n < period {
        return BollingerSeries { upper, mid, lower };
    }

    for i in (period - 1)..n {
        let window = &closes[i + 1 - period..=i];
        let mean: f64 = window.iter().sum::<f64>() / period as f64;
        let variance: f64 = window
            .iter()
            .map(|c| {
                let diff = c - mean;
                diff * diff
            })
            .sum::<f64>()
            / (period - 1) as f64;
        let stddev = variance.sqrt();

        mid[i] = mean;
        upper[i] = mean + mult * stddev;
        lower[i] = mean - mult * stddev;
    }

    BollingerSeries { upper, mid, lower }
}
