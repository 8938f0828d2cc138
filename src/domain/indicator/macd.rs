//! MACD (Moving Average Convergence Divergence).
//!
//! Line = EMA(fast) - EMA(slow); signal = EMA(signal) of the line;
//! histogram = line - signal. EMAs are seeded with their first input, so
//! every sample is valid.

use crate::domain::indicator::ema::calculate_ema;

pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdSeries {
    if closes.is_empty() || fast == 0 || slow == 0 || signal_span == 0 {
        return MacdSeries {
            line: Vec::new(),
            signal: Vec::new(),
            histogram: Vec::new(),
        };
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = calculate_ema(&line, signal_span);
    let histogram: Vec<f64> = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_first_sample_is_zero() {
        // both EMAs seed with the first close, so the line starts at 0
        let m = calculate_macd(&[100.0, 101.0, 102.0], 12, 26, 9);
        assert!(m.line[0].abs() < f64::EPSILON);
        assert!(m.signal[0].abs() < f64::EPSILON);
        assert!(m.histogram[0].abs() < f64::EPSILON);
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let m = calculate_macd(&closes, 12, 26, 9);
        assert!(m.line[59] > 0.0);
        assert!(m.histogram[59] > 0.0);
    }

    #[test]
    fn macd_negative_in_downtrend() {
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        let m = calculate_macd(&closes, 12, 26, 9);
        assert!(m.line[59] < 0.0);
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let m = calculate_macd(&closes, 12, 26, 9);
        for i in 0..closes.len() {
            assert!((m.histogram[i] - (m.line[i] - m.signal[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_empty_input() {
        let m = calculate_macd(&[], 12, 26, 9);
        assert!(m.line.is_empty());
        assert!(m.signal.is_empty());
        assert!(m.histogram.is_empty());
    }
}
