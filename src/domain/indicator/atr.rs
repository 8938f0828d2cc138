//! ATR (Average True Range).
//!
//! True range per bar (first bar: high - low), smoothed with alpha = 1/period
//! seeded at the first true range. Valid from the first sample.

use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    if period == 0 || bars.is_empty() {
        return vec![f64::NAN; bars.len()];
    }

    let alpha = 1.0 / period as f64;
    let mut out = Vec::with_capacity(bars.len());
    let mut atr = bars[0].true_range(None);
    out.push(atr);

    for i in 1..bars.len() {
        let tr = bars[i].true_range(Some(bars[i - 1].close));
        atr = tr * alpha + atr * (1.0 - alpha);
        out.push(atr);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(day: u32, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: close,
            high,
            low,
            close,
        }
    }

    #[test]
    fn atr_first_bar_is_range() {
        let bars = vec![make_bar(1, 110.0, 90.0, 100.0)];
        let out = calculate_atr(&bars, 14);
        assert!((out[0] - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn atr_smooths_true_range() {
        let bars = vec![
            make_bar(1, 110.0, 90.0, 100.0),
            make_bar(2, 112.0, 102.0, 110.0),
        ];
        let out = calculate_atr(&bars, 2);
        // tr[1] = max(10, |112-100|, |102-100|) = 12; atr = 12*0.5 + 20*0.5 = 16
        assert!((out[1] - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn atr_constant_range_converges() {
        let bars: Vec<OhlcvBar> = (1..=20)
            .map(|d| make_bar(d, 105.0, 95.0, 100.0))
            .collect();
        let out = calculate_atr(&bars, 5);
        assert!((out[19] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn atr_empty_input() {
        assert!(calculate_atr(&[], 14).is_empty());
    }
}
