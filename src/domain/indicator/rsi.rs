//! RSI (Relative Strength Index).
//!
//! Gains/losses from close-to-close deltas, smoothed with alpha = 1/period
//! seeded at the first delta. RSI = 100 - 100/(1 + avg_gain/avg_loss);
//! avg_loss == 0 ⇒ RSI = 100. The first bar has no delta and is NaN.

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.is_empty() {
        return vec![f64::NAN; closes.len()];
    }

    let mut out = Vec::with_capacity(closes.len());
    out.push(f64::NAN);

    let alpha = 1.0 / period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        if i == 1 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain = gain * alpha + avg_gain * (1.0 - alpha);
            avg_loss = loss * alpha + avg_loss * (1.0 - alpha);
        }

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        out.push(rsi);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_first_bar_is_nan() {
        let out = calculate_rsi(&[100.0, 101.0, 102.0], 14);
        assert!(out[0].is_nan());
        assert!(out[1].is_finite());
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let out = calculate_rsi(&[100.0, 101.0, 102.0, 103.0], 14);
        for &v in &out[1..] {
            assert!((v - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let out = calculate_rsi(&[103.0, 102.0, 101.0, 100.0], 14);
        for &v in &out[1..] {
            assert!(v.abs() < f64::EPSILON);
        }
    }

    #[test]
    fn rsi_alternating_moves_stay_interior() {
        let out = calculate_rsi(&[100.0, 101.0, 100.0, 101.0, 100.0], 2);
        // after the first loss arrives both averages are nonzero
        for &v in &out[2..] {
            assert!(v > 0.0 && v < 100.0);
        }
    }

    #[test]
    fn rsi_wilder_smoothing() {
        let closes = [100.0, 102.0, 101.0];
        let out = calculate_rsi(&closes, 2);
        // deltas: +2, -1; avg_gain = 2 then 0*0.5 + 2*0.5 = 1; avg_loss = 0 then 0.5
        let rs = 1.0 / 0.5;
        let expected = 100.0 - 100.0 / (1.0 + rs);
        assert!((out[2] - expected).abs() < 1e-12);
    }

    #[test]
    fn rsi_bounded() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        for &v in calculate_rsi(&closes, 14)[1..].iter() {
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
