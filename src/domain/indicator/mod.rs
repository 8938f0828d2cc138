//! Technical indicator columns and bar augmentation.
//!
//! [`augment`] turns a raw OHLC series into indicator-bearing bars with the
//! fixed column set the signal policies consume, dropping every leading row
//! that lacks a full look-back window.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

use crate::domain::ohlcv::OhlcvBar;

pub const EMA_FAST_SPAN: usize = 20;
pub const EMA_SLOW_SPAN: usize = 50;
pub const EMA_REGIME_FAST_SPAN: usize = 200;
pub const EMA_REGIME_SLOW_SPAN: usize = 500;
pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BB_PERIOD: usize = 20;
pub const BB_MULT: f64 = 2.0;

/// An OHLC bar augmented with the deterministic indicator columns.
/// Every column on a constructed bar is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorBar {
    pub bar: OhlcvBar,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_regime_fast: f64,
    pub ema_regime_slow: f64,
    pub rsi: f64,
    pub atr: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub bb_upper: f64,
    pub bb_mid: f64,
    pub bb_lower: f64,
}

/// Compute all indicator columns and drop leading warmup rows.
pub fn augment(bars: &[OhlcvBar]) -> Vec<IndicatorBar> {
    if bars.is_empty() {
        return Vec::new();
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let ema_fast = ema::calculate_ema(&closes, EMA_FAST_SPAN);
    let ema_slow = ema::calculate_ema(&closes, EMA_SLOW_SPAN);
    let ema_regime_fast = ema::calculate_ema(&closes, EMA_REGIME_FAST_SPAN);
    let ema_regime_slow = ema::calculate_ema(&closes, EMA_REGIME_SLOW_SPAN);
    let rsi = rsi::calculate_rsi(&closes, RSI_PERIOD);
    let atr = atr::calculate_atr(bars, ATR_PERIOD);
    let macd = macd::calculate_macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    let bb = bollinger::calculate_bollinger(&closes, BB_PERIOD, BB_MULT);

    let mut out = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let row = IndicatorBar {
            bar: bar.clone(),
            ema_fast: ema_fast[i],
            ema_slow: ema_slow[i],
            ema_regime_fast: ema_regime_fast[i],
            ema_regime_slow: ema_regime_slow[i],
            rsi: rsi[i],
            atr: atr[i],
            macd: macd.line[i],
            macd_signal: macd.signal[i],
            macd_hist: macd.histogram[i],
            bb_upper: bb.upper[i],
            bb_mid: bb.mid[i],
            bb_lower: bb.lower[i],
        };
        if out.is_empty() && !row_is_valid(&row) {
            continue;
        }
        out.push(row);
    }

    out
}

fn row_is_valid(row: &IndicatorBar) -> bool {
    row.ema_fast.is_finite()
        && row.ema_slow.is_finite()
        && row.ema_regime_fast.is_finite()
        && row.ema_regime_slow.is_finite()
        && row.rsi.is_finite()
        && row.atr.is_finite()
        && row.macd.is_finite()
        && row.macd_signal.is_finite()
        && row.macd_hist.is_finite()
        && row.bb_upper.is_finite()
        && row.bb_mid.is_finite()
        && row.bb_lower.is_finite()
}
