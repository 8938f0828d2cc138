//! Per-bar trade signal generation.
//!
//! A signal is a pure function of the current and immediately preceding
//! bar's indicator columns. The first bar of a slice never signals, and an
//! exact tie between crossing lines is not a cross.

use crate::domain::indicator::IndicatorBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    LongEntry,
    ShortEntry,
    Flat,
}

/// Which crossover drives entries. Both variants share the long-horizon
/// regime filter; they differ in the primary cross and the secondary
/// confirmation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalPolicy {
    /// Fast/slow EMA crossover, confirmed by RSI or MACD histogram.
    EmaCross,
    /// MACD line/signal crossover, confirmed by RSI or band position.
    MacdCross,
}

impl SignalPolicy {
    pub fn parse(s: &str) -> Option<SignalPolicy> {
        match s.trim().to_lowercase().as_str() {
            "ema-cross" | "ema_cross" | "ema" => Some(SignalPolicy::EmaCross),
            "macd-cross" | "macd_cross" | "macd" => Some(SignalPolicy::MacdCross),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalPolicy::EmaCross => "ema-cross",
            SignalPolicy::MacdCross => "macd-cross",
        }
    }
}

pub fn generate_signals(
    bars: &[IndicatorBar],
    policy: SignalPolicy,
    rsi_overbought: u32,
    rsi_oversold: u32,
) -> Vec<Signal> {
    let mut signals = Vec::with_capacity(bars.len());
    let ob = rsi_overbought as f64;
    let os = rsi_oversold as f64;

    for i in 0..bars.len() {
        if i == 0 {
            signals.push(Signal::Flat);
            continue;
        }
        let cur = &bars[i];
        let prev = &bars[i - 1];

        let trend_up = cur.ema_regime_fast > cur.ema_regime_slow;
        let trend_down = cur.ema_regime_fast < cur.ema_regime_slow;
        let rsi_ok_long = cur.rsi < ob;
        let rsi_ok_short = cur.rsi > os;

        let signal = match policy {
            SignalPolicy::EmaCross => {
                let cross_up = cur.ema_fast > cur.ema_slow && prev.ema_fast <= prev.ema_slow;
                let cross_down = cur.ema_fast < cur.ema_slow && prev.ema_fast >= prev.ema_slow;
                let macd_ok_long = cur.macd_hist > 0.0;
                let macd_ok_short = cur.macd_hist < 0.0;

                if cross_up && trend_up && (rsi_ok_long || macd_ok_long) {
                    Signal::LongEntry
                } else if cross_down && trend_down && (rsi_ok_short || macd_ok_short) {
                    Signal::ShortEntry
                } else {
                    Signal::Flat
                }
            }
            SignalPolicy::MacdCross => {
                let cross_up = cur.macd > cur.macd_signal && prev.macd <= prev.macd_signal;
                let cross_down = cur.macd < cur.macd_signal && prev.macd >= prev.macd_signal;
                let band_ok_long = cur.bar.close < cur.bb_upper;
                let band_ok_short = cur.bar.close > cur.bb_lower;

                if cross_up && trend_up && (rsi_ok_long || band_ok_long) {
                    Signal::LongEntry
                } else if cross_down && trend_down && (rsi_ok_short || band_ok_short) {
                    Signal::ShortEntry
                } else {
                    Signal::Flat
                }
            }
        };
        signals.push(signal);
    }

    signals
}
