#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::Cell;

use walkforge::domain::indicator::IndicatorBar;
use walkforge::domain::params::{ParameterSet, ParameterSpace};
pub use walkforge::domain::ohlcv::OhlcvBar;
use walkforge::ports::search_port::SearchPort;

pub fn start_ts() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// A deterministic wavy price path with enough movement to trigger
/// crossovers and stops.
pub fn wavy_close(i: usize) -> f64 {
    100.0 + (i as f64 / 40.0).sin() * 8.0 + (i as f64 / 7.0).sin() * 2.0
}

pub fn make_raw_bar(ts: NaiveDateTime, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: ts,
        open: close,
        high: close + 1.5,
        low: close - 1.5,
        close,
    }
}

/// `n` bars spaced `step_minutes` apart along the wavy path.
pub fn make_raw_series(n: usize, step_minutes: i64) -> Vec<OhlcvBar> {
    (0..n)
        .map(|i| {
            make_raw_bar(
                start_ts() + Duration::minutes(step_minutes * i as i64),
                wavy_close(i),
            )
        })
        .collect()
}

/// Serialize bars in the input CSV layout the loader expects.
pub fn bars_to_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("Datetime,Open,High,Low,Close\n");
    for bar in bars {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close
        ));
    }
    out
}

/// An indicator bar with neutral columns, for driving the engine directly.
pub fn make_indicator_bar(ts: NaiveDateTime, close: f64, atr: f64) -> IndicatorBar {
    IndicatorBar {
        bar: make_raw_bar(ts, close),
        ema_fast: close,
        ema_slow: 100.0,
        ema_regime_fast: 101.0,
        ema_regime_slow: 100.0,
        rsi: 50.0,
        atr,
        macd: 0.0,
        macd_signal: 0.0,
        macd_hist: 1.0,
        bb_upper: close + 10.0,
        bb_mid: close,
        bb_lower: close - 10.0,
    }
}

/// Oracle that ignores the search and always returns a fixed parameter set,
/// counting invocations.
pub struct FixedOracle {
    pub params: ParameterSet,
    pub calls: Cell<usize>,
}

impl FixedOracle {
    pub fn new(params: ParameterSet) -> Self {
        FixedOracle {
            params,
            calls: Cell::new(0),
        }
    }
}

impl SearchPort for FixedOracle {
    fn search(
        &self,
        _space: &ParameterSpace,
        objective: &mut dyn FnMut(&ParameterSet) -> f64,
        _trial_budget: usize,
    ) -> ParameterSet {
        self.calls.set(self.calls.get() + 1);
        let _ = objective(&self.params);
        self.params.clone()
    }
}
