//! Walk-forward optimization.
//!
//! Slides a fixed train span then a fixed test span across the bar series,
//! stepping by the test span. Each window asks the search port to maximize
//! the train-slice Calmar ratio, then evaluates the winning parameters on
//! the held-out test slice. Windows with too few bars are skipped without a
//! result; the loop halts once the projected test end passes the last bar.

use chrono::{Duration, Months, NaiveDateTime};

use crate::domain::backtest::{run_backtest, EngineConfig};
use crate::domain::error::WalkforgeError;
use crate::domain::indicator::IndicatorBar;
use crate::domain::metrics::Metrics;
use crate::domain::params::{ParameterSet, ParameterSpace};
use crate::domain::signal::{generate_signals, SignalPolicy};
use crate::ports::search_port::SearchPort;

/// Score assigned to any candidate whose backtest errors or produces a
/// non-finite ratio; the search budget is never aborted.
pub const OBJECTIVE_SENTINEL: f64 = -999.0;

#[derive(Debug, Clone, PartialEq)]
pub struct WalkForwardConfig {
    pub train_months: u32,
    pub test_weeks: u32,
    pub min_train_bars: usize,
    pub min_test_bars: usize,
    pub trial_budget: usize,
    pub bars_per_year: f64,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        WalkForwardConfig {
            train_months: 1,
            test_weeks: 1,
            min_train_bars: 500,
            min_test_bars: 100,
            trial_budget: 150,
            bars_per_year: crate::domain::metrics::DEFAULT_BARS_PER_YEAR,
        }
    }
}

/// One train/test window. Train covers [train_start, train_end), test
/// covers [train_end, test_end); the ranges never share a bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub train_start: NaiveDateTime,
    pub train_end: NaiveDateTime,
    pub test_end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowResult {
    pub window: Window,
    pub metrics: Metrics,
    pub params: ParameterSet,
}

/// One full evaluation: signals on the slice, engine run, metrics.
pub fn evaluate(
    bars: &[IndicatorBar],
    policy: SignalPolicy,
    params: &ParameterSet,
    engine: &EngineConfig,
    bars_per_year: f64,
) -> Result<Metrics, WalkforgeError> {
    let signals = generate_signals(bars, policy, params.rsi_overbought, params.rsi_oversold);
    let outcome = run_backtest(bars, &signals, params, engine)?;
    Ok(Metrics::compute(
        &outcome.equity_curve,
        &outcome.trades,
        bars_per_year,
    ))
}

/// The search objective: full-precision train-slice Calmar, with every
/// failure class collapsed to the sentinel.
pub fn objective_score(
    bars: &[IndicatorBar],
    policy: SignalPolicy,
    params: &ParameterSet,
    engine: &EngineConfig,
    bars_per_year: f64,
) -> f64 {
    match evaluate(bars, policy, params, engine, bars_per_year) {
        Ok(m) if m.calmar.is_finite() => m.calmar,
        _ => OBJECTIVE_SENTINEL,
    }
}

pub fn run_walk_forward(
    bars: &[IndicatorBar],
    policy: SignalPolicy,
    space: &ParameterSpace,
    config: &WalkForwardConfig,
    engine: &EngineConfig,
    oracle: &dyn SearchPort,
) -> Result<Vec<WindowResult>, WalkforgeError> {
    let Some(first) = bars.first() else {
        return Ok(Vec::new());
    };
    let Some(last) = bars.last() else {
        return Ok(Vec::new());
    };
    let last_ts = last.bar.timestamp;

    let mut results = Vec::new();
    let mut window_start = first.bar.timestamp;

    loop {
        let Some(train_end) = window_start.checked_add_months(Months::new(config.train_months))
        else {
            break;
        };
        let test_end = train_end + Duration::weeks(config.test_weeks as i64);
        if test_end > last_ts {
            break;
        }

        let train = slice_range(bars, window_start, train_end);
        let test = slice_range(bars, train_end, test_end);

        if train.len() >= config.min_train_bars && test.len() >= config.min_test_bars {
            let mut objective = |candidate: &ParameterSet| {
                objective_score(train, policy, candidate, engine, config.bars_per_year)
            };
            let best = oracle.search(space, &mut objective, config.trial_budget);

            let metrics = evaluate(test, policy, &best, engine, config.bars_per_year)?;
            results.push(WindowResult {
                window: Window {
                    train_start: window_start,
                    train_end,
                    test_end,
                },
                metrics,
                params: best,
            });
        }

        window_start = window_start + Duration::weeks(config.test_weeks as i64);
    }

    Ok(results)
}

/// Bars with start ≤ timestamp < end. Assumes the series is sorted.
fn slice_range(bars: &[IndicatorBar], start: NaiveDateTime, end: NaiveDateTime) -> &[IndicatorBar] {
    let lo = bars.partition_point(|b| b.bar.timestamp < start);
    let hi = bars.partition_point(|b| b.bar.timestamp < end);
    &bars[lo..hi]
}

/// Deterministic identity of a full run, used to key the results cache.
pub fn run_signature(
    config: &WalkForwardConfig,
    engine: &EngineConfig,
    policy: SignalPolicy,
    space: &ParameterSpace,
    seed: u64,
) -> String {
    let gap = match engine.max_bar_gap {
        Some(d) => d.num_minutes().to_string(),
        None => "none".to_string(),
    };
    format!(
        "walkforge-v1 policy={} train_months={} test_weeks={} min_train={} min_test={} \
         trials={} bars_per_year={} capital={} fee={} max_gap_min={} seed={} space[{}]",
        policy.as_str(),
        config.train_months,
        config.test_weeks,
        config.min_train_bars,
        config.min_test_bars,
        config.trial_budget,
        config.bars_per_year,
        engine.initial_capital,
        engine.fee_rate,
        gap,
        seed,
        space
    )
}
