//! End-to-end pipeline tests.
//!
//! Cover:
//! - CSV load → indicator augmentation → walk-forward → results store
//! - Signature-keyed cache round trip, invalidation, and the pairing
//!   invariant between the results table and the parameter log
//! - Seed determinism of a full optimization run

mod common;

use common::*;
use std::fs;
use tempfile::TempDir;

use walkforge::adapters::csv_adapter::CsvBarAdapter;
use walkforge::adapters::csv_results_adapter::{
    CsvResultsAdapter, PARAMS_FILE, RESULTS_FILE, SIGNATURE_FILE,
};
use walkforge::adapters::random_search::RandomSearchAdapter;
use walkforge::domain::backtest::EngineConfig;
use walkforge::domain::indicator::augment;
use walkforge::domain::params::{ParameterSet, ParameterSpace};
use walkforge::domain::signal::SignalPolicy;
use walkforge::domain::walk_forward::{
    run_signature, run_walk_forward, WalkForwardConfig, WindowResult,
};
use walkforge::ports::data_port::DataPort;
use walkforge::ports::results_port::ResultsPort;

/// Ten weeks of hourly bars: enough for several monthly-train windows.
fn setup_series() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("train.csv");
    let bars = make_raw_series(24 * 7 * 10, 60);
    fs::write(&path, bars_to_csv(&bars)).unwrap();
    (dir, path)
}

fn small_wf_config() -> WalkForwardConfig {
    WalkForwardConfig {
        train_months: 1,
        test_weeks: 1,
        min_train_bars: 50,
        min_test_bars: 20,
        trial_budget: 5,
        bars_per_year: 8_760.0,
    }
}

fn run_pipeline(path: &std::path::Path, seed: u64) -> Vec<WindowResult> {
    let raw = CsvBarAdapter::new(path.to_path_buf()).fetch_bars().unwrap();
    let bars = augment(&raw);
    assert!(!bars.is_empty());

    let oracle = RandomSearchAdapter::new(seed);
    run_walk_forward(
        &bars,
        SignalPolicy::EmaCross,
        &ParameterSpace::default(),
        &small_wf_config(),
        &EngineConfig::default(),
        &oracle,
    )
    .unwrap()
}

mod full_pipeline {
    use super::*;

    #[test]
    fn produces_time_ordered_windows() {
        let (_dir, path) = setup_series();
        let results = run_pipeline(&path, 42);

        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].window.train_start < pair[1].window.train_start);
            assert!(pair[0].window.test_end < pair[1].window.test_end);
        }
        for r in &results {
            assert!(r.window.train_end < r.window.test_end);
            assert!(ParameterSpace::default().contains(&r.params));
        }
    }

    #[test]
    fn identical_seeds_reproduce_the_run() {
        let (_dir, path) = setup_series();
        let a = run_pipeline(&path, 7);
        let b = run_pipeline(&path, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn fixed_oracle_runs_once_per_recorded_window() {
        let (_dir, path) = setup_series();
        let raw = CsvBarAdapter::new(path.clone()).fetch_bars().unwrap();
        let bars = augment(&raw);

        let oracle = FixedOracle::new(ParameterSet::default());
        let results = run_walk_forward(
            &bars,
            SignalPolicy::EmaCross,
            &ParameterSpace::default(),
            &small_wf_config(),
            &EngineConfig::default(),
            &oracle,
        )
        .unwrap();

        assert_eq!(oracle.calls.get(), results.len());
    }

    #[test]
    fn macd_policy_also_completes() {
        let (_dir, path) = setup_series();
        let raw = CsvBarAdapter::new(path.clone()).fetch_bars().unwrap();
        let bars = augment(&raw);

        let oracle = RandomSearchAdapter::new(3);
        let results = run_walk_forward(
            &bars,
            SignalPolicy::MacdCross,
            &ParameterSpace::default(),
            &small_wf_config(),
            &EngineConfig::default(),
            &oracle,
        )
        .unwrap();

        // same partitioning irrespective of policy
        let ema_results = run_pipeline(&path, 3);
        assert_eq!(results.len(), ema_results.len());
    }
}

mod results_cache {
    use super::*;

    fn signature(seed: u64) -> String {
        run_signature(
            &small_wf_config(),
            &EngineConfig::default(),
            SignalPolicy::EmaCross,
            &ParameterSpace::default(),
            seed,
        )
    }

    #[test]
    fn cache_round_trip_after_full_run() {
        let (_dir, path) = setup_series();
        let results = run_pipeline(&path, 42);

        let out = TempDir::new().unwrap();
        let store = CsvResultsAdapter::new(out.path().to_path_buf());
        store.write(&signature(42), &results).unwrap();

        let cached = store.load_cached(&signature(42)).unwrap().unwrap();
        assert_eq!(cached.len(), results.len());
        for (c, r) in cached.iter().zip(&results) {
            assert_eq!(c.window, r.window);
            assert_eq!(c.params, r.params);
            assert_eq!(c.metrics, r.metrics.rounded());
        }
    }

    #[test]
    fn config_change_invalidates_cache() {
        let (_dir, path) = setup_series();
        let results = run_pipeline(&path, 42);

        let out = TempDir::new().unwrap();
        let store = CsvResultsAdapter::new(out.path().to_path_buf());
        store.write(&signature(42), &results).unwrap();

        assert!(store.load_cached(&signature(43)).unwrap().is_none());
    }

    #[test]
    fn artifacts_are_positionally_paired() {
        let (_dir, path) = setup_series();
        let results = run_pipeline(&path, 42);
        assert!(!results.is_empty());

        let out = TempDir::new().unwrap();
        let store = CsvResultsAdapter::new(out.path().to_path_buf());
        store.write(&signature(42), &results).unwrap();

        let results_rows = fs::read_to_string(out.path().join(RESULTS_FILE))
            .unwrap()
            .lines()
            .count();
        let params_rows = fs::read_to_string(out.path().join(PARAMS_FILE))
            .unwrap()
            .lines()
            .count();
        assert_eq!(results_rows, params_rows);
        assert_eq!(results_rows, results.len() + 1);

        assert!(out.path().join(SIGNATURE_FILE).exists());
    }
}
