//! CLI definition and dispatch.

use chrono::Duration;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvBarAdapter;
use crate::adapters::csv_results_adapter::CsvResultsAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::random_search::RandomSearchAdapter;
use crate::domain::backtest::EngineConfig;
use crate::domain::config_validation::{
    validate_data_config, validate_engine_config, validate_search_config,
    validate_strategy_config, validate_walk_forward_config,
};
use crate::domain::error::WalkforgeError;
use crate::domain::indicator::{augment, IndicatorBar};
use crate::domain::metrics::Metrics;
use crate::domain::params::{FloatRange, IntRange, ParameterSet, ParameterSpace};
use crate::domain::signal::SignalPolicy;
use crate::domain::walk_forward::{
    evaluate, run_signature, run_walk_forward, WalkForwardConfig, WindowResult,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::results_port::ResultsPort;

#[derive(Parser, Debug)]
#[command(name = "walkforge", about = "Walk-forward strategy parameter tuner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run walk-forward optimization on the training series
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the configured output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Recompute even when cached results match the configuration
        #[arg(long)]
        force: bool,
    },
    /// Run a single backtest with the configured parameters
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar series to evaluate (defaults to the configured test series)
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Show summary information for the configured bar series
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Optimize {
            config,
            output,
            force,
        } => run_optimize(&config, output, force),
        Command::Backtest { config, data } => run_backtest_command(&config, data),
        Command::Info { config } => run_info(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = WalkforgeError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_optimize(config_path: &PathBuf, output: Option<PathBuf>, force: bool) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    for validate in [
        validate_data_config,
        validate_engine_config,
        validate_strategy_config,
        validate_walk_forward_config,
        validate_search_config,
    ] {
        if let Err(e) = validate(&adapter) {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    let policy = build_policy(&adapter);
    let engine = build_engine_config(&adapter);
    let wf_config = build_walk_forward_config(&adapter);
    let space = build_parameter_space(&adapter);
    let seed = adapter.get_int("search", "seed", 0) as u64;

    let output_dir = output.unwrap_or_else(|| {
        PathBuf::from(
            adapter
                .get_string("output", "dir")
                .unwrap_or_else(|| "results".to_string()),
        )
    });
    let store = CsvResultsAdapter::new(output_dir.clone());
    let signature = run_signature(&wf_config, &engine, policy, &space, seed);

    if !force {
        match store.load_cached(&signature) {
            Ok(Some(results)) => {
                eprintln!(
                    "Found cached results for this configuration in {}",
                    output_dir.display()
                );
                print_results(&results);
                return ExitCode::SUCCESS;
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    let train_path = match adapter.get_string("data", "train_path") {
        Some(p) => PathBuf::from(p),
        None => {
            let e = WalkforgeError::ConfigMissing {
                section: "data".into(),
                key: "train_path".into(),
            };
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let bars = match load_augmented_bars(&train_path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Loaded {} indicator-bearing bars from {}",
        bars.len(),
        train_path.display()
    );

    eprintln!(
        "Running walk-forward ({} month train, {} week test, {} trials per window, policy {})",
        wf_config.train_months,
        wf_config.test_weeks,
        wf_config.trial_budget,
        policy.as_str()
    );
    let oracle = RandomSearchAdapter::new(seed);
    let results = match run_walk_forward(&bars, policy, &space, &wf_config, &engine, &oracle) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_results(&results);

    if let Err(e) = store.write(&signature, &results) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("Wrote results and parameter log to {}", output_dir.display());

    ExitCode::SUCCESS
}

fn run_backtest_command(config_path: &PathBuf, data: Option<PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    for validate in [validate_engine_config, validate_strategy_config] {
        if let Err(e) = validate(&adapter) {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    let data_path = match data.or_else(|| {
        adapter
            .get_string("data", "test_path")
            .map(PathBuf::from)
    }) {
        Some(p) => p,
        None => {
            let e = WalkforgeError::ConfigMissing {
                section: "data".into(),
                key: "test_path".into(),
            };
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let bars = match load_augmented_bars(&data_path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Loaded {} indicator-bearing bars from {}",
        bars.len(),
        data_path.display()
    );

    let policy = build_policy(&adapter);
    let engine = build_engine_config(&adapter);
    let params = build_parameter_set(&adapter);
    let bars_per_year = adapter.get_double("metrics", "bars_per_year", 105_120.0);

    let metrics = match evaluate(&bars, policy, &params, &engine, bars_per_year) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    println!("Parameters : {}", params);
    print_metrics_report(&metrics);
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let series = [
        ("train", adapter.get_string("data", "train_path")),
        ("test", adapter.get_string("data", "test_path")),
    ];

    let mut shown = 0;
    for (name, path) in series {
        let Some(path) = path.map(PathBuf::from) else {
            continue;
        };
        let bars = match CsvBarAdapter::new(path.clone()).fetch_bars() {
            Ok(b) => b,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        shown += 1;

        println!("{}", name.to_uppercase());
        println!("  Rows      : {}", bars.len());
        if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
            println!(
                "  Date range: {}  ->  {}",
                first.timestamp.format("%Y-%m-%d %H:%M:%S"),
                last.timestamp.format("%Y-%m-%d %H:%M:%S")
            );
            let min = bars.iter().map(|b| b.close).fold(f64::INFINITY, f64::min);
            let max = bars
                .iter()
                .map(|b| b.close)
                .fold(f64::NEG_INFINITY, f64::max);
            println!("  Close min : {:.2}", min);
            println!("  Close max : {:.2}", max);
        }
    }

    if shown == 0 {
        let e = WalkforgeError::ConfigMissing {
            section: "data".into(),
            key: "train_path".into(),
        };
        eprintln!("error: {e}");
        return (&e).into();
    }

    ExitCode::SUCCESS
}

fn load_augmented_bars(path: &PathBuf) -> Result<Vec<IndicatorBar>, WalkforgeError> {
    let raw = CsvBarAdapter::new(path.clone()).fetch_bars()?;
    let bars = augment(&raw);
    if bars.is_empty() {
        return Err(WalkforgeError::InsufficientData {
            bars: raw.len(),
            minimum: crate::domain::indicator::BB_PERIOD,
        });
    }
    Ok(bars)
}

pub fn build_engine_config(adapter: &dyn ConfigPort) -> EngineConfig {
    let gap_minutes = adapter.get_int("engine", "max_gap_minutes", 0);
    EngineConfig {
        initial_capital: adapter.get_double("engine", "initial_capital", 10_000.0),
        fee_rate: adapter.get_double("engine", "fee_rate", 0.00125),
        max_bar_gap: (gap_minutes > 0).then(|| Duration::minutes(gap_minutes)),
    }
}

pub fn build_walk_forward_config(adapter: &dyn ConfigPort) -> WalkForwardConfig {
    WalkForwardConfig {
        train_months: adapter.get_int("walk_forward", "train_months", 1) as u32,
        test_weeks: adapter.get_int("walk_forward", "test_weeks", 1) as u32,
        min_train_bars: adapter.get_int("walk_forward", "min_train_bars", 500) as usize,
        min_test_bars: adapter.get_int("walk_forward", "min_test_bars", 100) as usize,
        trial_budget: adapter.get_int("search", "trials", 150) as usize,
        bars_per_year: adapter.get_double("metrics", "bars_per_year", 105_120.0),
    }
}

pub fn build_parameter_space(adapter: &dyn ConfigPort) -> ParameterSpace {
    let int = |key_min: &str, key_max: &str, default: IntRange| IntRange {
        min: adapter.get_int("search", key_min, default.min as i64) as u32,
        max: adapter.get_int("search", key_max, default.max as i64) as u32,
    };
    let float = |key_min: &str, key_max: &str, default: FloatRange| FloatRange {
        min: adapter.get_double("search", key_min, default.min),
        max: adapter.get_double("search", key_max, default.max),
    };
    let d = ParameterSpace::default();
    ParameterSpace {
        rsi_overbought: int("rsi_overbought_min", "rsi_overbought_max", d.rsi_overbought),
        rsi_oversold: int("rsi_oversold_min", "rsi_oversold_max", d.rsi_oversold),
        atr_mult: float("atr_mult_min", "atr_mult_max", d.atr_mult),
        take_profit_mult: float("take_profit_mult_min", "take_profit_mult_max", d.take_profit_mult),
        risk_pct: float("risk_pct_min", "risk_pct_max", d.risk_pct),
        cooldown: int("cooldown_min", "cooldown_max", d.cooldown),
    }
}

pub fn build_parameter_set(adapter: &dyn ConfigPort) -> ParameterSet {
    let d = ParameterSet::default();
    ParameterSet {
        rsi_overbought: adapter.get_int("parameters", "rsi_overbought", d.rsi_overbought as i64)
            as u32,
        rsi_oversold: adapter.get_int("parameters", "rsi_oversold", d.rsi_oversold as i64) as u32,
        atr_mult: adapter.get_double("parameters", "atr_mult", d.atr_mult),
        take_profit_mult: adapter.get_double("parameters", "take_profit_mult", d.take_profit_mult),
        risk_pct: adapter.get_double("parameters", "risk_pct", d.risk_pct),
        cooldown: adapter.get_int("parameters", "cooldown", d.cooldown as i64) as u32,
    }
}

pub fn build_policy(adapter: &dyn ConfigPort) -> SignalPolicy {
    adapter
        .get_string("strategy", "policy")
        .and_then(|s| SignalPolicy::parse(&s))
        .unwrap_or(SignalPolicy::EmaCross)
}

fn print_results(results: &[WindowResult]) {
    for r in results {
        let m = r.metrics.rounded();
        println!(
            "  {} -> {} | Calmar: {:>8.4} | Sharpe: {:>8.4} | WinRate: {:>6.2}% | Trades: {}",
            r.window.train_start.format("%Y-%m-%d"),
            r.window.test_end.format("%Y-%m-%d"),
            m.calmar,
            m.sharpe,
            m.win_rate * 100.0,
            m.total_trades
        );
    }
    println!("{} windows recorded", results.len());
}

fn print_metrics_report(metrics: &Metrics) {
    let m = metrics.rounded();
    println!("Calmar     : {:.4}", m.calmar);
    println!("Sharpe     : {:.4}", m.sharpe);
    println!("Sortino    : {:.4}", m.sortino);
    println!("Max DD     : {:.4}", m.max_drawdown);
    println!("Win rate   : {:.2}%", m.win_rate * 100.0);
    println!("Ann return : {:.4}", m.annualized_return);
    println!("Trades     : {}", m.total_trades);
}
