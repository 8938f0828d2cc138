//! CSV results store with signature-keyed caching.
//!
//! Three artifacts per run directory: the per-window results table, the
//! parameter log (one row per results row, paired by index), and the run
//! signature. A rerun with an identical signature is served from the stored
//! files; any mismatch or inconsistency is a cache miss, never an error.

use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;

use crate::domain::error::WalkforgeError;
use crate::domain::metrics::Metrics;
use crate::domain::params::ParameterSet;
use crate::domain::walk_forward::{Window, WindowResult};
use crate::ports::results_port::ResultsPort;

pub const RESULTS_FILE: &str = "walk_forward_results.csv";
pub const PARAMS_FILE: &str = "best_params.csv";
pub const SIGNATURE_FILE: &str = "run_signature.txt";

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvResultsAdapter {
    output_dir: PathBuf,
}

impl CsvResultsAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    fn write_results_table(&self, results: &[WindowResult]) -> Result<(), WalkforgeError> {
        let path = self.output_dir.join(RESULTS_FILE);
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| WalkforgeError::Results {
            reason: format!("failed to create {}: {}", path.display(), e),
        })?;

        wtr.write_record([
            "window_start",
            "train_end",
            "window_end",
            "calmar",
            "sharpe",
            "sortino",
            "max_drawdown",
            "win_rate",
            "ann_return",
            "total_trades",
        ])
        .map_err(|e| WalkforgeError::Results {
            reason: e.to_string(),
        })?;

        for r in results {
            let m = r.metrics.rounded();
            wtr.write_record([
                r.window.train_start.format(TS_FORMAT).to_string(),
                r.window.train_end.format(TS_FORMAT).to_string(),
                r.window.test_end.format(TS_FORMAT).to_string(),
                m.calmar.to_string(),
                m.sharpe.to_string(),
                m.sortino.to_string(),
                m.max_drawdown.to_string(),
                m.win_rate.to_string(),
                m.annualized_return.to_string(),
                m.total_trades.to_string(),
            ])
            .map_err(|e| WalkforgeError::Results {
                reason: e.to_string(),
            })?;
        }

        wtr.flush().map_err(WalkforgeError::Io)?;
        Ok(())
    }

    fn write_params_log(&self, results: &[WindowResult]) -> Result<(), WalkforgeError> {
        let path = self.output_dir.join(PARAMS_FILE);
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| WalkforgeError::Results {
            reason: format!("failed to create {}: {}", path.display(), e),
        })?;

        wtr.write_record([
            "rsi_overbought",
            "rsi_oversold",
            "atr_mult",
            "take_profit_mult",
            "risk_pct",
            "cooldown",
        ])
        .map_err(|e| WalkforgeError::Results {
            reason: e.to_string(),
        })?;

        for r in results {
            let p = &r.params;
            wtr.write_record([
                p.rsi_overbought.to_string(),
                p.rsi_oversold.to_string(),
                p.atr_mult.to_string(),
                p.take_profit_mult.to_string(),
                p.risk_pct.to_string(),
                p.cooldown.to_string(),
            ])
            .map_err(|e| WalkforgeError::Results {
                reason: e.to_string(),
            })?;
        }

        wtr.flush().map_err(WalkforgeError::Io)?;
        Ok(())
    }

    fn read_results_table(&self) -> Option<Vec<(Window, Metrics)>> {
        let mut rdr = csv::Reader::from_path(self.output_dir.join(RESULTS_FILE)).ok()?;
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.ok()?;
            let ts = |i: usize| {
                NaiveDateTime::parse_from_str(record.get(i)?, TS_FORMAT).ok()
            };
            let num = |i: usize| record.get(i)?.parse::<f64>().ok();
            let window = Window {
                train_start: ts(0)?,
                train_end: ts(1)?,
                test_end: ts(2)?,
            };
            let metrics = Metrics {
                calmar: num(3)?,
                sharpe: num(4)?,
                sortino: num(5)?,
                max_drawdown: num(6)?,
                win_rate: num(7)?,
                annualized_return: num(8)?,
                total_trades: record.get(9)?.parse().ok()?,
            };
            rows.push((window, metrics));
        }
        Some(rows)
    }

    fn read_params_log(&self) -> Option<Vec<ParameterSet>> {
        let mut rdr = csv::Reader::from_path(self.output_dir.join(PARAMS_FILE)).ok()?;
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.ok()?;
            rows.push(ParameterSet {
                rsi_overbought: record.get(0)?.parse().ok()?,
                rsi_oversold: record.get(1)?.parse().ok()?,
                atr_mult: record.get(2)?.parse().ok()?,
                take_profit_mult: record.get(3)?.parse().ok()?,
                risk_pct: record.get(4)?.parse().ok()?,
                cooldown: record.get(5)?.parse().ok()?,
            });
        }
        Some(rows)
    }
}

impl ResultsPort for CsvResultsAdapter {
    fn load_cached(&self, signature: &str) -> Result<Option<Vec<WindowResult>>, WalkforgeError> {
        let stored = match fs::read_to_string(self.output_dir.join(SIGNATURE_FILE)) {
            Ok(s) => s,
            Err(_) => return Ok(None),
        };
        if stored.trim() != signature {
            return Ok(None);
        }

        let (Some(rows), Some(params)) = (self.read_results_table(), self.read_params_log())
        else {
            return Ok(None);
        };
        if rows.len() != params.len() {
            return Ok(None);
        }

        Ok(Some(
            rows.into_iter()
                .zip(params)
                .map(|((window, metrics), params)| WindowResult {
                    window,
                    metrics,
                    params,
                })
                .collect(),
        ))
    }

    fn write(&self, signature: &str, results: &[WindowResult]) -> Result<(), WalkforgeError> {
        fs::create_dir_all(&self.output_dir).map_err(WalkforgeError::Io)?;
        self.write_results_table(results)?;
        self.write_params_log(results)?;
        fs::write(
            self.output_dir.join(SIGNATURE_FILE),
            format!("{}\n", signature),
        )
        .map_err(WalkforgeError::Io)?;
        Ok(())
    }
}
