//! Performance metrics over an equity curve and trade log.

use crate::domain::backtest::EquityPoint;
use crate::domain::position::ClosedTrade;

/// Annualization constant for 5-minute bars (365 × 24 × 12).
pub const DEFAULT_BARS_PER_YEAR: f64 = 105_120.0;

const REPORT_PRECISION: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub annualized_return: f64,
    pub total_trades: usize,
}

impl Metrics {
    /// Compute full-precision metrics. Degenerate inputs (fewer than one
    /// return sample, or zero return variance) resolve to all-zero ratios,
    /// never NaN and never an error.
    pub fn compute(equity_curve: &[EquityPoint], trades: &[ClosedTrade], bars_per_year: f64) -> Self {
        let returns: Vec<f64> = equity_curve
            .windows(2)
            .map(|w| w[1].equity / w[0].equity - 1.0)
            .collect();

        let std = population_std(&returns);
        if returns.is_empty() || std == 0.0 {
            return Metrics::zeroed(trades.len());
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;

        let first = equity_curve[0].equity;
        let last = equity_curve[equity_curve.len() - 1].equity;
        let annualized_return = (last / first).powf(bars_per_year / n) - 1.0;

        let sharpe = sanitize(mean / std * bars_per_year.sqrt());

        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let sortino = if downside.is_empty() {
            0.0
        } else {
            sanitize(mean / population_std(&downside) * bars_per_year.sqrt())
        };

        let max_drawdown = max_drawdown(equity_curve);
        let calmar = if max_drawdown == 0.0 {
            0.0
        } else {
            annualized_return / max_drawdown.abs()
        };

        Metrics {
            sharpe,
            sortino,
            calmar,
            max_drawdown,
            win_rate: win_rate(trades),
            annualized_return,
            total_trades: trades.len(),
        }
    }

    /// Copy with every ratio rounded to reporting precision (4 decimal
    /// places). Candidate ranking must use the full-precision values.
    pub fn rounded(&self) -> Self {
        let round = |v: f64| (v * REPORT_PRECISION).round() / REPORT_PRECISION;
        Metrics {
            sharpe: round(self.sharpe),
            sortino: round(self.sortino),
            calmar: round(self.calmar),
            max_drawdown: round(self.max_drawdown),
            win_rate: round(self.win_rate),
            annualized_return: round(self.annualized_return),
            total_trades: self.total_trades,
        }
    }

    fn zeroed(total_trades: usize) -> Self {
        Metrics {
            sharpe: 0.0,
            sortino: 0.0,
            calmar: 0.0,
            max_drawdown: 0.0,
            win_rate: 0.0,
            annualized_return: 0.0,
            total_trades,
        }
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    variance.sqrt()
}

/// Most negative excursion below the running equity peak; ≤ 0.
fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > 0.0 {
            let dd = (point.equity - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

fn win_rate(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.pnl > 0.0).count();
    wins as f64 / trades.len() as f64
}
