//! Bar-by-bar backtest engine.
//!
//! A sequential state machine over signal-bearing bars: exits (stop-loss,
//! take-profit, opposing signal, optional gap force-close) are evaluated
//! before entries, so a position opened at bar i can close no earlier than
//! bar i+1. Equity changes only on entry fees and close events; every bar
//! appends one equity sample, floored at zero.

use chrono::{Duration, NaiveDateTime};

use crate::domain::error::WalkforgeError;
use crate::domain::indicator::IndicatorBar;
use crate::domain::params::ParameterSet;
use crate::domain::position::{ClosedTrade, Position, Side};
use crate::domain::signal::Signal;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub initial_capital: f64,
    /// Proportional fee charged on notional at entry and at exit.
    pub fee_rate: f64,
    /// When set, an open position is force-closed at the current close if
    /// the gap between consecutive bar timestamps exceeds this duration.
    /// No cooldown is applied to a forced close.
    pub max_bar_gap: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            initial_capital: 10_000.0,
            fee_rate: 0.00125,
            max_bar_gap: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<ClosedTrade>,
}

/// The loop-carried simulation state, threaded through bar processing by
/// ownership transfer.
#[derive(Debug)]
struct EngineState {
    equity: f64,
    position: Option<Position>,
    cooldown: u32,
}

impl EngineState {
    fn new(initial_capital: f64) -> Self {
        EngineState {
            equity: initial_capital,
            position: None,
            cooldown: 0,
        }
    }

    fn advance(
        mut self,
        prev_ts: Option<NaiveDateTime>,
        bar: &IndicatorBar,
        signal: Signal,
        params: &ParameterSet,
        config: &EngineConfig,
        trades: &mut Vec<ClosedTrade>,
    ) -> EngineState {
        let price = bar.bar.close;

        if self.cooldown > 0 {
            self.cooldown -= 1;
        }

        let gap_exceeded = match (config.max_bar_gap, prev_ts) {
            (Some(max_gap), Some(prev)) => bar.bar.timestamp.signed_duration_since(prev) > max_gap,
            _ => false,
        };

        if let Some(pos) = self.position.take() {
            if gap_exceeded {
                self.close(pos, price, config, trades);
            } else if pos.should_stop_loss(price)
                || pos.should_take_profit(price)
                || opposes(pos.side, signal)
            {
                self.close(pos, price, config, trades);
                self.cooldown = params.cooldown;
            } else {
                self.position = Some(pos);
            }
        }

        if self.position.is_none() && self.cooldown == 0 {
            if let Some(side) = entry_side(signal) {
                let stop_distance = bar.atr * params.atr_mult;
                if stop_distance > 0.0 {
                    let units = (self.equity * params.risk_pct / stop_distance)
                        .min(self.equity * 0.95 / price);
                    let (stop_loss, take_profit) = match side {
                        Side::Long => (
                            price - stop_distance,
                            price + stop_distance * params.take_profit_mult,
                        ),
                        Side::Short => (
                            price + stop_distance,
                            price - stop_distance * params.take_profit_mult,
                        ),
                    };
                    self.position = Some(Position {
                        side,
                        entry_price: price,
                        units,
                        stop_loss,
                        take_profit,
                    });
                    self.equity = (self.equity - price * units * config.fee_rate).max(0.0);
                }
            }
        }

        self
    }

    fn close(
        &mut self,
        pos: Position,
        price: f64,
        config: &EngineConfig,
        trades: &mut Vec<ClosedTrade>,
    ) {
        let fee = price * pos.units * config.fee_rate;
        let pnl = pos.realized_pnl(price) - fee;
        self.equity = (self.equity + pnl).max(0.0);
        trades.push(ClosedTrade {
            side: pos.side,
            exit_price: price,
            pnl,
        });
    }
}

fn opposes(side: Side, signal: Signal) -> bool {
    matches!(
        (side, signal),
        (Side::Long, Signal::ShortEntry) | (Side::Short, Signal::LongEntry)
    )
}

fn entry_side(signal: Signal) -> Option<Side> {
    match signal {
        Signal::LongEntry => Some(Side::Long),
        Signal::ShortEntry => Some(Side::Short),
        Signal::Flat => None,
    }
}

pub fn run_backtest(
    bars: &[IndicatorBar],
    signals: &[Signal],
    params: &ParameterSet,
    config: &EngineConfig,
) -> Result<BacktestOutcome, WalkforgeError> {
    if signals.len() != bars.len() {
        return Err(WalkforgeError::SignalMismatch {
            signals: signals.len(),
            bars: bars.len(),
        });
    }

    let mut trades = Vec::new();
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut state = EngineState::new(config.initial_capital);
    let mut prev_ts = None;

    for (bar, &signal) in bars.iter().zip(signals) {
        state = state.advance(prev_ts, bar, signal, params, config, &mut trades);
        equity_curve.push(EquityPoint {
            timestamp: bar.bar.timestamp,
            equity: state.equity,
        });
        prev_ts = Some(bar.bar.timestamp);
    }

    Ok(BacktestOutcome {
        equity_curve,
        trades,
    })
}
