//! Position state and closed-trade records.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// The single open position of a simulation run. Stop and target are fixed
/// at entry and never trailed.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub units: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl Position {
    pub fn should_stop_loss(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price <= self.stop_loss,
            Side::Short => price >= self.stop_loss,
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price >= self.take_profit,
            Side::Short => price <= self.take_profit,
        }
    }

    /// Realized pnl at an exit price, before fees.
    pub fn realized_pnl(&self, exit_price: f64) -> f64 {
        match self.side {
            Side::Long => (exit_price - self.entry_price) * self.units,
            Side::Short => (self.entry_price - exit_price) * self.units,
        }
    }
}

/// Append-only record of a closed position. `pnl` is net of the exit fee.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub side: Side,
    pub exit_price: f64,
    pub pnl: f64,
}
