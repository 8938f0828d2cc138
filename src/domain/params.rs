//! Strategy parameters and the bounded space the search explores.

use std::fmt;

/// One candidate configuration of the strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pub rsi_overbought: u32,
    pub rsi_oversold: u32,
    pub atr_mult: f64,
    pub take_profit_mult: f64,
    pub risk_pct: f64,
    pub cooldown: u32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        ParameterSet {
            rsi_overbought: 60,
            rsi_oversold: 40,
            atr_mult: 3.0,
            take_profit_mult: 2.0,
            risk_pct: 0.01,
            cooldown: 10,
        }
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ob={} os={} atr_mult={} tp_mult={} risk={} cooldown={}",
            self.rsi_overbought,
            self.rsi_oversold,
            self.atr_mult,
            self.take_profit_mult,
            self.risk_pct,
            self.cooldown
        )
    }
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    pub min: u32,
    pub max: u32,
}

/// Inclusive real range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatRange {
    pub min: f64,
    pub max: f64,
}

/// Per-field bounds the search oracle samples within.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpace {
    pub rsi_overbought: IntRange,
    pub rsi_oversold: IntRange,
    pub atr_mult: FloatRange,
    pub take_profit_mult: FloatRange,
    pub risk_pct: FloatRange,
    pub cooldown: IntRange,
}

impl Default for ParameterSpace {
    fn default() -> Self {
        ParameterSpace {
            rsi_overbought: IntRange { min: 55, max: 80 },
            rsi_oversold: IntRange { min: 20, max: 45 },
            atr_mult: FloatRange { min: 1.5, max: 5.0 },
            take_profit_mult: FloatRange { min: 1.0, max: 4.0 },
            risk_pct: FloatRange {
                min: 0.002,
                max: 0.02,
            },
            cooldown: IntRange { min: 5, max: 50 },
        }
    }
}

impl ParameterSpace {
    pub fn contains(&self, p: &ParameterSet) -> bool {
        let in_int = |r: IntRange, v: u32| v >= r.min && v <= r.max;
        let in_float = |r: FloatRange, v: f64| v >= r.min && v <= r.max;
        in_int(self.rsi_overbought, p.rsi_overbought)
            && in_int(self.rsi_oversold, p.rsi_oversold)
            && in_float(self.atr_mult, p.atr_mult)
            && in_float(self.take_profit_mult, p.take_profit_mult)
            && in_float(self.risk_pct, p.risk_pct)
            && in_int(self.cooldown, p.cooldown)
    }
}

impl fmt::Display for ParameterSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ob={}..{} os={}..{} atr_mult={}..{} tp_mult={}..{} risk={}..{} cooldown={}..{}",
            self.rsi_overbought.min,
            self.rsi_overbought.max,
            self.rsi_oversold.min,
            self.rsi_oversold.max,
            self.atr_mult.min,
            self.atr_mult.max,
            self.take_profit_mult.min,
            self.take_profit_mult.max,
            self.risk_pct.min,
            self.risk_pct.max,
            self.cooldown.min,
            self.cooldown.max
        )
    }
}
