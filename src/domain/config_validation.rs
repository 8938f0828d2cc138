//! Configuration validation.
//!
//! Rejects nonsensical values before any data is loaded, so a bad config
//! fails fast with a precise message instead of producing a silent
//! degenerate run.

use crate::domain::error::WalkforgeError;
use crate::domain::signal::SignalPolicy;
use crate::ports::config_port::ConfigPort;

fn invalid(section: &str, key: &str, reason: &str) -> WalkforgeError {
    WalkforgeError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: reason.into(),
    }
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), WalkforgeError> {
    if config.get_string("data", "train_path").is_none() {
        return Err(WalkforgeError::ConfigMissing {
            section: "data".into(),
            key: "train_path".into(),
        });
    }
    Ok(())
}

pub fn validate_engine_config(config: &dyn ConfigPort) -> Result<(), WalkforgeError> {
    let capital = config.get_double("engine", "initial_capital", 10_000.0);
    if !(capital > 0.0) {
        return Err(invalid("engine", "initial_capital", "must be positive"));
    }

    let fee = config.get_double("engine", "fee_rate", 0.00125);
    if !(0.0..1.0).contains(&fee) {
        return Err(invalid("engine", "fee_rate", "must be in [0, 1)"));
    }

    let gap = config.get_int("engine", "max_gap_minutes", 0);
    if gap < 0 {
        return Err(invalid("engine", "max_gap_minutes", "must be non-negative"));
    }

    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), WalkforgeError> {
    let policy = config
        .get_string("strategy", "policy")
        .unwrap_or_else(|| "ema-cross".to_string());
    if SignalPolicy::parse(&policy).is_none() {
        return Err(invalid(
            "strategy",
            "policy",
            "expected ema-cross or macd-cross",
        ));
    }
    Ok(())
}

pub fn validate_walk_forward_config(config: &dyn ConfigPort) -> Result<(), WalkforgeError> {
    if config.get_int("walk_forward", "train_months", 1) < 1 {
        return Err(invalid("walk_forward", "train_months", "must be at least 1"));
    }
    if config.get_int("walk_forward", "test_weeks", 1) < 1 {
        return Err(invalid("walk_forward", "test_weeks", "must be at least 1"));
    }
    if config.get_int("walk_forward", "min_train_bars", 500) < 1 {
        return Err(invalid("walk_forward", "min_train_bars", "must be positive"));
    }
    if config.get_int("walk_forward", "min_test_bars", 100) < 1 {
        return Err(invalid("walk_forward", "min_test_bars", "must be positive"));
    }

    let bars_per_year = config.get_double("metrics", "bars_per_year", 105_120.0);
    if !(bars_per_year > 0.0) {
        return Err(invalid("metrics", "bars_per_year", "must be positive"));
    }

    Ok(())
}

pub fn validate_search_config(config: &dyn ConfigPort) -> Result<(), WalkforgeError> {
    if config.get_int("search", "trials", 150) < 1 {
        return Err(invalid("search", "trials", "must be at least 1"));
    }

    for (min_key, max_key, min_default, max_default) in [
        ("rsi_overbought_min", "rsi_overbought_max", 55, 80),
        ("rsi_oversold_min", "rsi_oversold_max", 20, 45),
        ("cooldown_min", "cooldown_max", 5, 50),
    ] {
        let lo = config.get_int("search", min_key, min_default);
        let hi = config.get_int("search", max_key, max_default);
        if lo > hi {
            return Err(invalid("search", min_key, "range minimum exceeds maximum"));
        }
        if lo < 0 {
            return Err(invalid("search", min_key, "must be non-negative"));
        }
    }

    for (min_key, max_key, min_default, max_default) in [
        ("atr_mult_min", "atr_mult_max", 1.5, 5.0),
        ("take_profit_mult_min", "take_profit_mult_max", 1.0, 4.0),
        ("risk_pct_min", "risk_pct_max", 0.002, 0.02),
    ] {
        let lo = config.get_double("search", min_key, min_default);
        let hi = config.get_double("search", max_key, max_default);
        if lo > hi {
            return Err(invalid("search", min_key, "range minimum exceeds maximum"));
        }
    }

    for key in ["rsi_overbought_max", "rsi_oversold_max"] {
        if config.get_int("search", key, 80) > 100 {
            return Err(invalid("search", key, "RSI bound cannot exceed 100"));
        }
    }

    let risk_max = config.get_double("search", "risk_pct_max", 0.02);
    if !(risk_max > 0.0 && risk_max < 1.0) {
        return Err(invalid("search", "risk_pct_max", "must be in (0, 1)"));
    }

    Ok(())
}
