//! Configuration validation.
//!
//! Checks a loaded [`EngineConfig`] before an engine is built from it.

use crate::domain::config::EngineConfig;
use crate::domain::error::ConfluenceError;
use crate::domain::risk::RiskConfig;
use crate::domain::strategy::StrategyConfig;

pub fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfluenceError> {
    validate_windows(&config.strategies)?;
    validate_threshold(config.fusion.confidence_threshold)?;
    validate_risk(&config.risk)?;
    validate_initial_capital(config.initial_capital)?;
    Ok(())
}

fn validate_windows(strategies: &StrategyConfig) -> Result<(), ConfluenceError> {
    let windows = [
        ("ma_short_window", strategies.ma_short_window),
        ("ma_long_window", strategies.ma_long_window),
        ("rsi_period", strategies.rsi_period),
        ("macd_fast", strategies.macd_fast),
        ("macd_slow", strategies.macd_slow),
        ("macd_signal", strategies.macd_signal),
        ("bollinger_period", strategies.bollinger_period),
    ];
    for (key, value) in windows {
        if value == 0 {
            return Err(ConfluenceError::config_invalid(
                "strategies",
                key,
                format!("{key} must be at least 1"),
            ));
        }
    }
    if strategies.ma_short_window >= strategies.ma_long_window {
        return Err(ConfluenceError::config_invalid(
            "strategies",
            "ma_short_window",
            "ma_short_window must be shorter than ma_long_window",
        ));
    }
    if strategies.macd_fast >= strategies.macd_slow {
        return Err(ConfluenceError::config_invalid(
            "strategies",
            "macd_fast",
            "macd_fast must be shorter than macd_slow",
        ));
    }
    Ok(())
}

fn validate_threshold(value: f64) -> Result<(), ConfluenceError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfluenceError::config_invalid(
            "fusion",
            "confidence_threshold",
            "confidence_threshold must be within [0, 100]",
        ));
    }
    Ok(())
}

fn validate_fraction(key: &str, value: f64) -> Result<(), ConfluenceError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(ConfluenceError::config_invalid(
            "risk",
            key,
            format!("{key} must be in (0, 1]"),
        ));
    }
    Ok(())
}

fn validate_risk(risk: &RiskConfig) -> Result<(), ConfluenceError> {
    validate_fraction("risk_per_trade_fraction", risk.risk_per_trade_fraction)?;
    validate_fraction("stop_loss_fraction", risk.stop_loss_fraction)?;
    validate_fraction("daily_loss_limit_fraction", risk.daily_loss_limit_fraction)?;

    if !(risk.take_profit_fraction > 0.0 && risk.take_profit_fraction.is_finite()) {
        return Err(ConfluenceError::config_invalid(
            "risk",
            "take_profit_fraction",
            "take_profit_fraction must be positive",
        ));
    }
    if !(risk.leverage_ceiling > 0.0 && risk.leverage_ceiling.is_finite()) {
        return Err(ConfluenceError::config_invalid(
            "risk",
            "leverage_ceiling",
            "leverage_ceiling must be positive",
        ));
    }
    if !(risk.confidence_factor_min >= 0.0 && risk.confidence_factor_min.is_finite()) {
        return Err(ConfluenceError::config_invalid(
            "risk",
            "confidence_factor_min",
            "confidence_factor_min must be non-negative",
        ));
    }
    if !(risk.confidence_factor_max.is_finite()
        && risk.confidence_factor_max >= risk.confidence_factor_min)
    {
        return Err(ConfluenceError::config_invalid(
            "risk",
            "confidence_factor_max",
            "confidence_factor_max must not be below confidence_factor_min",
        ));
    }
    Ok(())
}

fn validate_initial_capital(value: f64) -> Result<(), ConfluenceError> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(ConfluenceError::config_invalid(
            "portfolio",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}
