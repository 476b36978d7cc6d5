//! Typed engine configuration read through a [`ConfigPort`].

use crate::domain::error::ConfluenceError;
use crate::domain::fusion::FusionConfig;
use crate::domain::risk::RiskConfig;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub strategies: StrategyConfig,
    pub fusion: FusionConfig,
    pub risk: RiskConfig,
    pub initial_capital: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            strategies: StrategyConfig::default(),
            fusion: FusionConfig::default(),
            risk: RiskConfig::default(),
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}

impl EngineConfig {
    /// Read every known key, falling back to defaults for missing ones.
    /// A present but unparseable value is `ConfigInvalid`.
    pub fn from_port(port: &dyn ConfigPort) -> Result<Self, ConfluenceError> {
        let d = EngineConfig::default();

        let strategies = StrategyConfig {
            ma_short_window: window(port, "ma_short_window", d.strategies.ma_short_window)?,
            ma_long_window: window(port, "ma_long_window", d.strategies.ma_long_window)?,
            rsi_period: window(port, "rsi_period", d.strategies.rsi_period)?,
            macd_fast: window(port, "macd_fast", d.strategies.macd_fast)?,
            macd_slow: window(port, "macd_slow", d.strategies.macd_slow)?,
            macd_signal: window(port, "macd_signal", d.strategies.macd_signal)?,
            bollinger_period: window(port, "bollinger_period", d.strategies.bollinger_period)?,
        };

        let fusion = FusionConfig {
            confidence_threshold: number(
                port,
                "fusion",
                "confidence_threshold",
                d.fusion.confidence_threshold,
            )?,
        };

        let r = &d.risk;
        let risk = RiskConfig {
            risk_per_trade_fraction: number(
                port,
                "risk",
                "risk_per_trade_fraction",
                r.risk_per_trade_fraction,
            )?,
            stop_loss_fraction: number(port, "risk", "stop_loss_fraction", r.stop_loss_fraction)?,
            take_profit_fraction: number(
                port,
                "risk",
                "take_profit_fraction",
                r.take_profit_fraction,
            )?,
            daily_loss_limit_fraction: number(
                port,
                "risk",
                "daily_loss_limit_fraction",
                r.daily_loss_limit_fraction,
            )?,
            leverage_ceiling: number(port, "risk", "leverage_ceiling", r.leverage_ceiling)?,
            confidence_factor_min: number(
                port,
                "risk",
                "confidence_factor_min",
                r.confidence_factor_min,
            )?,
            confidence_factor_max: number(
                port,
                "risk",
                "confidence_factor_max",
                r.confidence_factor_max,
            )?,
            allow_shorting: flag(port, "risk", "allow_shorting", r.allow_shorting)?,
        };

        let initial_capital = number(port, "portfolio", "initial_capital", d.initial_capital)?;

        Ok(EngineConfig {
            strategies,
            fusion,
            risk,
            initial_capital,
        })
    }
}

fn window(port: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, ConfluenceError> {
    const SECTION: &str = "strategies";
    if let Some(raw) = port.get_string(SECTION, key) {
        raw.trim().parse::<i64>().map_err(|_| {
            ConfluenceError::config_invalid(SECTION, key, format!("'{raw}' is not an integer"))
        })?;
    }
    let value = port.get_int(SECTION, key, default as i64);
    usize::try_from(value)
        .map_err(|_| ConfluenceError::config_invalid(SECTION, key, "must not be negative"))
}

fn number(
    port: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, ConfluenceError> {
    if let Some(raw) = port.get_string(section, key) {
        raw.trim().parse::<f64>().map_err(|_| {
            ConfluenceError::config_invalid(section, key, format!("'{raw}' is not a number"))
        })?;
    }
    Ok(port.get_double(section, key, default))
}

fn flag(
    port: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: bool,
) -> Result<bool, ConfluenceError> {
    if let Some(raw) = port.get_string(section, key) {
        let known = ["true", "false", "yes", "no", "1", "0"];
        if !known.contains(&raw.trim().to_lowercase().as_str()) {
            return Err(ConfluenceError::config_invalid(
                section,
                key,
                format!("'{raw}' is not a boolean"),
            ));
        }
    }
    Ok(port.get_bool(section, key, default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory port keyed by (section, key).
    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            MapConfig(
                entries
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }

        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        }

        fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
            self.get_string(section, key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        }

        fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
            match self.get_string(section, key).as_deref() {
                Some("true") => true,
                Some("false") => false,
                _ => default,
            }
        }
    }

    #[test]
    fn empty_port_gives_defaults() {
        let config = EngineConfig::from_port(&MapConfig::new(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let port = MapConfig::new(&[
            ("strategies", "ma_short_window", "5"),
            ("fusion", "confidence_threshold", "70"),
            ("risk", "allow_shorting", "true"),
            ("portfolio", "initial_capital", "50000"),
        ]);
        let config = EngineConfig::from_port(&port).unwrap();
        assert_eq!(config.strategies.ma_short_window, 5);
        assert_eq!(config.strategies.ma_long_window, 50);
        assert!((config.fusion.confidence_threshold - 70.0).abs() < f64::EPSILON);
        assert!(config.risk.allow_shorting);
        assert!((config.initial_capital - 50000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_number_is_invalid() {
        let port = MapConfig::new(&[("risk", "leverage_ceiling", "lots")]);
        match EngineConfig::from_port(&port) {
            Err(ConfluenceError::ConfigInvalid { section, key, .. }) => {
                assert_eq!(section, "risk");
                assert_eq!(key, "leverage_ceiling");
            }
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn negative_window_is_invalid() {
        let port = MapConfig::new(&[("strategies", "rsi_period", "-3")]);
        assert!(matches!(
            EngineConfig::from_port(&port),
            Err(ConfluenceError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn malformed_bool_is_invalid() {
        let port = MapConfig::new(&[("risk", "allow_shorting", "sometimes")]);
        assert!(matches!(
            EngineConfig::from_port(&port),
            Err(ConfluenceError::ConfigInvalid { .. })
        ));
    }
}
