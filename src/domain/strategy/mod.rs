//! Strategy evaluators: pure functions from a price series to one signal.
//!
//! Each evaluator declares the number of observations it needs and sees
//! only that many of the most recent observations.

pub mod bollinger;
pub mod ma_crossover;
pub mod macd;
pub mod rsi;

pub use bollinger::BollingerStrategy;
pub use ma_crossover::MaCrossoverStrategy;
pub use macd::MacdStrategy;
pub use rsi::RsiStrategy;

use crate::domain::error::ConfluenceError;
use crate::domain::observation::PriceSeries;
use crate::domain::signal::Signal;

pub trait StrategyEvaluator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Observations required before `evaluate` can produce a signal.
    fn min_lookback(&self) -> usize;

    /// Evaluate the latest `min_lookback()` observations of `series`.
    fn evaluate(&self, series: &PriceSeries) -> Result<Signal, ConfluenceError>;
}

/// Lookback windows for the four strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub ma_short_window: usize,
    pub ma_long_window: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            ma_short_window: 20,
            ma_long_window: 50,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
        }
    }
}

/// The evaluators run on every cycle, in a fixed order.
pub struct StrategySet {
    evaluators: Vec<Box<dyn StrategyEvaluator>>,
}

impl StrategySet {
    pub fn from_config(config: &StrategyConfig) -> Self {
        StrategySet {
            evaluators: vec![
                Box::new(MaCrossoverStrategy::new(
                    config.ma_short_window,
                    config.ma_long_window,
                )),
                Box::new(RsiStrategy::new(config.rsi_period)),
                Box::new(MacdStrategy::new(
                    config.macd_fast,
                    config.macd_slow,
                    config.macd_signal,
                )),
                Box::new(BollingerStrategy::new(config.bollinger_period)),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    /// Longest lookback of any evaluator; the series bound.
    pub fn max_lookback(&self) -> usize {
        self.evaluators
            .iter()
            .map(|e| e.min_lookback())
            .max()
            .unwrap_or(1)
    }

    /// Run every evaluator. A strategy short on history abstains; any other
    /// error is returned.
    pub fn evaluate_all(&self, series: &PriceSeries) -> Result<Vec<Signal>, ConfluenceError> {
        self.evaluators
            .iter()
            .map(|evaluator| match evaluator.evaluate(series) {
                Ok(signal) => Ok(signal),
                Err(err @ ConfluenceError::InsufficientHistory { .. }) => {
                    Ok(Signal::abstain(evaluator.name(), err.to_string()))
                }
                Err(err) => Err(err),
            })
            .collect()
    }
}

impl std::fmt::Debug for StrategySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.evaluators.iter().map(|e| e.name()))
            .finish()
    }
}
