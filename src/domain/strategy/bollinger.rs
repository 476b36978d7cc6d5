//! Bollinger Bands mean-reversion strategy.

use crate::domain::error::ConfluenceError;
use crate::domain::indicator::{IndicatorValue, calculate_bollinger};
use crate::domain::observation::PriceSeries;
use crate::domain::signal::{Direction, Signal};
use crate::domain::strategy::StrategyEvaluator;

pub const NAME: &str = "Bollinger Bands";
pub const STDDEV_MULT_X100: u32 = 200;

#[derive(Debug, Clone)]
pub struct BollingerStrategy {
    period: usize,
}

impl BollingerStrategy {
    pub fn new(period: usize) -> Self {
        BollingerStrategy { period }
    }
}

impl StrategyEvaluator for BollingerStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn min_lookback(&self) -> usize {
        self.period.max(1)
    }

    fn evaluate(&self, series: &PriceSeries) -> Result<Signal, ConfluenceError> {
        let window = series.tail(self.min_lookback(), NAME)?;
        let bands = calculate_bollinger(window, self.period, STDDEV_MULT_X100);

        let Some(point) = bands.last_valid() else {
            return Err(ConfluenceError::InsufficientHistory {
                strategy: NAME.to_string(),
                have: window.len(),
                need: self.min_lookback(),
            });
        };
        let IndicatorValue::Bollinger { upper, lower, .. } = point.value else {
            return Err(ConfluenceError::invalid_input("bollinger produced a non-band value"));
        };
        let close = window[window.len() - 1].close;
        let width = upper - lower;

        if width <= 0.0 {
            return Ok(Signal::new(NAME, Direction::Hold, 0.0, "bands have zero width"));
        }

        let signal = if close <= lower {
            Signal::new(
                NAME,
                Direction::Buy,
                (lower - close) / width * 100.0,
                format!("close {close:.2} at or below lower band {lower:.2}"),
            )
        } else if close >= upper {
            Signal::new(
                NAME,
                Direction::Sell,
                (close - upper) / width * 100.0,
                format!("close {close:.2} at or above upper band {upper:.2}"),
            )
        } else {
            Signal::new(NAME, Direction::Hold, 0.0, "close between bands")
        };

        Ok(signal)
    }
}
