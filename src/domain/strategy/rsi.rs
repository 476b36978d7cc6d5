//! RSI strategy.
//!
//! Buys when RSI enters the oversold zone and sells when it enters the
//! overbought zone. Staying inside a zone does not repeat the signal.

use crate::domain::error::ConfluenceError;
use crate::domain::indicator::calculate_rsi;
use crate::domain::observation::PriceSeries;
use crate::domain::signal::{Direction, Signal};
use crate::domain::strategy::StrategyEvaluator;

pub const NAME: &str = "RSI";
pub const OVERSOLD: f64 = 30.0;
pub const OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone)]
pub struct RsiStrategy {
    period: usize,
}

impl RsiStrategy {
    pub fn new(period: usize) -> Self {
        RsiStrategy { period }
    }
}

impl StrategyEvaluator for RsiStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn min_lookback(&self) -> usize {
        // period changes for the first value, one more for the previous value
        self.period + 2
    }

    fn evaluate(&self, series: &PriceSeries) -> Result<Signal, ConfluenceError> {
        let window = series.tail(self.min_lookback(), NAME)?;
        let rsi = calculate_rsi(window, self.period);

        let Some((prev, latest)) = rsi.last_two_valid() else {
            return Err(ConfluenceError::InsufficientHistory {
                strategy: NAME.to_string(),
                have: window.len(),
                need: self.min_lookback(),
            });
        };
        let prev = prev.value.simple().unwrap_or(50.0);
        let current = latest.value.simple().unwrap_or(50.0);
        let strength = (current - 50.0).abs() * 2.0;

        let signal = if current < OVERSOLD && prev >= OVERSOLD {
            Signal::new(
                NAME,
                Direction::Buy,
                strength,
                format!("RSI oversold: {current:.1} (threshold {OVERSOLD})"),
            )
        } else if current > OVERBOUGHT && prev <= OVERBOUGHT {
            Signal::new(
                NAME,
                Direction::Sell,
                strength,
                format!("RSI overbought: {current:.1} (threshold {OVERBOUGHT})"),
            )
        } else {
            Signal::new(NAME, Direction::Hold, 0.0, format!("RSI {current:.1}"))
        };

        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_observations;

    fn series(prices: &[f64]) -> PriceSeries {
        PriceSeries::from_observations("TEST", 100, make_observations(prices)).unwrap()
    }

    #[test]
    fn insufficient_history() {
        let strategy = RsiStrategy::new(14);
        let result = strategy.evaluate(&series(&[100.0; 15]));
        assert!(matches!(
            result,
            Err(ConfluenceError::InsufficientHistory { need: 16, .. })
        ));
    }

    #[test]
    fn steady_rise_never_sells() {
        let strategy = RsiStrategy::new(14);
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let signal = strategy.evaluate(&series(&prices)).unwrap();
        assert_ne!(signal.direction, Direction::Sell);
    }

    #[test]
    fn sharp_drop_enters_oversold() {
        let strategy = RsiStrategy::new(4);
        // alternating moves keep RSI near 50, then a large drop
        let signal = strategy
            .evaluate(&series(&[100.0, 101.0, 100.0, 101.0, 100.0, 80.0]))
            .unwrap();
        assert_eq!(signal.direction, Direction::Buy);
        assert!(signal.strength > 40.0);
    }

    #[test]
    fn sharp_rally_enters_overbought() {
        let strategy = RsiStrategy::new(4);
        let signal = strategy
            .evaluate(&series(&[100.0, 99.0, 100.0, 99.0, 100.0, 120.0]))
            .unwrap();
        assert_eq!(signal.direction, Direction::Sell);
    }

    #[test]
    fn neutral_is_hold() {
        let strategy = RsiStrategy::new(4);
        let signal = strategy
            .evaluate(&series(&[100.0, 101.0, 100.0, 101.0, 100.0, 101.0]))
            .unwrap();
        assert_eq!(signal.direction, Direction::Hold);
        assert_eq!(signal.strength, 0.0);
    }
}
