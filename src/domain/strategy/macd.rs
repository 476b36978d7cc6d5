//! MACD signal-line crossover strategy.
//!
//! Strength is the latest histogram magnitude relative to the standard
//! deviation of the MACD line across the window where it is defined.

use crate::domain::error::ConfluenceError;
use crate::domain::indicator::{IndicatorValue, calculate_macd, population_stddev};
use crate::domain::observation::PriceSeries;
use crate::domain::signal::{Direction, Signal};
use crate::domain::strategy::StrategyEvaluator;

pub const NAME: &str = "MACD";

/// Histogram values this close to zero are float noise, not a crossover.
const CROSS_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct MacdStrategy {
    fast: usize,
    slow: usize,
    signal: usize,
}

impl MacdStrategy {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        MacdStrategy { fast, slow, signal }
    }
}

fn unpack(value: &IndicatorValue) -> (f64, f64, f64) {
    match value {
        IndicatorValue::Macd {
            line,
            signal,
            histogram,
        } => (*line, *signal, *histogram),
        _ => (0.0, 0.0, 0.0),
    }
}

impl StrategyEvaluator for MacdStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn min_lookback(&self) -> usize {
        self.fast.max(self.slow) + self.signal
    }

    fn evaluate(&self, series: &PriceSeries) -> Result<Signal, ConfluenceError> {
        let window = series.tail(self.min_lookback(), NAME)?;
        let macd = calculate_macd(window, self.fast, self.slow, self.signal);

        let Some((prev, latest)) = macd.last_two_valid() else {
            return Err(ConfluenceError::InsufficientHistory {
                strategy: NAME.to_string(),
                have: window.len(),
                need: self.min_lookback(),
            });
        };
        let (prev_line, prev_signal, _) = unpack(&prev.value);
        let (_, _, histogram) = unpack(&latest.value);

        let line_warmup = self.fast.max(self.slow) - 1;
        let defined_line: Vec<f64> = macd.values[line_warmup..]
            .iter()
            .map(|p| unpack(&p.value).0)
            .collect();
        let volatility = population_stddev(&defined_line);
        let strength = if volatility > 0.0 {
            histogram.abs() / volatility * 100.0
        } else {
            0.0
        };

        let prev_histogram = prev_line - prev_signal;
        let signal = if histogram > CROSS_EPSILON && prev_histogram <= CROSS_EPSILON {
            Signal::new(
                NAME,
                Direction::Buy,
                strength,
                format!("MACD crossed above signal (histogram {histogram:.4})"),
            )
        } else if histogram < -CROSS_EPSILON && prev_histogram >= -CROSS_EPSILON {
            Signal::new(
                NAME,
                Direction::Sell,
                strength,
                format!("MACD crossed below signal (histogram {histogram:.4})"),
            )
        } else {
            Signal::new(
                NAME,
                Direction::Hold,
                0.0,
                format!("no MACD crossover (histogram {histogram:.4})"),
            )
        };

        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_observations;

    fn series(prices: &[f64]) -> PriceSeries {
        PriceSeries::from_observations("TEST", 200, make_observations(prices)).unwrap()
    }

    #[test]
    fn insufficient_history() {
        let strategy = MacdStrategy::new(12, 26, 9);
        let prices: Vec<f64> = (0..34).map(|i| 100.0 + i as f64).collect();
        assert!(matches!(
            strategy.evaluate(&series(&prices)),
            Err(ConfluenceError::InsufficientHistory { need: 35, have: 34, .. })
        ));
    }

    #[test]
    fn steady_trend_has_no_crossover() {
        let strategy = MacdStrategy::new(12, 26, 9);
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let signal = strategy.evaluate(&series(&prices)).unwrap();
        assert_eq!(signal.direction, Direction::Hold);
    }

    #[test]
    fn downturn_then_rebound_crosses_above() {
        let strategy = MacdStrategy::new(3, 6, 3);
        // accelerating decline keeps MACD under its signal line, the jump crosses it back
        let mut prices = vec![100.0, 99.0, 97.0, 94.0, 90.0, 85.0, 79.0, 72.0];
        prices.push(110.0);
        let signal = strategy.evaluate(&series(&prices)).unwrap();
        assert_eq!(signal.direction, Direction::Buy);
        assert!(signal.strength > 0.0);
    }

    #[test]
    fn rally_then_collapse_crosses_below() {
        let strategy = MacdStrategy::new(3, 6, 3);
        let mut prices = vec![100.0, 101.0, 103.0, 106.0, 110.0, 115.0, 121.0, 128.0];
        prices.push(90.0);
        let signal = strategy.evaluate(&series(&prices)).unwrap();
        assert_eq!(signal.direction, Direction::Sell);
    }

    #[test]
    fn flat_prices_zero_strength() {
        let strategy = MacdStrategy::new(3, 6, 3);
        let signal = strategy.evaluate(&series(&[100.0; 12])).unwrap();
        assert_eq!(signal.direction, Direction::Hold);
        assert_eq!(signal.strength, 0.0);
    }
}
