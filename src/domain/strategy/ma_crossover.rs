//! Moving-average crossover strategy.
//!
//! Compares simple means of close over a short and a long window. The short
//! mean above the long mean is bullish, below is bearish. Strength is the
//! percentage gap between the two means.

use crate::domain::error::ConfluenceError;
use crate::domain::indicator::calculate_sma;
use crate::domain::observation::PriceSeries;
use crate::domain::signal::{Direction, Signal};
use crate::domain::strategy::StrategyEvaluator;

pub const NAME: &str = "MA Crossover";

#[derive(Debug, Clone)]
pub struct MaCrossoverStrategy {
    short_window: usize,
    long_window: usize,
}

impl MaCrossoverStrategy {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        MaCrossoverStrategy {
            short_window,
            long_window,
        }
    }
}

impl StrategyEvaluator for MaCrossoverStrategy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn min_lookback(&self) -> usize {
        self.short_window.max(self.long_window) + 1
    }

    fn evaluate(&self, series: &PriceSeries) -> Result<Signal, ConfluenceError> {
        let window = series.tail(self.min_lookback(), NAME)?;

        let short = calculate_sma(window, self.short_window);
        let long = calculate_sma(window, self.long_window);

        let (Some((prev_short, short_now)), Some((prev_long, long_now))) =
            (short.last_two_valid(), long.last_two_valid())
        else {
            return Err(ConfluenceError::InsufficientHistory {
                strategy: NAME.to_string(),
                have: window.len(),
                need: self.min_lookback(),
            });
        };

        let (short_now, long_now) = (
            short_now.value.simple().unwrap_or(0.0),
            long_now.value.simple().unwrap_or(0.0),
        );
        let (prev_short, prev_long) = (
            prev_short.value.simple().unwrap_or(0.0),
            prev_long.value.simple().unwrap_or(0.0),
        );

        let gap_pct = if long_now > 0.0 {
            (short_now - long_now) / long_now * 100.0
        } else {
            0.0
        };
        let strength = gap_pct.abs();

        let signal = if short_now > long_now {
            let reason = if prev_short <= prev_long {
                format!(
                    "SMA({}) crossed above SMA({})",
                    self.short_window, self.long_window
                )
            } else {
                format!(
                    "SMA({}) above SMA({}) by {:.2}%",
                    self.short_window, self.long_window, gap_pct
                )
            };
            Signal::new(NAME, Direction::Buy, strength, reason)
        } else if short_now < long_now {
            let reason = if prev_short >= prev_long {
                format!(
                    "SMA({}) crossed below SMA({})",
                    self.short_window, self.long_window
                )
            } else {
                format!(
                    "SMA({}) below SMA({}) by {:.2}%",
                    self.short_window, self.long_window, -gap_pct
                )
            };
            Signal::new(NAME, Direction::Sell, strength, reason)
        } else {
            Signal::new(NAME, Direction::Hold, 0.0, "moving averages equal")
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
        let strategy = MaCrossoverStrategy::new(20, 50);
        let prices: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        match strategy.evaluate(&series(&prices)) {
            Err(ConfluenceError::InsufficientHistory { have, need, .. }) => {
                assert_eq!(have, 50);
                assert_eq!(need, 51);
            }
            other => panic!("expected InsufficientHistory, got {other:?}"),
        }
    }

    #[test]
    fn rising_series_is_buy() {
        let strategy = MaCrossoverStrategy::new(20, 50);
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 60.0 / 59.0).collect();
        let signal = strategy.evaluate(&series(&prices)).unwrap();
        assert_eq!(signal.direction, Direction::Buy);
        assert!(signal.strength > 0.0);
    }

    #[test]
    fn falling_series_is_sell() {
        let strategy = MaCrossoverStrategy::new(3, 5);
        let prices: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        let signal = strategy.evaluate(&series(&prices)).unwrap();
        assert_eq!(signal.direction, Direction::Sell);
    }

    #[test]
    fn fresh_cross_is_flagged() {
        let strategy = MaCrossoverStrategy::new(2, 4);
        // SMA(2) = 100 vs SMA(4) = 100 before the last bar, then a jump
        let signal = strategy
            .evaluate(&series(&[100.0, 100.0, 100.0, 100.0, 120.0]))
            .unwrap();
        assert_eq!(signal.direction, Direction::Buy);
        assert!(signal.reason.contains("crossed above"));
        // SMA(2) = 110, SMA(4) = 105
        assert!((signal.strength - (5.0 / 105.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn flat_series_is_hold() {
        let strategy = MaCrossoverStrategy::new(2, 4);
        let signal = strategy.evaluate(&series(&[50.0; 6])).unwrap();
        assert_eq!(signal.direction, Direction::Hold);
        assert_eq!(signal.strength, 0.0);
    }

    #[test]
    fn ignores_observations_beyond_lookback() {
        let strategy = MaCrossoverStrategy::new(2, 4);
        let mut prices = vec![1000.0; 10];
        prices.extend_from_slice(&[50.0; 5]);
        let signal = strategy.evaluate(&series(&prices)).unwrap();
        assert_eq!(signal.direction, Direction::Hold);
    }
}
