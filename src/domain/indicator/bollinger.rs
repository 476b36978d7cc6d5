//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) observations are invalid.

use crate::domain::indicator::stddev::population_stddev;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorValue};
use crate::domain::observation::PriceObservation;

pub fn calculate_bollinger(
    observations: &[PriceObservation],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let mut values = Vec::with_capacity(observations.len());
    let mult = stddev_mult_x100 as f64 / 100.0;

    for (i, obs) in observations.iter().enumerate() {
        let valid = period > 0 && i + 1 >= period;

        let (upper, middle, lower) = if valid {
            let window: Vec<f64> = observations[i + 1 - period..=i]
                .iter()
                .map(|o| o.close)
                .collect();
            let middle = window.iter().sum::<f64>() / period as f64;
            let stddev = population_stddev(&window);
            (middle + mult * stddev, middle, middle - mult * stddev)
        } else {
            (0.0, 0.0, 0.0)
        };

        values.push(IndicatorPoint {
            timestamp: obs.timestamp,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    IndicatorSeries { values }
}
