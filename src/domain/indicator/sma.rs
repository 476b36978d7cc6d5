//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) observations are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorValue};
use crate::domain::observation::PriceObservation;

pub fn calculate_sma(observations: &[PriceObservation], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries { values: Vec::new() };
    }

    let mut values = Vec::with_capacity(observations.len());
    let mut sum = 0.0;

    for (i, obs) in observations.iter().enumerate() {
        sum += obs.close;
        if i >= period {
            sum -= observations[i - period].close;
        }

        let valid = i + 1 >= period;
        let value = if valid { sum / period as f64 } else { 0.0 };

        values.push(IndicatorPoint {
            timestamp: obs.timestamp,
            valid,
            value: IndicatorValue::Simple(value),
        });
    }

    IndicatorSeries { values }
}
