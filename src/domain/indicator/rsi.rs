//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100 (or 50 when there was no movement at all)
//!
//! Warmup: first n observations are invalid (need n price changes).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorValue};
use crate::domain::observation::PriceObservation;

pub fn calculate_rsi(observations: &[PriceObservation], period: usize) -> IndicatorSeries {
    let invalid = |obs: &PriceObservation| IndicatorPoint {
        timestamp: obs.timestamp,
        valid: false,
        value: IndicatorValue::Simple(0.0),
    };

    if period == 0 || observations.len() < 2 {
        return IndicatorSeries {
            values: observations.iter().map(invalid).collect(),
        };
    }

    let mut values = Vec::with_capacity(observations.len());
    values.push(invalid(&observations[0]));

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, pair) in observations.windows(2).enumerate() {
        let change = pair[1].close - pair[0].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i < period - 1 {
            avg_gain += gain;
            avg_loss += loss;
            values.push(invalid(&pair[1]));
            continue;
        }

        if i == period - 1 {
            avg_gain = (avg_gain + gain) / period as f64;
            avg_loss = (avg_loss + loss) / period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }

        values.push(IndicatorPoint {
            timestamp: pair[1].timestamp,
            valid: true,
            value: IndicatorValue::Simple(rsi_from_averages(avg_gain, avg_loss)),
        });
    }

    IndicatorSeries { values }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
