//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Warmup: slow - 1 + signal - 1 observations.

use crate::domain::indicator::ema::ema_of;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorValue};
use crate::domain::observation::PriceObservation;

pub fn calculate_macd(
    observations: &[PriceObservation],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    if observations.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries { values: Vec::new() };
    }

    let closes: Vec<f64> = observations.iter().map(|o| o.close).collect();
    let ema_fast = ema_of(&closes, fast);
    let ema_slow = ema_of(&closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let macd_warmup = fast.max(slow) - 1;
    let mut signal_line = vec![0.0; observations.len()];
    if macd_warmup < observations.len() {
        let seeded = ema_of(&macd_line[macd_warmup..], signal_period);
        signal_line[macd_warmup..].copy_from_slice(&seeded);
    }

    let signal_warmup = macd_warmup + signal_period - 1;

    let values = observations
        .iter()
        .enumerate()
        .map(|(i, obs)| {
            let line = macd_line[i];
            let signal = signal_line[i];
            IndicatorPoint {
                timestamp: obs.timestamp,
                valid: i >= signal_warmup,
                value: IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                },
            }
        })
        .collect();

    IndicatorSeries { values }
}
