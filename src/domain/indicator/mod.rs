//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorSeries`: A time series of indicator values
//!
//! Every calculation is a pure function of a slice of observations; points
//! inside the warmup window are marked `valid: false`.

pub mod bollinger;
pub(crate) mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::calculate_bollinger;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::population_stddev;

use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Latest point, if it is past warmup.
    pub fn last_valid(&self) -> Option<&IndicatorPoint> {
        self.values.last().filter(|p| p.valid)
    }

    /// The two most recent points as (previous, latest), both past warmup.
    pub fn last_two_valid(&self) -> Option<(&IndicatorPoint, &IndicatorPoint)> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        let (prev, latest) = (&self.values[n - 2], &self.values[n - 1]);
        (prev.valid && latest.valid).then_some((prev, latest))
    }
}

impl IndicatorValue {
    /// The scalar value, or `None` for multi-line indicators.
    pub fn simple(&self) -> Option<f64> {
        match self {
            IndicatorValue::Simple(v) => Some(*v),
            _ => None,
        }
    }
}
