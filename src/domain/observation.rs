//! Price observations and the per-symbol rolling series.

use chrono::NaiveDateTime;

use super::error::ConfluenceError;

/// One OHLCV observation. Immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PriceObservation {
    /// Reject non-finite or negative prices and a non-positive close.
    pub fn validate(&self) -> Result<(), ConfluenceError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfluenceError::invalid_input(format!(
                    "{field} must be a finite non-negative price, got {value}"
                )));
            }
        }
        if self.close <= 0.0 {
            return Err(ConfluenceError::invalid_input("close must be positive"));
        }
        if self.volume < 0 {
            return Err(ConfluenceError::invalid_input("volume must be non-negative"));
        }
        Ok(())
    }
}

/// Append-only, bounded window of observations for one symbol.
///
/// Timestamps are strictly increasing. Once `capacity` is exceeded the
/// oldest observations are dropped.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    capacity: usize,
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        PriceSeries {
            symbol: symbol.into(),
            capacity,
            observations: Vec::with_capacity(capacity),
        }
    }

    /// Build a series from observations already in order, for tests and bootstrapping.
    pub fn from_observations(
        symbol: impl Into<String>,
        capacity: usize,
        observations: Vec<PriceObservation>,
    ) -> Result<Self, ConfluenceError> {
        let mut series = PriceSeries::new(symbol, capacity);
        for obs in observations {
            series.push(obs)?;
        }
        Ok(series)
    }

    pub fn push(&mut self, observation: PriceObservation) -> Result<(), ConfluenceError> {
        observation.validate()?;
        if let Some(last) = self.observations.last() {
            if observation.timestamp <= last.timestamp {
                return Err(ConfluenceError::OutOfOrderObservation {
                    symbol: self.symbol.clone(),
                    timestamp: observation.timestamp,
                    last: last.timestamp,
                });
            }
        }
        self.observations.push(observation);
        if self.observations.len() > self.capacity {
            let excess = self.observations.len() - self.capacity;
            self.observations.drain(..excess);
        }
        Ok(())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceObservation> {
        self.observations.last()
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    /// The most recent `n` observations, or `InsufficientHistory` naming `strategy`.
    pub fn tail(&self, n: usize, strategy: &str) -> Result<&[PriceObservation], ConfluenceError> {
        if self.observations.len() < n {
            return Err(ConfluenceError::InsufficientHistory {
                strategy: strategy.to_string(),
                have: self.observations.len(),
                need: n,
            });
        }
        Ok(&self.observations[self.observations.len() - n..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap()
    }

    fn obs(day: u32, close: f64) -> PriceObservation {
        PriceObservation {
            timestamp: ts(day),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn push_in_order() {
        let mut series = PriceSeries::new("BHP", 10);
        series.push(obs(1, 100.0)).unwrap();
        series.push(obs(2, 101.0)).unwrap();
        assert_eq!(series.len(), 2);
        assert!((series.latest().unwrap().close - 101.0).abs() < f64::EPSILON);
    }

    #[test]
    fn duplicate_timestamp_rejected() {
        let mut series = PriceSeries::new("BHP", 10);
        series.push(obs(2, 100.0)).unwrap();
        let err = series.push(obs(2, 101.0)).unwrap_err();
        assert!(matches!(err, ConfluenceError::OutOfOrderObservation { .. }));
        assert_eq!(series.len(), 1);
        assert!((series.latest().unwrap().close - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn earlier_timestamp_rejected() {
        let mut series = PriceSeries::new("BHP", 10);
        series.push(obs(5, 100.0)).unwrap();
        assert!(series.push(obs(4, 99.0)).is_err());
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn bounded_to_capacity() {
        let mut series = PriceSeries::new("BHP", 3);
        for day in 1..=5 {
            series.push(obs(day, 100.0 + day as f64)).unwrap();
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series.observations()[0].timestamp, ts(3));
        assert_eq!(series.latest().unwrap().timestamp, ts(5));
    }

    #[test]
    fn tail_insufficient() {
        let series = PriceSeries::from_observations("BHP", 10, vec![obs(1, 100.0)]).unwrap();
        match series.tail(5, "SMA") {
            Err(ConfluenceError::InsufficientHistory { have, need, .. }) => {
                assert_eq!(have, 1);
                assert_eq!(need, 5);
            }
            other => panic!("expected InsufficientHistory, got {other:?}"),
        }
    }

    #[test]
    fn tail_returns_most_recent() {
        let series = PriceSeries::from_observations(
            "BHP",
            10,
            (1..=4).map(|d| obs(d, 100.0 + d as f64)).collect(),
        )
        .unwrap();
        let tail = series.tail(2, "SMA").unwrap();
        assert_eq!(tail.len(), 2);
        assert!((tail[0].close - 103.0).abs() < f64::EPSILON);
        assert!((tail[1].close - 104.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_price_rejected() {
        let mut bad = obs(1, 100.0);
        bad.low = -1.0;
        let mut series = PriceSeries::new("BHP", 10);
        assert!(matches!(
            series.push(bad),
            Err(ConfluenceError::InvalidInput { .. })
        ));
        assert!(series.is_empty());
    }

    #[test]
    fn non_finite_close_rejected() {
        let mut bad = obs(1, 100.0);
        bad.close = f64::NAN;
        assert!(bad.validate().is_err());
    }
}
