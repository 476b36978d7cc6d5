#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use confluence::domain::config::EngineConfig;
use confluence::domain::fusion::{FusionConfig, SignalFusion};
use confluence::domain::observation::{PriceObservation, PriceSeries};
use confluence::domain::position::Side;
use confluence::domain::risk::EntryOrder;
use confluence::domain::signal::{CompositeSignal, Direction, Signal};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 16:00 on the given day after 2024-01-01.
pub fn at_day(day: i64) -> NaiveDateTime {
    date(2024, 1, 1).and_hms_opt(16, 0, 0).unwrap() + Duration::days(day)
}

pub fn make_observation(timestamp: NaiveDateTime, close: f64) -> PriceObservation {
    PriceObservation {
        timestamp,
        open: close,
        high: close,
        low: close,
        close,
        volume: 1000,
    }
}

/// One observation per day starting 2024-01-01.
pub fn daily_observations(closes: &[f64]) -> Vec<PriceObservation> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_observation(at_day(i as i64), close))
        .collect()
}

/// `count` closes rising evenly from `from` to `to`.
pub fn rising_closes(count: usize, from: f64, to: f64) -> Vec<f64> {
    let step = (to - from) / (count - 1) as f64;
    (0..count).map(|i| from + i as f64 * step).collect()
}

pub fn make_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::from_observations(symbol, closes.len().max(1), daily_observations(closes)).unwrap()
}

/// A composite with exactly `confidence`: four agreeing signals of that
/// strength, fused with no threshold.
pub fn composite(symbol: &str, direction: Direction, confidence: f64) -> CompositeSignal {
    let fusion = SignalFusion::new(FusionConfig {
        confidence_threshold: 0.0,
    });
    let signals = (0..4)
        .map(|i| Signal::new(format!("S{i}"), direction, confidence, "test"))
        .collect();
    fusion.fuse(symbol, at_day(0), signals)
}

pub fn long_order(symbol: &str, quantity: u64, price: f64) -> EntryOrder {
    EntryOrder {
        symbol: symbol.to_string(),
        side: Side::Long,
        quantity,
        entry_price: price,
        stop_loss: price * 0.95,
        take_profit: price * 1.15,
    }
}

/// Default configuration with fusion filtering disabled.
pub fn permissive_config() -> EngineConfig {
    EngineConfig {
        fusion: FusionConfig {
            confidence_threshold: 0.0,
        },
        ..EngineConfig::default()
    }
}
