//! Signal fusion: majority vote plus confidence filtering.
//!
//! Hold signals abstain. The winning direction's confidence is
//! `agreeing / total × mean strength of agreeing`, and anything under the
//! threshold is downgraded to Hold.

use chrono::NaiveDateTime;

use crate::domain::signal::{CompositeSignal, Direction, Signal, clamp_score};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FusionConfig {
    pub confidence_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        FusionConfig {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignalFusion {
    config: FusionConfig,
}

impl SignalFusion {
    pub fn new(config: FusionConfig) -> Self {
        SignalFusion { config }
    }

    pub fn threshold(&self) -> f64 {
        self.config.confidence_threshold
    }

    pub fn fuse(
        &self,
        symbol: &str,
        timestamp: NaiveDateTime,
        signals: Vec<Signal>,
    ) -> CompositeSignal {
        let total = signals.len();
        let buys: Vec<&Signal> = signals
            .iter()
            .filter(|s| s.direction == Direction::Buy)
            .collect();
        let sells: Vec<&Signal> = signals
            .iter()
            .filter(|s| s.direction == Direction::Sell)
            .collect();

        let (winner, agreeing) = match buys.len().cmp(&sells.len()) {
            std::cmp::Ordering::Greater => (Direction::Buy, buys),
            std::cmp::Ordering::Less => (Direction::Sell, sells),
            std::cmp::Ordering::Equal => (Direction::Hold, Vec::new()),
        };

        let confidence = if agreeing.is_empty() || total == 0 {
            0.0
        } else {
            let mean_strength =
                agreeing.iter().map(|s| s.strength).sum::<f64>() / agreeing.len() as f64;
            clamp_score(agreeing.len() as f64 / total as f64 * mean_strength)
        };

        let direction = if confidence < self.config.confidence_threshold {
            Direction::Hold
        } else {
            winner
        };

        tracing::debug!(
            symbol,
            vote = %winner,
            %direction,
            confidence,
            "fused {} signals",
            total
        );

        CompositeSignal::new(symbol.to_string(), direction, confidence, signals, timestamp)
    }
}
