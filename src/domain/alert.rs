//! Decides which composite signals are worth surfacing to a notifier.

use std::collections::HashMap;

use crate::domain::signal::{CompositeSignal, Direction};

/// Confidence move, in points, that is worth a fresh alert.
pub const CONFIDENCE_MOVE: f64 = 20.0;

/// Remembers the last alerted signal per symbol. A signal alerts on first
/// sight, on a direction change, or when confidence moved by at least
/// [`CONFIDENCE_MOVE`] since the last alert.
#[derive(Debug, Default)]
pub struct AlertFilter {
    last: HashMap<String, (Direction, f64)>,
}

impl AlertFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_alert(&mut self, composite: &CompositeSignal) -> bool {
        let current = (composite.direction(), composite.confidence());
        let fire = match self.last.get(composite.symbol()) {
            None => true,
            Some(&(direction, confidence)) => {
                direction != current.0 || (confidence - current.1).abs() >= CONFIDENCE_MOVE
            }
        };
        if fire {
            self.last.insert(composite.symbol().to_string(), current);
        }
        fire
    }
}
