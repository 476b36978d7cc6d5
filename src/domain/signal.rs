//! Strategy signals and the fused composite signal.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
            Direction::Hold => Direction::Hold,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
            Direction::Hold => write!(f, "HOLD"),
        }
    }
}

/// One strategy's opinion. Strength is always within [0, 100].
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub strategy: String,
    pub direction: Direction,
    pub strength: f64,
    pub reason: String,
}

impl Signal {
    pub fn new(
        strategy: impl Into<String>,
        direction: Direction,
        strength: f64,
        reason: impl Into<String>,
    ) -> Self {
        Signal {
            strategy: strategy.into(),
            direction,
            strength: clamp_score(strength),
            reason: reason.into(),
        }
    }

    /// Placeholder for a strategy that could not vote this cycle.
    pub fn abstain(strategy: impl Into<String>, reason: impl Into<String>) -> Self {
        Signal::new(strategy, Direction::Hold, 0.0, reason)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

impl VoteTally {
    pub fn count(signals: &[Signal]) -> Self {
        signals
            .iter()
            .fold(VoteTally::default(), |mut tally, s| {
                match s.direction {
                    Direction::Buy => tally.buy += 1,
                    Direction::Sell => tally.sell += 1,
                    Direction::Hold => tally.hold += 1,
                }
                tally
            })
    }

    pub fn total(&self) -> usize {
        self.buy + self.sell + self.hold
    }
}

/// Fused opinion across all strategies.
///
/// Fields are private so confidence can only come out of fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSignal {
    symbol: String,
    direction: Direction,
    confidence: f64,
    signals: Vec<Signal>,
    votes: VoteTally,
    timestamp: NaiveDateTime,
}

impl CompositeSignal {
    pub(crate) fn new(
        symbol: String,
        direction: Direction,
        confidence: f64,
        signals: Vec<Signal>,
        timestamp: NaiveDateTime,
    ) -> Self {
        let votes = VoteTally::count(&signals);
        CompositeSignal {
            symbol,
            direction,
            confidence,
            signals,
            votes,
            timestamp,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn votes(&self) -> VoteTally {
        self.votes
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// Clamp a score into [0, 100], mapping NaN to 0.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
