//! Per-symbol position state and the closed-trade record.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SignalReversal,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop-loss"),
            ExitReason::TakeProfit => write!(f, "take-profit"),
            ExitReason::SignalReversal => write!(f, "signal reversal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub side: Side,
    pub entry_price: f64,
    pub quantity: u64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub opened_at: NaiveDateTime,
}

impl OpenPosition {
    pub fn is_long(&self) -> bool {
        self.side == Side::Long
    }

    /// Cash committed at entry.
    pub fn notional(&self) -> f64 {
        self.quantity as f64 * self.entry_price
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        let diff = self.quantity as f64 * (price - self.entry_price);
        match self.side {
            Side::Long => diff,
            Side::Short => -diff,
        }
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        if self.is_long() {
            price <= self.stop_loss
        } else {
            price >= self.stop_loss
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        if self.is_long() {
            price >= self.take_profit
        } else {
            price <= self.take_profit
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Open(OpenPosition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub state: PositionState,
    pub realized_pnl: f64,
}

impl Position {
    pub fn flat(symbol: impl Into<String>) -> Self {
        Position {
            symbol: symbol.into(),
            state: PositionState::Flat,
            realized_pnl: 0.0,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PositionState::Open(_))
    }

    pub fn open(&self) -> Option<&OpenPosition> {
        match &self.state {
            PositionState::Open(open) => Some(open),
            PositionState::Flat => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub symbol: String,
    pub side: Side,
    pub quantity: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub opened_at: NaiveDateTime,
    pub closed_at: NaiveDateTime,
    pub pnl: f64,
    pub reason: ExitReason,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn opened_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn sample_long() -> OpenPosition {
        OpenPosition {
            side: Side::Long,
            entry_price: 50.0,
            quantity: 100,
            stop_loss: 45.0,
            take_profit: 60.0,
            opened_at: opened_at(),
        }
    }

    fn sample_short() -> OpenPosition {
        OpenPosition {
            side: Side::Short,
            entry_price: 100.0,
            quantity: 100,
            stop_loss: 110.0,
            take_profit: 80.0,
            opened_at: opened_at(),
        }
    }

    #[test]
    fn notional_and_market_value() {
        let pos = sample_long();
        assert!((pos.notional() - 5000.0).abs() < f64::EPSILON);
        assert!((pos.market_value(55.0) - 5500.0).abs() < f64::EPSILON);
        assert!((sample_short().market_value(95.0) - 9500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pnl_long() {
        let pos = sample_long();
        assert!((pos.unrealized_pnl(55.0) - 500.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_pnl(45.0) - (-500.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pnl_short() {
        let pos = sample_short();
        assert!((pos.unrealized_pnl(90.0) - 1000.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_pnl(110.0) - (-1000.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn stop_loss_long_triggered() {
        let pos = sample_long();
        assert!(pos.should_stop_loss(44.0));
        assert!(pos.should_stop_loss(45.0));
        assert!(!pos.should_stop_loss(46.0));
    }

    #[test]
    fn stop_loss_short_triggered() {
        let pos = sample_short();
        assert!(pos.should_stop_loss(111.0));
        assert!(pos.should_stop_loss(110.0));
        assert!(!pos.should_stop_loss(109.0));
    }

    #[test]
    fn take_profit_long_triggered() {
        let pos = sample_long();
        assert!(pos.should_take_profit(61.0));
        assert!(pos.should_take_profit(60.0));
        assert!(!pos.should_take_profit(59.0));
    }

    #[test]
    fn take_profit_short_triggered() {
        let pos = sample_short();
        assert!(pos.should_take_profit(79.0));
        assert!(pos.should_take_profit(80.0));
        assert!(!pos.should_take_profit(81.0));
    }

    #[test]
    fn flat_position_has_no_open_leg() {
        let pos = Position::flat("BHP");
        assert!(!pos.is_open());
        assert!(pos.open().is_none());
        assert_eq!(pos.realized_pnl, 0.0);
    }

    #[test]
    fn open_position_accessor() {
        let pos = Position {
            symbol: "BHP".into(),
            state: PositionState::Open(sample_long()),
            realized_pnl: 0.0,
        };
        assert!(pos.is_open());
        assert_eq!(pos.open().map(|o| o.quantity), Some(100));
    }

    #[test]
    fn display_labels() {
        assert_eq!(Side::Short.to_string(), "SHORT");
        assert_eq!(ExitReason::TakeProfit.to_string(), "take-profit");
    }
}
