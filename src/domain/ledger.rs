//! Position ledger: the Flat/Open state machine over a [`PortfolioState`].
//!
//! Entries debit cash by the entry notional (shorts escrow the same amount).
//! Exits credit the position's value back, book the realized P&L and log
//! a [`ClosedTrade`]. Illegal transitions fail with `InvalidTransition` and
//! leave the state untouched.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::VecDeque;

use crate::domain::error::ConfluenceError;
use crate::domain::portfolio::PortfolioState;
use crate::domain::position::{ClosedTrade, ExitReason, OpenPosition, Position, PositionState, Side};
use crate::domain::risk::{Decision, EntryOrder};

/// Closed trades kept in the in-memory log; older ones are dropped.
pub const TRADE_LOG_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionLedger {
    state: PortfolioState,
    recent_trades: VecDeque<ClosedTrade>,
}

impl PositionLedger {
    pub fn new(initial_capital: f64) -> Self {
        Self::from_state(PortfolioState::new(initial_capital))
    }

    /// Resume from a snapshot. The trade log starts empty.
    pub fn from_state(state: PortfolioState) -> Self {
        PositionLedger {
            state,
            recent_trades: VecDeque::new(),
        }
    }

    pub fn portfolio(&self) -> &PortfolioState {
        &self.state
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> PortfolioState {
        self.state.clone()
    }

    /// Most recent closed trades, oldest first.
    pub fn recent_trades(&self) -> &VecDeque<ClosedTrade> {
        &self.recent_trades
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.state.position(symbol)
    }

    pub fn open_position(&self, symbol: &str) -> Option<&OpenPosition> {
        self.state.position(symbol).and_then(Position::open)
    }

    /// Start a new trading day. Returns whether the daily loss was reset.
    pub fn roll_day(&mut self, date: NaiveDate) -> bool {
        if self.state.last_reset.is_some_and(|last| date <= last) {
            return false;
        }
        tracing::debug!(%date, previous = self.state.daily_realized_loss, "daily loss reset");
        self.state.daily_realized_loss = 0.0;
        self.state.last_reset = Some(date);
        true
    }

    pub fn apply(&mut self, decision: &Decision, at: NaiveDateTime) -> Result<(), ConfluenceError> {
        match decision {
            Decision::Enter(order) => self.enter(order, at),
            Decision::Exit {
                symbol,
                reason,
                exit_price,
            } => self.exit(symbol, *exit_price, *reason, at).map(|_| ()),
            Decision::Hold => Ok(()),
        }
    }

    pub fn enter(&mut self, order: &EntryOrder, at: NaiveDateTime) -> Result<(), ConfluenceError> {
        if order.quantity == 0 {
            return Err(ConfluenceError::invalid_input(format!(
                "entry for {} has zero quantity",
                order.symbol
            )));
        }
        if !order.entry_price.is_finite() || order.entry_price <= 0.0 {
            return Err(ConfluenceError::invalid_input(format!(
                "entry price for {} must be finite and positive, got {}",
                order.symbol, order.entry_price
            )));
        }
        if self.open_position(&order.symbol).is_some() {
            return Err(ConfluenceError::InvalidTransition {
                symbol: order.symbol.clone(),
                reason: "position already open".to_string(),
            });
        }

        let open = OpenPosition {
            side: order.side,
            entry_price: order.entry_price,
            quantity: order.quantity,
            stop_loss: order.stop_loss,
            take_profit: order.take_profit,
            opened_at: at,
        };
        self.state.cash -= open.notional();

        tracing::info!(
            symbol = %order.symbol,
            side = %order.side,
            quantity = order.quantity,
            price = order.entry_price,
            stop = order.stop_loss,
            target = order.take_profit,
            cash = self.state.cash,
            "position opened"
        );

        self.state
            .positions
            .entry(order.symbol.clone())
            .or_insert_with(|| Position::flat(order.symbol.clone()))
            .state = PositionState::Open(open);
        Ok(())
    }

    pub fn exit(
        &mut self,
        symbol: &str,
        exit_price: f64,
        reason: ExitReason,
        at: NaiveDateTime,
    ) -> Result<ClosedTrade, ConfluenceError> {
        if !exit_price.is_finite() || exit_price <= 0.0 {
            return Err(ConfluenceError::invalid_input(format!(
                "exit price for {symbol} must be finite and positive, got {exit_price}"
            )));
        }
        let Some(position) = self.state.positions.get_mut(symbol) else {
            return Err(flat_exit(symbol));
        };
        let PositionState::Open(open) = std::mem::take(&mut position.state) else {
            return Err(flat_exit(symbol));
        };

        let pnl = open.unrealized_pnl(exit_price);
        let proceeds = match open.side {
            Side::Long => open.market_value(exit_price),
            Side::Short => open.notional() + pnl,
        };
        position.realized_pnl += pnl;
        self.state.cash += proceeds;
        if pnl < 0.0 {
            self.state.daily_realized_loss += pnl;
        }

        let trade = ClosedTrade {
            symbol: symbol.to_string(),
            side: open.side,
            quantity: open.quantity,
            entry_price: open.entry_price,
            exit_price,
            opened_at: open.opened_at,
            closed_at: at,
            pnl,
            reason,
        };

        tracing::info!(
            symbol,
            side = %open.side,
            quantity = open.quantity,
            price = exit_price,
            pnl,
            %reason,
            cash = self.state.cash,
            "position closed"
        );

        if self.recent_trades.len() == TRADE_LOG_CAPACITY {
            self.recent_trades.pop_front();
        }
        self.recent_trades.push_back(trade.clone());
        Ok(trade)
    }
}

fn flat_exit(symbol: &str) -> ConfluenceError {
    ConfluenceError::InvalidTransition {
        symbol: symbol.to_string(),
        reason: "no open position to exit".to_string(),
    }
}
