//! Portfolio state and valuation.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::position::Position;

/// Cash, positions and daily-loss accounting for one session.
///
/// `daily_realized_loss` is never positive; it collects realized losses
/// since `last_reset`.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub initial_capital: f64,
    pub cash: f64,
    pub positions: HashMap<String, Position>,
    pub daily_realized_loss: f64,
    pub last_reset: Option<NaiveDate>,
}

impl PortfolioState {
    pub fn new(initial_capital: f64) -> Self {
        PortfolioState {
            initial_capital,
            cash: initial_capital,
            positions: HashMap::new(),
            daily_realized_loss: 0.0,
            last_reset: None,
        }
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn open_count(&self) -> usize {
        self.positions.values().filter(|p| p.is_open()).count()
    }

    /// Sum of quantity × entry price over open positions.
    pub fn open_notional(&self) -> f64 {
        self.positions
            .values()
            .filter_map(Position::open)
            .map(|open| open.notional())
            .sum()
    }

    pub fn realized_pnl(&self) -> f64 {
        self.positions.values().map(|p| p.realized_pnl).sum()
    }

    /// Value the portfolio at the given prices. Symbols missing from
    /// `price_map` are marked at their entry price.
    pub fn summary(&self, price_map: &HashMap<String, f64>) -> PortfolioSummary {
        let mut invested = 0.0;
        let mut market_value = 0.0;
        let mut unrealized_pnl = 0.0;

        for position in self.positions.values() {
            let Some(open) = position.open() else {
                continue;
            };
            let price = price_map
                .get(&position.symbol)
                .copied()
                .unwrap_or(open.entry_price);
            let pnl = open.unrealized_pnl(price);
            invested += open.notional();
            unrealized_pnl += pnl;
            // shorts hold their escrow plus whatever they have made on it
            market_value += open.notional() + pnl;
        }

        PortfolioSummary {
            cash: self.cash,
            invested,
            market_value,
            unrealized_pnl,
            total_value: self.cash + market_value,
            open_positions: self.open_count(),
            daily_realized_loss: self.daily_realized_loss,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub cash: f64,
    pub invested: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub total_value: f64,
    pub open_positions: usize,
    pub daily_realized_loss: f64,
}
