//! Risk management: turns a composite signal into a trading decision.
//!
//! Open positions are checked for exits first (stop-loss, take-profit, then
//! signal reversal). Flat symbols may be entered when confidence clears the
//! threshold, the daily loss limit is intact and the leverage ceiling leaves
//! room. Position size scales with confidence:
//!
//! ```text
//! factor   = factor_min + (factor_max - factor_min) * confidence / 100
//! quantity = floor(cash * risk_per_trade * factor / (price * stop_loss_fraction))
//! ```
//!
//! capped to the whole shares the leverage headroom can pay for.

use crate::domain::error::ConfluenceError;
use crate::domain::fusion::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::domain::ledger::PositionLedger;
use crate::domain::position::{ExitReason, Side};
use crate::domain::signal::{CompositeSignal, Direction};

#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    pub risk_per_trade_fraction: f64,
    pub stop_loss_fraction: f64,
    pub take_profit_fraction: f64,
    pub daily_loss_limit_fraction: f64,
    pub leverage_ceiling: f64,
    pub confidence_factor_min: f64,
    pub confidence_factor_max: f64,
    pub allow_shorting: bool,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            risk_per_trade_fraction: 0.02,
            stop_loss_fraction: 0.05,
            take_profit_fraction: 0.15,
            daily_loss_limit_fraction: 0.05,
            leverage_ceiling: 1.0,
            confidence_factor_min: 0.5,
            confidence_factor_max: 1.0,
            allow_shorting: false,
        }
    }
}

/// A fully sized entry, ready for the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryOrder {
    pub symbol: String,
    pub side: Side,
    pub quantity: u64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Enter(EntryOrder),
    Exit {
        symbol: String,
        reason: ExitReason,
        exit_price: f64,
    },
    Hold,
}

impl Decision {
    pub fn is_hold(&self) -> bool {
        matches!(self, Decision::Hold)
    }
}

#[derive(Debug, Clone)]
pub struct RiskManager {
    config: RiskConfig,
    confidence_threshold: f64,
}

impl RiskManager {
    pub fn new(config: RiskConfig, confidence_threshold: f64) -> Self {
        RiskManager {
            config,
            confidence_threshold,
        }
    }

    pub fn with_defaults() -> Self {
        RiskManager::new(RiskConfig::default(), DEFAULT_CONFIDENCE_THRESHOLD)
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Position size multiplier for a confidence in [0, 100].
    pub fn confidence_factor(&self, confidence: f64) -> f64 {
        let RiskConfig {
            confidence_factor_min: min,
            confidence_factor_max: max,
            ..
        } = self.config;
        min + (max - min) * confidence / 100.0
    }

    /// Realized losses today have reached the configured share of capital.
    pub fn daily_loss_breached(&self, ledger: &PositionLedger) -> bool {
        let portfolio = ledger.portfolio();
        let limit = self.config.daily_loss_limit_fraction * portfolio.initial_capital;
        portfolio.daily_realized_loss.abs() >= limit
    }

    pub fn evaluate(
        &self,
        composite: &CompositeSignal,
        price: f64,
        ledger: &PositionLedger,
    ) -> Result<Decision, ConfluenceError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(ConfluenceError::invalid_input(format!(
                "price for {} must be finite and positive, got {price}",
                composite.symbol()
            )));
        }
        let confidence = composite.confidence();
        if !confidence.is_finite() || !(0.0..=100.0).contains(&confidence) {
            return Err(ConfluenceError::invalid_input(format!(
                "confidence for {} must be within [0, 100], got {confidence}",
                composite.symbol()
            )));
        }

        if let Some(open) = ledger.open_position(composite.symbol()) {
            let reason = if open.should_stop_loss(price) {
                Some(ExitReason::StopLoss)
            } else if open.should_take_profit(price) {
                Some(ExitReason::TakeProfit)
            } else if self.is_reversal(open.side, composite) {
                Some(ExitReason::SignalReversal)
            } else {
                None
            };
            return Ok(match reason {
                Some(reason) => Decision::Exit {
                    symbol: composite.symbol().to_string(),
                    reason,
                    exit_price: price,
                },
                None => Decision::Hold,
            });
        }

        self.evaluate_entry(composite, price, ledger)
    }

    fn is_reversal(&self, side: Side, composite: &CompositeSignal) -> bool {
        let against = match side {
            Side::Long => Direction::Sell,
            Side::Short => Direction::Buy,
        };
        composite.direction() == against && composite.confidence() >= self.confidence_threshold
    }

    fn evaluate_entry(
        &self,
        composite: &CompositeSignal,
        price: f64,
        ledger: &PositionLedger,
    ) -> Result<Decision, ConfluenceError> {
        let symbol = composite.symbol();
        let confidence = composite.confidence();
        if confidence < self.confidence_threshold {
            return Ok(Decision::Hold);
        }
        let side = match composite.direction() {
            Direction::Buy => Side::Long,
            Direction::Sell if self.config.allow_shorting => Side::Short,
            Direction::Sell | Direction::Hold => return Ok(Decision::Hold),
        };
        if self.daily_loss_breached(ledger) {
            tracing::warn!(
                symbol,
                daily_loss = ledger.portfolio().daily_realized_loss,
                "daily loss limit reached, entry blocked"
            );
            return Ok(Decision::Hold);
        }

        let quantity = self.size(symbol, confidence, price, ledger);
        if quantity == 0 {
            tracing::debug!(symbol, price, confidence, "sized to zero shares");
            return Ok(Decision::Hold);
        }

        let (stop_loss, take_profit) = match side {
            Side::Long => (
                price * (1.0 - self.config.stop_loss_fraction),
                price * (1.0 + self.config.take_profit_fraction),
            ),
            Side::Short => (
                price * (1.0 + self.config.stop_loss_fraction),
                price * (1.0 - self.config.take_profit_fraction),
            ),
        };

        Ok(Decision::Enter(EntryOrder {
            symbol: symbol.to_string(),
            side,
            quantity,
            entry_price: price,
            stop_loss,
            take_profit,
        }))
    }

    fn size(&self, symbol: &str, confidence: f64, price: f64, ledger: &PositionLedger) -> u64 {
        let portfolio = ledger.portfolio();
        let per_share_risk = price * self.config.stop_loss_fraction;
        if per_share_risk <= 0.0 {
            return 0;
        }
        let risk_capital = portfolio.cash
            * self.config.risk_per_trade_fraction
            * self.confidence_factor(confidence);
        let by_risk = whole_shares(risk_capital / per_share_risk);

        let open_notional = portfolio.open_notional();
        let headroom =
            self.config.leverage_ceiling * (portfolio.cash + open_notional) - open_notional;
        let by_leverage = whole_shares(headroom / price);

        tracing::debug!(
            symbol,
            risk_capital,
            headroom,
            by_risk,
            by_leverage,
            "position sizing"
        );
        by_risk.min(by_leverage)
    }
}

fn whole_shares(value: f64) -> u64 {
    if value.is_finite() && value >= 1.0 {
        value.floor() as u64
    } else {
        0
    }
}
