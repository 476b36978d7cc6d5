//! Trading engine: owns the price series, strategies, fusion, risk manager
//! and ledger, and runs one decision cycle per symbol on request.
//!
//! Each symbol's series sits behind its own mutex inside a read-write map,
//! so ingest and evaluation for different symbols do not contend. The ledger
//! has a single mutex and is only held for the risk check and the ledger
//! update at the end of a cycle.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use crate::domain::config::EngineConfig;
use crate::domain::error::ConfluenceError;
use crate::domain::fusion::SignalFusion;
use crate::domain::ledger::PositionLedger;
use crate::domain::observation::{PriceObservation, PriceSeries};
use crate::domain::portfolio::{PortfolioState, PortfolioSummary};
use crate::domain::risk::{Decision, RiskManager};
use crate::domain::signal::CompositeSignal;
use crate::domain::strategy::StrategySet;

/// Outcome of one cycle. `composite` is `None` when the symbol was skipped
/// because nothing new had arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub composite: Option<CompositeSignal>,
    pub decision: Decision,
}

impl CycleReport {
    fn skipped() -> Self {
        CycleReport {
            composite: None,
            decision: Decision::Hold,
        }
    }
}

#[derive(Debug)]
struct SymbolFeed {
    series: PriceSeries,
    fresh: bool,
}

#[derive(Debug)]
pub struct TradingEngine {
    strategies: StrategySet,
    fusion: SignalFusion,
    risk: RiskManager,
    capacity: usize,
    feeds: RwLock<HashMap<String, Mutex<SymbolFeed>>>,
    ledger: Mutex<PositionLedger>,
}

fn poisoned(what: &str) -> ConfluenceError {
    ConfluenceError::StatePoisoned {
        what: what.to_string(),
    }
}

impl TradingEngine {
    pub fn new(config: EngineConfig) -> Self {
        let ledger = PositionLedger::new(config.initial_capital);
        Self::with_ledger(config, ledger)
    }

    /// Resume from a saved portfolio. Price history starts empty.
    pub fn from_snapshot(config: EngineConfig, snapshot: PortfolioState) -> Self {
        Self::with_ledger(config, PositionLedger::from_state(snapshot))
    }

    fn with_ledger(config: EngineConfig, ledger: PositionLedger) -> Self {
        let strategies = StrategySet::from_config(&config.strategies);
        let capacity = strategies.max_lookback();
        TradingEngine {
            strategies,
            fusion: SignalFusion::new(config.fusion.clone()),
            risk: RiskManager::new(config.risk, config.fusion.confidence_threshold),
            capacity,
            feeds: RwLock::new(HashMap::new()),
            ledger: Mutex::new(ledger),
        }
    }

    /// Observations kept per symbol.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn symbols(&self) -> Result<Vec<String>, ConfluenceError> {
        let feeds = self.feeds.read().map_err(|_| poisoned("price series map"))?;
        let mut symbols: Vec<String> = feeds.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    /// Append an observation to `symbol`'s series.
    pub fn ingest(
        &self,
        symbol: &str,
        observation: PriceObservation,
    ) -> Result<(), ConfluenceError> {
        {
            let feeds = self.feeds.read().map_err(|_| poisoned("price series map"))?;
            if let Some(feed) = feeds.get(symbol) {
                let mut feed = feed.lock().map_err(|_| poisoned(symbol))?;
                return push(&mut feed, symbol, observation);
            }
        }

        let mut feeds = self.feeds.write().map_err(|_| poisoned("price series map"))?;
        let feed = feeds.entry(symbol.to_string()).or_insert_with(|| {
            Mutex::new(SymbolFeed {
                series: PriceSeries::new(symbol, self.capacity),
                fresh: false,
            })
        });
        let feed = feed.get_mut().map_err(|_| poisoned(symbol))?;
        push(feed, symbol, observation)
    }

    pub fn run_cycle(&self, symbol: &str) -> Result<Decision, ConfluenceError> {
        self.run_cycle_report(symbol).map(|report| report.decision)
    }

    /// Evaluate, fuse, size and apply for one symbol. A failed cycle leaves
    /// the latest observation pending for the next call.
    pub fn run_cycle_report(&self, symbol: &str) -> Result<CycleReport, ConfluenceError> {
        let Some(series) = self.take_fresh(symbol)? else {
            tracing::trace!(symbol, "no new observation, skipping");
            return Ok(CycleReport::skipped());
        };

        let report = self.evaluate_series(symbol, &series);
        if report.is_err() {
            self.restore_fresh(symbol);
        }
        report
    }

    fn evaluate_series(
        &self,
        symbol: &str,
        series: &PriceSeries,
    ) -> Result<CycleReport, ConfluenceError> {
        let Some(latest) = series.latest().cloned() else {
            return Ok(CycleReport::skipped());
        };

        let signals = self.strategies.evaluate_all(series)?;
        for signal in &signals {
            tracing::debug!(
                symbol,
                strategy = %signal.strategy,
                direction = %signal.direction,
                strength = signal.strength,
                reason = %signal.reason,
                "strategy signal"
            );
        }
        let composite = self.fusion.fuse(symbol, latest.timestamp, signals);

        let decision = {
            let mut ledger = self.ledger.lock().map_err(|_| poisoned("position ledger"))?;
            ledger.roll_day(latest.timestamp.date());
            let decision = self.risk.evaluate(&composite, latest.close, &ledger)?;
            ledger.apply(&decision, latest.timestamp)?;
            decision
        };

        Ok(CycleReport {
            composite: Some(composite),
            decision,
        })
    }

    /// Copy of the series if it has news since the last cycle.
    fn take_fresh(&self, symbol: &str) -> Result<Option<PriceSeries>, ConfluenceError> {
        let feeds = self.feeds.read().map_err(|_| poisoned("price series map"))?;
        let Some(feed) = feeds.get(symbol) else {
            return Ok(None);
        };
        let mut feed = feed.lock().map_err(|_| poisoned(symbol))?;
        if !feed.fresh {
            return Ok(None);
        }
        feed.fresh = false;
        Ok(Some(feed.series.clone()))
    }

    fn restore_fresh(&self, symbol: &str) {
        let Ok(feeds) = self.feeds.read() else {
            return;
        };
        if let Some(Ok(mut feed)) = feeds.get(symbol).map(Mutex::lock) {
            feed.fresh = true;
        }
    }

    pub fn portfolio_snapshot(&self) -> Result<PortfolioState, ConfluenceError> {
        let ledger = self.ledger.lock().map_err(|_| poisoned("position ledger"))?;
        Ok(ledger.snapshot())
    }

    /// Portfolio valued at each symbol's latest close.
    pub fn portfolio_summary(&self) -> Result<PortfolioSummary, ConfluenceError> {
        let prices = self.latest_prices()?;
        let ledger = self.ledger.lock().map_err(|_| poisoned("position ledger"))?;
        Ok(ledger.portfolio().summary(&prices))
    }

    fn latest_prices(&self) -> Result<HashMap<String, f64>, ConfluenceError> {
        let feeds = self.feeds.read().map_err(|_| poisoned("price series map"))?;
        let mut prices = HashMap::with_capacity(feeds.len());
        for (symbol, feed) in feeds.iter() {
            let feed = feed.lock().map_err(|_| poisoned(symbol))?;
            if let Some(latest) = feed.series.latest() {
                prices.insert(symbol.clone(), latest.close);
            }
        }
        Ok(prices)
    }
}

fn push(
    feed: &mut SymbolFeed,
    symbol: &str,
    observation: PriceObservation,
) -> Result<(), ConfluenceError> {
    match feed.series.push(observation) {
        Ok(()) => {
            feed.fresh = true;
            Ok(())
        }
        Err(err) => {
            tracing::warn!(symbol, error = %err, "observation rejected");
            Err(err)
        }
    }
}
