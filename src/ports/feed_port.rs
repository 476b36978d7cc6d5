//! Market data feed port.

use crate::domain::error::ConfluenceError;
use crate::domain::observation::PriceObservation;

pub trait FeedPort {
    /// All recorded observations for `symbol`, oldest first.
    fn fetch(&self, symbol: &str) -> Result<Vec<PriceObservation>, ConfluenceError>;

    /// Symbols the feed can serve.
    fn list_symbols(&self) -> Result<Vec<String>, ConfluenceError>;
}
