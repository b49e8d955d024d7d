pub mod normalizer;

use serde::Serialize;
pub use normalizer::normalize;

/// One rung of a normalized book side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceLevel {
    pub price: f64,
    pub quantity: f64,
    // price * quantity
    pub total: f64,
    // running sum of `total` from the best price outward
    pub cumulative: f64,
}

/// Display-ready depth snapshot. Built once by the normalizer and never
/// mutated afterwards, so the fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookSnapshot {
    symbol: String,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    spread: f64,
    spread_percent: f64,
    best_bid: f64,
    best_ask: f64,
    timestamp: u64,
}

impl OrderBookSnapshot {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Bid levels, best (highest) first.
    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    /// Ask levels, best (lowest) first.
    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    /// Highest bid price, 0 when there are no bids.
    pub fn best_bid(&self) -> f64 {
        self.best_bid
    }

    /// Lowest ask price, 0 when there are no asks.
    pub fn best_ask(&self) -> f64 {
        self.best_ask
    }

    /// Best ask minus best bid. Negative for a crossed book.
    pub fn spread(&self) -> f64 {
        self.spread
    }

    pub fn spread_percent(&self) -> f64 {
        self.spread_percent
    }

    /// Capture time in milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}
