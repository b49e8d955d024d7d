use super::{OrderBookSnapshot, PriceLevel};
use crate::errors::{LevelField, NormalizeError};
use crate::models::Side;
use std::time::{SystemTime, UNIX_EPOCH};

/// Normalizes a raw depth snapshot, stamping it with the current time.
pub fn normalize(
    raw_bids: &[[String; 2]],
    raw_asks: &[[String; 2]],
    symbol: &str,
) -> Result<OrderBookSnapshot, NormalizeError> {
    normalize_at(raw_bids, raw_asks, symbol, now_ms())
}

/// Parses both sides in upstream order, decorates every level with its total
/// and running cumulative total, and derives best bid/ask and spread.
///
/// Levels are never re-sorted. Any unparseable or out-of-range price or
/// quantity, or a total that overflows, fails the whole call, so a caller
/// never sees a partially built book.
pub fn normalize_at(
    raw_bids: &[[String; 2]],
    raw_asks: &[[String; 2]],
    symbol: &str,
    timestamp: u64,
) -> Result<OrderBookSnapshot, NormalizeError> {
    let bids = parse_side(Side::Bids, raw_bids)?;
    let asks = parse_side(Side::Asks, raw_asks)?;

    let best_bid = bids.first().map_or(0.0, |l| l.price);
    let best_ask = asks.first().map_or(0.0, |l| l.price);

    // crossed books pass through with a negative spread
    let spread = best_ask - best_bid;
    let spread_percent = if best_bid > 0.0 {
        spread / best_bid * 100.0
    } else {
        0.0
    };
    // a subnormal best bid makes the percentage blow up
    if !spread_percent.is_finite() {
        return Err(NormalizeError::MetricOverflow("spreadPercent"));
    }

    Ok(OrderBookSnapshot {
        symbol: symbol.to_string(),
        bids,
        asks,
        spread,
        spread_percent,
        best_bid,
        best_ask,
        timestamp,
    })
}

fn parse_side(side: Side, raw: &[[String; 2]]) -> Result<Vec<PriceLevel>, NormalizeError> {
    let mut cumulative = 0.0;

    raw.iter()
        .enumerate()
        .map(|(index, [price_str, qty_str])| -> Result<PriceLevel, NormalizeError> {
            let price = parse_field(side, index, LevelField::Price, price_str, |p| p > 0.0)?;
            let quantity =
                parse_field(side, index, LevelField::Quantity, qty_str, |q| q >= 0.0)?;

            // finite inputs can still overflow once multiplied or summed
            let total = price * quantity;
            if !total.is_finite() {
                return Err(NormalizeError::LevelOverflow {
                    side,
                    index,
                    what: "total",
                });
            }
            cumulative += total;
            if !cumulative.is_finite() {
                return Err(NormalizeError::LevelOverflow {
                    side,
                    index,
                    what: "cumulative",
                });
            }

            Ok(PriceLevel {
                price,
                quantity,
                total,
                cumulative,
            })
        })
        .collect()
}

/// Parses one level component. Prices must be strictly positive and
/// quantities non-negative; anything else is reported as malformed.
fn parse_field(
    side: Side,
    index: usize,
    field: LevelField,
    raw: &str,
    in_range: fn(f64) -> bool,
) -> Result<f64, NormalizeError> {
    // f64::from_str accepts "NaN" and "inf", neither of which is a price
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && in_range(*v))
        .ok_or_else(|| NormalizeError::MalformedLevel {
            side,
            index,
            field,
            value: raw.to_string(),
        })
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}
