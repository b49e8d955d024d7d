use crate::models::Side;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("upstream did not respond within {0} ms")]
    Timeout(u128),

    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    #[error("upstream rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelField {
    Price,
    Quantity,
}

impl std::fmt::Display for LevelField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelField::Price => f.write_str("price"),
            LevelField::Quantity => f.write_str("quantity"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("malformed {field} {value:?} at {side}[{index}]")]
    MalformedLevel {
        side: Side,
        index: usize,
        field: LevelField,
        value: String,
    },

    #[error("{side}[{index}] {what} overflows f64")]
    LevelOverflow {
        side: Side,
        index: usize,
        what: &'static str,
    },

    #[error("{0} overflows f64")]
    MetricOverflow(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Symbol is required")]
    Missing,

    #[error("Invalid symbol: {0}")]
    Invalid(String),
}
