use crate::errors::{ExchangeError, NormalizeError, SymbolError};
use crate::orderbook::OrderBookSnapshot;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body for POST /api/orderbook
#[derive(Debug, Deserialize)]
pub struct OrderBookRequest {
    pub symbol: Option<String>,
    pub limit: Option<u32>,
}

/// Query string for GET /api/orderbook/{symbol}
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

/// Envelope for every successful response.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Normalized book plus the venue's update id.
#[derive(Debug, Serialize)]
pub struct OrderBookData {
    #[serde(flatten)]
    pub snapshot: OrderBookSnapshot,
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: u64,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error("limit must be between 1 and 5000, got {0}")]
    InvalidLimit(u32),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Symbol(_) | ApiError::InvalidLimit(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Exchange(e) => match e {
                ExchangeError::Timeout(_) | ExchangeError::Unreachable(_) => {
                    StatusCode::GATEWAY_TIMEOUT
                }
                // rate limiting is the proxy's problem, not the client's
                ExchangeError::Rejected { status, .. }
                    if (400..500).contains(status) && *status != 429 =>
                {
                    StatusCode::BAD_REQUEST
                }
                ExchangeError::Rejected { .. } | ExchangeError::Http(_) => StatusCode::BAD_GATEWAY,
                ExchangeError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Normalize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, client-facing summary. The full cause goes into `details`.
    pub fn summary(&self) -> &'static str {
        match self {
            ApiError::Symbol(SymbolError::Missing) => "Symbol is required",
            ApiError::Symbol(SymbolError::Invalid(_)) => "Invalid symbol",
            ApiError::InvalidLimit(_) => "Invalid limit",
            ApiError::BadRequest(_) => "Invalid request",
            ApiError::Exchange(ExchangeError::Timeout(_)) => "Upstream request timed out",
            ApiError::Exchange(ExchangeError::Unreachable(_)) => "Upstream unavailable",
            ApiError::Exchange(ExchangeError::Rejected { .. }) => "Upstream rejected request",
            ApiError::Exchange(ExchangeError::Http(_)) => "Upstream request failed",
            ApiError::Exchange(ExchangeError::Parse(_)) => "Unexpected upstream response",
            ApiError::Normalize(_) => "Malformed order book data",
        }
    }

    /// Metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::Symbol(SymbolError::Missing) => "missing_symbol",
            ApiError::Symbol(SymbolError::Invalid(_)) => "invalid_symbol",
            ApiError::InvalidLimit(_) => "invalid_limit",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Exchange(ExchangeError::Timeout(_)) => "upstream_timeout",
            ApiError::Exchange(ExchangeError::Unreachable(_)) => "upstream_unreachable",
            ApiError::Exchange(ExchangeError::Rejected { .. }) => "upstream_rejected",
            ApiError::Exchange(ExchangeError::Http(_)) => "upstream_http",
            ApiError::Exchange(ExchangeError::Parse(_)) => "upstream_shape",
            ApiError::Normalize(_) => "malformed_level",
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::Symbol(SymbolError::Missing) => None,
            ApiError::Symbol(SymbolError::Invalid(value)) => Some(value.clone()),
            ApiError::Exchange(ExchangeError::Rejected { message, .. }) => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(reason = self.reason(), "request failed: {self}");
        } else {
            tracing::warn!(reason = self.reason(), "request rejected: {self}");
        }
        metrics::counter!("depth_proxy_failures_total", "reason" => self.reason()).increment(1);

        let body = ErrorResponse {
            success: false,
            error: self.summary().to_string(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}
