use super::DepthSource;
use crate::config::Config;
use crate::errors::ExchangeError;
use crate::models::RawDepth;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Error body Binance sends with non-2xx responses,
/// e.g. `{"code":-1121,"msg":"Invalid symbol."}`
#[derive(Debug, Deserialize)]
struct BinanceErrorBody {
    msg: String,
}

pub struct Binance {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Binance {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.binance_base_url.clone(), config.upstream_timeout)
    }

    async fn request_depth(&self, url: &str) -> Result<RawDepth, ExchangeError> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        if !status.is_success() {
            let message = serde_json::from_str::<BinanceErrorBody>(&body)
                .map(|e| e.msg)
                .unwrap_or_else(|_| body.chars().take(200).collect());

            return Err(ExchangeError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str::<RawDepth>(&body)?)
    }
}

/// Splits transport failures into "could not reach upstream" and everything else.
fn classify(e: reqwest::Error) -> ExchangeError {
    if e.is_connect() {
        ExchangeError::Unreachable(e.to_string())
    } else {
        ExchangeError::Http(e)
    }
}

#[async_trait]
impl DepthSource for Binance {
    fn name(&self) -> &'static str {
        "binance"
    }

    /// Fetches a depth snapshot via REST. The whole exchange, including the
    /// body read, is bounded by the configured timeout. Dropping the returned
    /// future cancels the request.
    async fn fetch_depth(&self, symbol: &str, limit: u16) -> Result<RawDepth, ExchangeError> {
        let url = format!(
            "{}/api/v3/depth?symbol={}&limit={}",
            self.base_url, symbol, limit
        );

        tracing::debug!("[{}] GET {url}", self.name());

        let depth = tokio::time::timeout(self.timeout, self.request_depth(&url))
            .await
            .map_err(|_| ExchangeError::Timeout(self.timeout.as_millis()))??;

        tracing::debug!(
            "[{}] {symbol} lastUpdateId={} bids: {} asks: {}",
            self.name(),
            depth.last_update_id,
            depth.bids.len(),
            depth.asks.len()
        );

        Ok(depth)
    }
}
