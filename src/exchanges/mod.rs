use crate::errors::ExchangeError;
use crate::models::RawDepth;
use async_trait::async_trait;

pub mod binance;

/// Anything that can hand back a raw depth snapshot for a venue symbol.
/// Handlers only ever see this trait, so tests can inject a stub.
#[async_trait]
pub trait DepthSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_depth(&self, symbol: &str, limit: u16) -> Result<RawDepth, ExchangeError>;
}
