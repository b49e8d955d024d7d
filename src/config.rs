use anyhow::{Context, bail};
use std::env;
use std::time::Duration;

/// Binance accepts depth limits up to 5000.
pub const MAX_DEPTH_LIMIT: u16 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_port: u16,
    pub binance_base_url: String,
    pub quote_asset: String,
    pub default_depth_limit: u16,
    pub upstream_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_port: 3000,
            binance_base_url: "https://api.binance.com".to_string(),
            quote_asset: "USDT".to_string(),
            default_depth_limit: 20,
            upstream_timeout: Duration::from_millis(5000),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, falling back to defaults
    /// for anything unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_port = match lookup("API_PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .context("API_PORT must be a valid port number (1-65535)")?,
            None => defaults.api_port,
        };

        let binance_base_url = lookup("BINANCE_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.binance_base_url);

        let quote_asset = lookup("QUOTE_ASSET")
            .map(|v| v.trim().to_uppercase())
            .unwrap_or(defaults.quote_asset);
        if quote_asset.is_empty() || !quote_asset.chars().all(|c| c.is_ascii_alphanumeric()) {
            bail!("QUOTE_ASSET must be a non-empty alphanumeric asset code, got {quote_asset:?}");
        }

        let default_depth_limit = match lookup("DEPTH_LIMIT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .context("DEPTH_LIMIT must be an integer")?,
            None => defaults.default_depth_limit,
        };
        if !(1..=MAX_DEPTH_LIMIT).contains(&default_depth_limit) {
            bail!("DEPTH_LIMIT must be between 1 and {MAX_DEPTH_LIMIT}, got {default_depth_limit}");
        }

        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_MS") {
            Some(v) => Duration::from_millis(
                v.trim()
                    .parse::<u64>()
                    .context("UPSTREAM_TIMEOUT_MS must be a number of milliseconds")?,
            ),
            None => defaults.upstream_timeout,
        };
        if upstream_timeout.is_zero() {
            bail!("UPSTREAM_TIMEOUT_MS must be greater than zero");
        }

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("LOG_FORMAT must be \"pretty\" or \"json\", got {other:?}"),
        };

        Ok(Self {
            api_port,
            binance_base_url,
            quote_asset,
            default_depth_limit,
            upstream_timeout,
            log_format,
        })
    }
}
