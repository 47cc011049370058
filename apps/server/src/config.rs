use std::{net::SocketAddr, str::FromStr, time::Duration};

use alloy_primitives::Address;
use anyhow::Context;
use yieldfolio_core::constants::DEFAULT_CHAIN_ID;

const DEFAULT_CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

/// Log output selected by `YF_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub rpc_url: String,
    pub chain_id: u64,
    pub contract_address: Address,
    pub refresh_delay: Duration,
    pub confirmed_display: Duration,
    pub trend_interval: Duration,
    pub wallet_poll_interval: Duration,
    pub receipt_poll_interval: Duration,
    pub receipt_timeout: Duration,
    pub request_timeout: Duration,
    pub cors_allow: Vec<String>,
    pub log_format: LogFormat,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var_or(name, default)
        .trim()
        .parse()
        .with_context(|| format!("Invalid {}", name))
}

/// Periods that drive `tokio::time::interval`, which panics on zero.
fn parse_period(name: &str, default: &str, unit: fn(u64) -> Duration) -> anyhow::Result<Duration> {
    let value: u64 = parse_var(name, default)?;
    if value == 0 {
        anyhow::bail!("Invalid {}: must be greater than zero", name);
    }
    Ok(unit(value))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let cors_allow = var_or("YF_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let log_format = if var_or("YF_LOG_FORMAT", "text").eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        };

        Ok(Self {
            listen_addr: parse_var("YF_LISTEN_ADDR", "0.0.0.0:8080")?,
            rpc_url: var_or("YF_RPC_URL", "http://127.0.0.1:8545"),
            chain_id: parse_var("YF_CHAIN_ID", &DEFAULT_CHAIN_ID.to_string())?,
            contract_address: parse_var("YF_CONTRACT_ADDRESS", DEFAULT_CONTRACT_ADDRESS)?,
            refresh_delay: Duration::from_millis(parse_var("YF_REFRESH_DELAY_MS", "2000")?),
            confirmed_display: Duration::from_millis(parse_var("YF_CONFIRMED_DISPLAY_MS", "3000")?),
            trend_interval: parse_period("YF_TREND_INTERVAL_SECS", "30", Duration::from_secs)?,
            wallet_poll_interval: parse_period("YF_WALLET_POLL_SECS", "5", Duration::from_secs)?,
            receipt_poll_interval: parse_period("YF_RECEIPT_POLL_MS", "1000", Duration::from_millis)?,
            receipt_timeout: Duration::from_secs(parse_var("YF_RECEIPT_TIMEOUT_SECS", "120")?),
            request_timeout: Duration::from_millis(parse_var("YF_REQUEST_TIMEOUT_MS", "30000")?),
            cors_allow,
            log_format,
        })
    }
}
