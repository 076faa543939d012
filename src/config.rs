use crate::output::OutputFormat;
use anyhow::{bail, Context, Result};
use clap::Parser;
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.etherscan.io/api";
pub const DEFAULT_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Command-line flags. Every value can also come from the environment
/// (or a `.env` file loaded before parsing).
#[derive(Debug, Clone, Parser)]
#[command(name = "gas-watch", version, about = "Print Ethereum gas-price tiers on a fixed interval")]
pub struct Args {
    /// Etherscan API key.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Seconds to wait between polls.
    #[arg(long, env = "POLL_INTERVAL_SECONDS", default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: u64,

    /// Gas oracle base URL.
    #[arg(long, env = "GAS_ORACLE_URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Print each sample as a JSON line.
    #[arg(long)]
    pub json: bool,

    /// Poll once and exit.
    #[arg(long)]
    pub once: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub api_key: String,
    pub interval: Duration,
    pub request_timeout: Duration,
    pub format: OutputFormat,
    pub once: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        // ETHERSCAN_API_KEY is the name the upstream documents.
        let api_key = args
            .api_key
            .or_else(|| std::env::var("ETHERSCAN_API_KEY").ok())
            .map(|key| key.trim().to_string())
            .unwrap_or_default();

        let config = Self {
            endpoint: args.endpoint.trim().to_string(),
            api_key,
            interval: Duration::from_secs(args.interval),
            request_timeout: Duration::from_secs(args.timeout),
            format: if args.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            once: args.once,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            bail!("API key required: pass --api-key or set API_KEY");
        }
        let endpoint = Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid endpoint URL {:?}", self.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.host_str().is_none() {
            bail!("Endpoint must be an HTTP(S) URL, got {:?}", self.endpoint);
        }
        if self.interval.is_zero() {
            bail!("Poll interval must be at least one second");
        }
        if self.request_timeout.is_zero() {
            bail!("Request timeout must be at least one second");
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            interval_secs = self.interval.as_secs(),
            timeout_secs = self.request_timeout.as_secs(),
            "Configuration validated"
        );

        Ok(())
    }
}
