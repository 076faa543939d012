//! Source of gas-price samples used by the monitor loop.

use crate::{error::OracleError, models::GasPriceSample};
use async_trait::async_trait;

#[async_trait]
pub trait GasOracle: Send + Sync {
    /// Fetches one fresh sample. Each call is independent.
    async fn fetch_gas_prices(&self) -> Result<GasPriceSample, OracleError>;

    /// Human-readable name of the upstream, used in log lines.
    fn source_name(&self) -> &str;
}
