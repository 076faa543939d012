pub mod etherscan;
pub mod monitor;
pub mod oracle;

pub use etherscan::EtherscanClient;
pub use monitor::{run_forever, GasMonitor, MonitorSummary};
pub use oracle::GasOracle;
