use crate::{
    config::Config,
    error::OracleError,
    output::{write_sample, OutputFormat},
    services::{EtherscanClient, GasOracle},
};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

pub const SHUTDOWN_LINE: &str = "Stopping gas price monitor.";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSummary {
    pub cycles: u64,
    pub failures: u64,
}

/// Poll, print, wait; until the shutdown token fires.
///
/// Samples go to `out`. Cycle failures are only logged, so `run` returns an
/// error solely when `out` can no longer be written.
pub struct GasMonitor<W> {
    oracle: Arc<dyn GasOracle>,
    interval: Duration,
    format: OutputFormat,
    once: bool,
    out: W,
}

impl<W: Write> GasMonitor<W> {
    pub fn new(oracle: Arc<dyn GasOracle>, interval: Duration, out: W) -> Self {
        Self {
            oracle,
            interval,
            format: OutputFormat::Text,
            once: false,
            out,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Stop after the first cycle instead of looping.
    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub async fn run(&mut self, shutdown: CancellationToken) -> io::Result<MonitorSummary> {
        writeln!(
            self.out,
            "Starting gas price monitor (source: {}, interval: {}s)",
            self.oracle.source_name(),
            self.interval.as_secs()
        )?;
        self.out.flush()?;

        tracing::info!(
            source = self.oracle.source_name(),
            interval_secs = self.interval.as_secs(),
            once = self.once,
            "Gas price monitor started"
        );

        let mut summary = MonitorSummary::default();

        while !shutdown.is_cancelled() {
            let outcome = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                outcome = self.oracle.fetch_gas_prices() => outcome,
            };
            summary.cycles += 1;

            match outcome {
                Ok(sample) => {
                    tracing::debug!(
                        safe = %sample.safe,
                        propose = %sample.propose,
                        fast = %sample.fast,
                        last_block = ?sample.last_block,
                        "Gas prices received"
                    );
                    write_sample(&mut self.out, &sample, self.format)?;
                }
                Err(e) => {
                    summary.failures += 1;
                    self.report(&e);
                }
            }

            if self.once {
                break;
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = sleep(self.interval) => {}
            }
        }

        writeln!(self.out, "{}", SHUTDOWN_LINE)?;
        self.out.flush()?;

        tracing::info!(
            cycles = summary.cycles,
            failures = summary.failures,
            "Gas price monitor stopped"
        );

        Ok(summary)
    }

    fn report(&self, error: &OracleError) {
        if error.is_rate_limit() {
            tracing::warn!(
                error = %error,
                error_code = error.error_code(),
                "Gas price poll rate limited, retrying next cycle"
            );
        } else {
            tracing::error!(
                error = %error,
                error_code = error.error_code(),
                "Gas price poll failed"
            );
        }
    }
}

/// Builds the Etherscan client from `config` and runs the monitor until
/// `shutdown` is cancelled (or after one cycle in one-shot mode).
pub async fn run_forever<W: Write>(
    config: &Config,
    out: W,
    shutdown: CancellationToken,
) -> anyhow::Result<MonitorSummary> {
    let client = EtherscanClient::new(&config.endpoint, &config.api_key, config.request_timeout)?;

    let mut monitor = GasMonitor::new(Arc::new(client), config.interval, out)
        .with_format(config.format)
        .once(config.once);

    Ok(monitor.run(shutdown).await?)
}
