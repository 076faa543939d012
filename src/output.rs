//! Console rendering of gas-price samples.

use crate::models::GasPriceSample;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Renders a sample as the exact bytes written to stdout, trailing newline
/// included, so a sample is emitted with a single `write_all`.
pub fn render(sample: &GasPriceSample, format: OutputFormat) -> io::Result<String> {
    match format {
        OutputFormat::Text => Ok(format!(
            "Safe Gas Price: {} gwei\nPropose Gas Price: {} gwei\nFast Gas Price: {} gwei\n",
            sample.safe, sample.propose, sample.fast
        )),
        OutputFormat::Json => {
            let mut line = serde_json::to_string(sample)?;
            line.push('\n');
            Ok(line)
        }
    }
}

pub fn write_sample<W: Write>(
    out: &mut W,
    sample: &GasPriceSample,
    format: OutputFormat,
) -> io::Result<()> {
    out.write_all(render(sample, format)?.as_bytes())?;
    out.flush()
}
