use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single poll cycle. None of these stop the monitor.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("Rate limited by upstream: {0}")]
    RateLimited(String),

    #[error("Upstream API error: {0}")]
    Api(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidPrice { field: &'static str, value: String },
}

impl OracleError {
    /// Short, stable code attached to diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            OracleError::Transport(_) => "TRANSPORT",
            OracleError::HttpStatus { .. } => "UPSTREAM_HTTP",
            OracleError::RateLimited(_) => "RATE_LIMITED",
            OracleError::Api(_) => "UPSTREAM_API",
            OracleError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            OracleError::InvalidPrice { .. } => "INVALID_PRICE",
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, OracleError::RateLimited(_))
    }
}
