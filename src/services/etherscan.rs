use crate::{
    error::OracleError,
    models::{ApiEnvelope, GasOracleResult, GasPriceSample},
    services::GasOracle,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("gas-watch/", env!("CARGO_PKG_VERSION"));
const BODY_EXCERPT_LEN: usize = 200;

/// Client for the Etherscan `gastracker/gasoracle` action.
pub struct EtherscanClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl EtherscanClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn gas_oracle_request(&self) -> RequestBuilder {
        self.client.get(&self.endpoint).query(&[
            ("module", "gastracker"),
            ("action", "gasoracle"),
            ("apikey", self.api_key.as_str()),
        ])
    }
}

#[async_trait]
impl GasOracle for EtherscanClient {
    async fn fetch_gas_prices(&self) -> Result<GasPriceSample, OracleError> {
        // The key is a query parameter, so only the bare endpoint is logged.
        tracing::debug!(endpoint = %self.endpoint, "Requesting gas oracle");

        let response = self.gas_oracle_request().send().await?;
        let status = response.status();
        let body = response.text().await?;

        parse_gas_oracle(status, &body)
    }

    fn source_name(&self) -> &str {
        "etherscan"
    }
}

/// Classifies an upstream reply into a sample or a cycle error.
pub fn parse_gas_oracle(status: StatusCode, body: &str) -> Result<GasPriceSample, OracleError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(OracleError::RateLimited(excerpt(body)));
    }
    if !status.is_success() {
        return Err(OracleError::HttpStatus {
            status,
            body: excerpt(body),
        });
    }

    let envelope: ApiEnvelope = serde_json::from_str(body).map_err(|e| {
        OracleError::MalformedResponse(format!("{}; body: {}", e, excerpt(body)))
    })?;

    let is_error = envelope.is_error();
    match envelope.result {
        Value::Object(map) if !is_error => {
            let result: GasOracleResult = serde_json::from_value(Value::Object(map))
                .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
            result.into_sample()
        }
        result if is_error => {
            let detail = match result {
                Value::String(s) => s,
                Value::Null => envelope.message.unwrap_or_default(),
                other => other.to_string(),
            };
            if detail.to_ascii_lowercase().contains("rate limit") {
                Err(OracleError::RateLimited(detail))
            } else {
                Err(OracleError::Api(detail))
            }
        }
        _ => Err(OracleError::MalformedResponse(format!(
            "no gas oracle result in body: {}",
            excerpt(body)
        ))),
    }
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_BODY: &str =
        r#"{"result":{"SafeGasPrice":"20","ProposeGasPrice":"30","FastGasPrice":"40"}}"#;

    #[test]
    fn bare_result_object_is_accepted() {
        let sample = parse_gas_oracle(StatusCode::OK, OK_BODY).unwrap();
        assert_eq!(sample.safe.to_string(), "20");
        assert_eq!(sample.propose.to_string(), "30");
        assert_eq!(sample.fast.to_string(), "40");
    }

    #[test]
    fn full_etherscan_reply_is_accepted() {
        let body = r#"{
            "status": "1",
            "message": "OK",
            "result": {
                "LastBlock": "21070000",
                "SafeGasPrice": "4.1",
                "ProposeGasPrice": "4.3",
                "FastGasPrice": "5",
                "suggestBaseFee": "4.05",
                "gasUsedRatio": "0.5,0.4"
            }
        }"#;

        let sample = parse_gas_oracle(StatusCode::OK, body).unwrap();
        assert_eq!(sample.fast.to_string(), "5");
        assert_eq!(sample.last_block, Some(21_070_000));
    }

    #[test]
    fn forbidden_is_http_status_error() {
        let err = parse_gas_oracle(StatusCode::FORBIDDEN, "Forbidden").unwrap_err();
        assert_eq!(err.error_code(), "UPSTREAM_HTTP");
    }

    #[test]
    fn too_many_requests_is_rate_limit() {
        let err = parse_gas_oracle(StatusCode::TOO_MANY_REQUESTS, "slow down").unwrap_err();
        assert!(err.is_rate_limit());
    }

    #[test]
    fn notok_envelope_is_api_error() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        match parse_gas_oracle(StatusCode::OK, body).unwrap_err() {
            OracleError::Api(detail) => assert_eq!(detail, "Invalid API Key"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn notok_rate_limit_text_is_rate_limit() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#;
        assert!(parse_gas_oracle(StatusCode::OK, body)
            .unwrap_err()
            .is_rate_limit());
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_gas_oracle(StatusCode::OK, "<html>gateway</html>").unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_RESPONSE");
    }

    #[test]
    fn missing_tier_is_malformed() {
        let body = r#"{"status":"1","message":"OK","result":{"SafeGasPrice":"1","FastGasPrice":"2"}}"#;
        let err = parse_gas_oracle(StatusCode::OK, body).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_RESPONSE");
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let long = "x".repeat(BODY_EXCERPT_LEN + 50);
        let cut = excerpt(&long);
        assert_eq!(cut.len(), BODY_EXCERPT_LEN + 3);
        assert!(cut.ends_with("..."));
    }
}
