use crate::{
    error::OracleError,
    models::{GasPriceSample, Gwei},
};
use serde::Deserialize;
use serde_json::Value;

/// Outer shape shared by every Etherscan-style API reply.
///
/// `status` is `"1"` on success and `"0"` on failure; `message` is `"OK"` or
/// `"NOTOK"`. Both are optional because some deployments omit them.
#[derive(Deserialize, Debug)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Value,
}

impl ApiEnvelope {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("0")
            || self
                .message
                .as_deref()
                .is_some_and(|m| m.eq_ignore_ascii_case("NOTOK"))
    }
}

/// `result` object of the `gastracker/gasoracle` action.
#[derive(Deserialize, Debug)]
pub struct GasOracleResult {
    #[serde(rename = "SafeGasPrice")]
    pub safe: Value,
    #[serde(rename = "ProposeGasPrice")]
    pub propose: Value,
    #[serde(rename = "FastGasPrice")]
    pub fast: Value,
    #[serde(rename = "suggestBaseFee", default)]
    pub suggest_base_fee: Option<Value>,
    #[serde(rename = "LastBlock", default)]
    pub last_block: Option<Value>,
}

impl GasOracleResult {
    pub fn into_sample(self) -> Result<GasPriceSample, OracleError> {
        let mut sample = GasPriceSample::new(
            price_field("SafeGasPrice", &self.safe)?,
            price_field("ProposeGasPrice", &self.propose)?,
            price_field("FastGasPrice", &self.fast)?,
        );

        // Extras are informational; a bad value just drops them.
        sample.suggested_base_fee = self
            .suggest_base_fee
            .as_ref()
            .and_then(|v| price_field("suggestBaseFee", v).ok());
        sample.last_block = self.last_block.as_ref().and_then(|v| match v {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        });

        Ok(sample)
    }
}

/// Accepts both `"20"` and `20`; anything else is rejected.
fn price_field(field: &'static str, value: &Value) -> Result<Gwei, OracleError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(OracleError::InvalidPrice {
                field,
                value: other.to_string(),
            })
        }
    };

    text.parse().map_err(|_| OracleError::InvalidPrice { field, value: text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn oracle_result(value: Value) -> GasOracleResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn converts_string_and_number_tiers() {
        let sample = oracle_result(json!({
            "SafeGasPrice": "20",
            "ProposeGasPrice": 30,
            "FastGasPrice": 40.5,
        }))
        .into_sample()
        .unwrap();

        assert_eq!(sample.safe.to_string(), "20");
        assert_eq!(sample.propose.to_string(), "30");
        assert_eq!(sample.fast.to_string(), "40.5");
        assert!(sample.last_block.is_none());
    }

    #[test]
    fn picks_up_optional_fields() {
        let sample = oracle_result(json!({
            "LastBlock": "19876543",
            "SafeGasPrice": "0.81",
            "ProposeGasPrice": "0.82",
            "FastGasPrice": "0.9",
            "suggestBaseFee": "0.805117",
            "gasUsedRatio": "0.4,0.5"
        }))
        .into_sample()
        .unwrap();

        assert_eq!(sample.last_block, Some(19_876_543));
        assert_eq!(
            sample.suggested_base_fee.map(|g| g.to_string()).as_deref(),
            Some("0.805117")
        );
    }

    #[test]
    fn rejects_non_numeric_tier() {
        let err = oracle_result(json!({
            "SafeGasPrice": "20",
            "ProposeGasPrice": null,
            "FastGasPrice": "40",
        }))
        .into_sample()
        .unwrap_err();

        match err {
            OracleError::InvalidPrice { field, value } => {
                assert_eq!(field, "ProposeGasPrice");
                assert_eq!(value, "null");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_tier() {
        let err = oracle_result(json!({
            "SafeGasPrice": "-3",
            "ProposeGasPrice": "1",
            "FastGasPrice": "2",
        }))
        .into_sample()
        .unwrap_err();

        assert_eq!(err.error_code(), "INVALID_PRICE");
    }

    #[test]
    fn detects_error_envelope() {
        let notok: ApiEnvelope = serde_json::from_value(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Invalid API Key"
        }))
        .unwrap();
        assert!(notok.is_error());

        let bare: ApiEnvelope =
            serde_json::from_value(json!({ "result": { "SafeGasPrice": "1" } })).unwrap();
        assert!(!bare.is_error());
    }
}
