use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A non-negative fee rate in gwei.
///
/// Keeps the upstream text (`"20"`, `"0.0000001"`) for display, next to the
/// parsed decimal used for comparisons.
#[derive(Debug, Clone)]
pub struct Gwei {
    value: BigDecimal,
    text: String,
}

impl Gwei {
    pub fn as_decimal(&self) -> &BigDecimal {
        &self.value
    }
}

impl PartialEq for Gwei {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Gwei {}

impl PartialOrd for Gwei {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.value.cmp(&other.value))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GweiParseError {
    #[error("empty value")]
    Empty,

    #[error("not a decimal number")]
    NotNumeric,

    #[error("negative value")]
    Negative,
}

impl FromStr for Gwei {
    type Err = GweiParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(GweiParseError::Empty);
        }
        let value = BigDecimal::from_str(s).map_err(|_| GweiParseError::NotNumeric)?;
        if value < BigDecimal::zero() {
            return Err(GweiParseError::Negative);
        }
        Ok(Self {
            value,
            text: s.to_string(),
        })
    }
}

impl fmt::Display for Gwei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Gwei {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// One observation of the three gas-price tiers.
#[derive(Debug, Clone, Serialize)]
pub struct GasPriceSample {
    pub safe: Gwei,
    pub propose: Gwei,
    pub fast: Gwei,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_base_fee: Option<Gwei>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_block: Option<u64>,
    pub observed_at: DateTime<Utc>,
}

impl GasPriceSample {
    pub fn new(safe: Gwei, propose: Gwei, fast: Gwei) -> Self {
        Self {
            safe,
            propose,
            fast,
            suggested_base_fee: None,
            last_block: None,
            observed_at: Utc::now(),
        }
    }
}
