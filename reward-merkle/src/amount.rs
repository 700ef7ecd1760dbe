// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Reward amounts as they appear in JSON.
//!
//! Whitelists and dumps are shared with JavaScript tooling, where amounts are plain
//! numbers. Amounts up to `2^53 - 1` are therefore written as JSON numbers and anything
//! larger as a decimal string, and both forms (plus `0x` hex strings) are read back.

use alloy::primitives::U256;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::str::FromStr;

/// Largest integer a JavaScript number represents exactly.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Parses a JSON amount into a `uint256`.
///
/// Returns a human readable reason on failure.
pub fn parse_amount(value: &Value) -> Result<U256, String> {
    match value {
        Value::Number(number) => {
            if let Some(n) = number.as_u64() {
                return Ok(U256::from(n));
            }
            if number.as_i64().is_some() {
                return Err(format!("negative amount {number}"));
            }
            match number.as_f64() {
                Some(f) if f < 0.0 => Err(format!("negative amount {number}")),
                Some(f) if f.fract() != 0.0 => Err(format!("fractional amount {number}")),
                // Integral floats beyond 2^53 have already lost precision.
                Some(f) if f > MAX_SAFE_INTEGER as f64 => {
                    Err(format!("amount {number} exceeds the safe integer range, use a string"))
                }
                Some(f) => Ok(U256::from(f as u64)),
                None => Err(format!("unrepresentable amount {number}")),
            }
        }
        Value::String(s) => parse_amount_str(s),
        other => Err(format!("expected a number or a string, got {other}")),
    }
}

fn parse_amount_str(s: &str) -> Result<U256, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty amount".to_string());
    }
    if s.starts_with('-') {
        return Err(format!("negative amount {s:?}"));
    }
    // ruint parses `0x` prefixed input as hex and anything else as decimal
    U256::from_str(s).map_err(|err| format!("invalid amount {s:?}: {err}"))
}

/// Wire form of an amount, see the module docs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsonAmount(pub U256);

impl Serialize for JsonAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 <= U256::from(MAX_SAFE_INTEGER) {
            serializer.serialize_u64(self.0.to::<u64>())
        } else {
            serializer.serialize_str(&self.0.to_string())
        }
    }
}

impl<'de> Deserialize<'de> for JsonAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        parse_amount(&value).map(JsonAmount).map_err(D::Error::custom)
    }
}

impl From<U256> for JsonAmount {
    fn from(amount: U256) -> Self {
        Self(amount)
    }
}
