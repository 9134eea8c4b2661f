use fastnum::{UD64, decimal::Context};
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

/// Parses a non-negative decimal amount as returned by the API.
///
/// Blank input yields `None`.
pub fn parse_decimal(value: &str) -> Result<Option<UD64>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    UD64::from_str(value, Context::default())
        .map(Some)
        .map_err(|e| format!("invalid decimal {value:?}: {e}"))
}

/// Serde adapter for optional decimal fields that the API sends either as
/// JSON numbers or as strings.
pub(crate) mod decimal_opt {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<UD64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => parse_decimal(&n.to_string()).map_err(D::Error::custom),
            Some(Value::String(s)) => parse_decimal(&s).map_err(D::Error::custom),
            Some(other) => Err(D::Error::custom(format!(
                "expected decimal number or string, got {other}"
            ))),
        }
    }
}
