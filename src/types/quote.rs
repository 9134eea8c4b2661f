use std::time::Duration;

use fastnum::UD64;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::num;

/// One fee/limit/time profile returned by `GET /detailed_quote`.
///
/// Fields the SDK does not interpret are kept in [`QuoteRoute::extra`].
#[derive(Clone, derive_more::Debug, PartialEq, Deserialize)]
pub struct QuoteRoute {
    #[serde(default, deserialize_with = "num::decimal_opt::deserialize")]
    pub min_amount: Option<UD64>,
    #[serde(default, deserialize_with = "num::decimal_opt::deserialize")]
    pub max_amount: Option<UD64>,
    #[serde(default, deserialize_with = "num::decimal_opt::deserialize")]
    pub total_fee: Option<UD64>,
    #[serde(default, deserialize_with = "num::decimal_opt::deserialize")]
    pub total_fee_in_usd: Option<UD64>,
    /// Estimated completion time as `HH:MM:SS`.
    #[serde(default)]
    pub avg_completion_time: Option<String>,
    #[serde(default)]
    pub path: Vec<Value>,
    #[debug(skip)]
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuoteRoute {
    /// Parsed [`Self::avg_completion_time`].
    pub fn completion_time(&self) -> Option<Duration> {
        parse_hms(self.avg_completion_time.as_deref()?)
    }
}

fn parse_hms(value: &str) -> Option<Duration> {
    let mut secs = 0u64;
    let mut parts = 0;
    for part in value.trim().split(':') {
        // fractional seconds are truncated
        let whole = part.split('.').next()?;
        secs = secs.checked_mul(60)?.checked_add(whole.parse().ok()?)?;
        parts += 1;
    }
    (parts == 3).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use fastnum::udec64;

    use super::*;

    #[test]
    fn test_deserialize_quote_route() {
        let route: QuoteRoute = serde_json::from_str(
            r#"{
                "min_amount": 0.0015,
                "max_amount": "4.2",
                "total_fee": 0.00021,
                "total_fee_in_usd": 0.65,
                "avg_completion_time": "00:01:05",
                "path": [{"provider_name": "layerswap"}],
                "slippage": 0.01
            }"#,
        )
        .unwrap();

        assert_eq!(route.min_amount, Some(udec64!(0.0015)));
        assert_eq!(route.max_amount, Some(udec64!(4.2)));
        assert_eq!(route.total_fee, Some(udec64!(0.00021)));
        assert_eq!(route.completion_time(), Some(Duration::from_secs(65)));
        assert_eq!(route.path.len(), 1);
        assert_eq!(route.extra.get("slippage"), Some(&serde_json::json!(0.01)));
    }

    #[test]
    fn test_parse_hms() {
        assert_eq!(parse_hms("01:00:00"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_hms("00:00:37.4830000"), Some(Duration::from_secs(37)));
        assert_eq!(parse_hms("37"), None);
        assert_eq!(parse_hms("aa:bb:cc"), None);
    }
}
