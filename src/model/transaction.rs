use serde::Deserialize;
use serde_json::Value as JsonValue;

/// A raw transaction record as delivered by an upstream fetcher
/// (Etherscan-shaped JSON). Numeric fields arrive as strings or numbers and
/// may be missing entirely; accessors degrade to neutral values instead of
/// failing, so one bad record never aborts a batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxRecord {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub value: JsonValue,
    #[serde(default, rename = "timeStamp")]
    pub time_stamp: JsonValue,
    #[serde(default, rename = "gasPrice")]
    pub gas_price: JsonValue,
    #[serde(default, rename = "isError")]
    pub is_error: JsonValue,
}

impl TxRecord {
    /// Sender address in canonical (lowercase) form.
    pub fn sender(&self) -> String {
        self.from.trim().to_lowercase()
    }

    /// Recipient address in canonical (lowercase) form.
    pub fn recipient(&self) -> String {
        self.to.trim().to_lowercase()
    }

    /// Seconds since epoch; unparsable timestamps degrade to 0.
    pub fn timestamp(&self) -> i64 {
        json_to_f64(&self.time_stamp) as i64
    }

    /// Raw gas price as a float; unparsable values degrade to 0.
    pub fn gas_price_raw(&self) -> f64 {
        json_to_f64(&self.gas_price)
    }

    /// Whether the error-indicator field carries the "no error" sentinel.
    /// A missing field counts as no error.
    pub fn succeeded(&self) -> bool {
        match &self.is_error {
            JsonValue::Null => true,
            JsonValue::String(s) => s.trim() == "0",
            JsonValue::Number(n) => n.as_f64() == Some(0.0),
            _ => false,
        }
    }
}

fn json_to_f64(value: &JsonValue) -> f64 {
    match value {
        JsonValue::Number(n) => n.as_f64().unwrap_or(0.0),
        JsonValue::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
pub(crate) fn tx(from: &str, to: &str, value: &str, timestamp: i64) -> TxRecord {
    TxRecord {
        hash: format!("0xtx_{}_{}", from, timestamp),
        from: from.to_string(),
        to: to.to_string(),
        value: JsonValue::String(value.to_string()),
        time_stamp: JsonValue::from(timestamp),
        ..TxRecord::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_etherscan_shape() {
        let json = r#"{
            "hash": "0xabc",
            "from": "0xAAAA",
            "to": "0xBBBB",
            "value": "1000000000000000000",
            "timeStamp": "1700000000",
            "gasPrice": "20000000000",
            "isError": "0"
        }"#;
        let record: TxRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sender(), "0xaaaa");
        assert_eq!(record.recipient(), "0xbbbb");
        assert_eq!(record.timestamp(), 1_700_000_000);
        assert_eq!(record.gas_price_raw(), 20_000_000_000.0);
        assert!(record.succeeded());
    }

    #[test]
    fn test_numeric_fields_accepted_as_numbers() {
        let json = r#"{"from": "0xa", "to": "0xb", "value": 5, "timeStamp": 1700000000}"#;
        let record: TxRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_missing_fields_degrade_to_neutral() {
        let record: TxRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.sender(), "");
        assert_eq!(record.timestamp(), 0);
        assert_eq!(record.gas_price_raw(), 0.0);
        assert!(record.succeeded());
    }

    #[test]
    fn test_garbage_timestamp_degrades_to_zero() {
        let json = r#"{"timeStamp": "not-a-number"}"#;
        let record: TxRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.timestamp(), 0);
    }

    #[test]
    fn test_error_flag() {
        let json = r#"{"isError": "1"}"#;
        let record: TxRecord = serde_json::from_str(json).unwrap();
        assert!(!record.succeeded());
    }
}
