use std::str::FromStr;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, ToPrimitive};
use serde_json::Value as JsonValue;

/// Convert a raw smallest-denomination amount to a human-scale float by
/// dividing by 10^exponent. The raw value may arrive as a decimal string or
/// a JSON number; anything unparsable (or negative) degrades to 0.0 so a
/// malformed record never aborts an analysis.
pub fn to_human(raw: &JsonValue, exponent: u32) -> f64 {
    let parsed = match raw {
        JsonValue::String(s) => BigDecimal::from_str(s.trim()).ok(),
        JsonValue::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        _ => None,
    };
    let Some(amount) = parsed else {
        return 0.0;
    };
    if amount.sign() == bigdecimal::num_bigint::Sign::Minus {
        return 0.0;
    }

    // BigDecimal::new(d, scale) is d * 10^(-scale), so a negative scale
    // builds 10^exponent without overflowing a machine integer.
    let divisor = BigDecimal::new(BigInt::from(1), -(exponent as i64));
    (amount / divisor).to_f64().unwrap_or(0.0)
}

/// Round to a fixed number of decimal places.
pub fn round_dp(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
