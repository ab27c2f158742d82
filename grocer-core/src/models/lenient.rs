//! Deserializers that degrade to empty values instead of failing.
//!
//! The backend is not consistent about field shapes (ids that are sometimes
//! strings and sometimes objects, prices as numbers or strings, addresses as
//! text or nested objects). These helpers keep one bad field from rejecting
//! a whole cart or favorites payload.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes a list, dropping entries that do not parse as `T`.
///
/// A missing, null or non-array value becomes an empty list.
pub fn vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Deserializes `T`, falling back to `None` when the value has another shape.
pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps strings as-is and renders any other non-null value as JSON text.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(value))
}

/// Like [`text`], but null becomes an empty string.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(value).unwrap_or_default())
}

/// Accepts a decimal from a number or numeric string, defaulting to zero.
pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_decimal(&value).unwrap_or(Decimal::ZERO))
}

/// Accepts a decimal from a number or numeric string, `None` otherwise.
pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_decimal(&value))
}

/// Accepts a non-negative integer quantity; anything else becomes zero.
pub fn quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(parsed
        .and_then(|q| u32::try_from(q).ok())
        .unwrap_or_default())
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn value_to_decimal(value: &Value) -> Option<Decimal> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "decimal")]
        price: Decimal,
        #[serde(default, deserialize_with = "quantity")]
        quantity: u32,
        #[serde(default, deserialize_with = "text")]
        address: Option<String>,
        #[serde(default, deserialize_with = "vec")]
        tags: Vec<String>,
    }

    #[test]
    fn test_decimal_from_number_and_string() {
        let a: Probe = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
        let b: Probe = serde_json::from_str(r#"{"price": "12.50"}"#).unwrap();
        assert_eq!(a.price, Decimal::new(125, 1));
        assert_eq!(a.price, b.price);
    }

    #[test]
    fn test_garbage_degrades_to_defaults() {
        let p: Probe =
            serde_json::from_str(r#"{"price": {}, "quantity": -3, "tags": null}"#).unwrap();
        assert_eq!(p.price, Decimal::ZERO);
        assert_eq!(p.quantity, 0);
        assert!(p.tags.is_empty());
        assert!(p.address.is_none());
    }

    #[test]
    fn test_text_keeps_objects_as_json() {
        let p: Probe = serde_json::from_str(r#"{"address": {"city": "Lagos"}}"#).unwrap();
        assert_eq!(p.address.as_deref(), Some(r#"{"city":"Lagos"}"#));
    }

    #[test]
    fn test_vec_drops_bad_entries() {
        let p: Probe = serde_json::from_str(r#"{"tags": ["a", 3, "b"]}"#).unwrap();
        assert_eq!(p.tags, vec!["a".to_string(), "b".to_string()]);
    }
}
