//! JSON-RPC envelope types and the tolerant field coercions.
//!
//! The server is not internally consistent about how it encodes certain
//! fields: identifiers and flags arrive as either a JSON number or a JSON
//! numeric string depending on the server version, and the SNMP details
//! sub-object arrives as either a single object or a one-element array.
//! Every field known to vary is decoded through one of the named coercion
//! functions below, so the full coercion table lives in this module and
//! nowhere else. A value that fits neither accepted representation is a
//! decode failure, not a silent default.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::SnmpDetails;

pub(crate) const JSONRPC_VERSION: &str = "2.0";

/// Request envelope. `auth` is omitted entirely on unauthenticated calls.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    pub id: i64,
}

/// Response envelope. Exactly one of `result` and `error` is populated.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: String,
}

/// Accepts a JSON string or a JSON number; canonicalizes to `String`.
pub(crate) fn flexible_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Accepts a JSON string or a JSON number; canonicalizes to
/// `Option<String>`, mapping `null` to `None`.
pub(crate) fn opt_flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Accepts a JSON number or a JSON numeric string; canonicalizes to `i32`.
pub(crate) fn flexible_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| de::Error::custom(format!("number out of range: {value}"))),
        Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| de::Error::custom(format!("expected numeric string, got {value}"))),
        _ => Err(de::Error::custom(format!(
            "expected number or numeric string, got {value}"
        ))),
    }
}

/// Accepts the SNMP details payload as a single object or a one-element
/// array containing it. An empty array, an empty object, or `null`
/// normalizes to `None`.
pub(crate) fn details_object_or_array<'de, D>(
    deserializer: D,
) -> Result<Option<SnmpDetails>, D::Error>
where
    D: Deserializer<'de>,
{
    let object = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::Array(mut items) => match items.len() {
            0 => return Ok(None),
            1 => items.remove(0),
            n => {
                return Err(de::Error::custom(format!(
                    "expected at most one details object, got {n}"
                )));
            }
        },
        object @ Value::Object(_) => object,
        other => {
            return Err(de::Error::custom(format!(
                "expected details object or array, got {other}"
            )));
        }
    };
    match object {
        Value::Object(map) if map.is_empty() => Ok(None),
        object @ Value::Object(_) => serde_json::from_value(object)
            .map(Some)
            .map_err(de::Error::custom),
        other => Err(de::Error::custom(format!(
            "expected details object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct FlexFields {
        #[serde(deserialize_with = "flexible_string")]
        id: String,
        #[serde(deserialize_with = "flexible_i32")]
        flag: i32,
        #[serde(default, deserialize_with = "opt_flexible_string")]
        port: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct DetailsField {
        #[serde(default, deserialize_with = "details_object_or_array")]
        details: Option<SnmpDetails>,
    }

    #[test]
    fn test_flexible_fields_accept_numbers() {
        let parsed: FlexFields =
            serde_json::from_value(json!({"id": 10084, "flag": 1, "port": 161})).unwrap();
        assert_eq!(parsed.id, "10084");
        assert_eq!(parsed.flag, 1);
        assert_eq!(parsed.port.as_deref(), Some("161"));
    }

    #[test]
    fn test_flexible_fields_accept_numeric_strings() {
        let parsed: FlexFields =
            serde_json::from_value(json!({"id": "10084", "flag": " 1 ", "port": "161"})).unwrap();
        assert_eq!(parsed.id, "10084");
        assert_eq!(parsed.flag, 1);
        assert_eq!(parsed.port.as_deref(), Some("161"));
    }

    #[test]
    fn test_flexible_fields_number_and_string_forms_agree() {
        let a: FlexFields =
            serde_json::from_value(json!({"id": 7, "flag": 0, "port": 10050})).unwrap();
        let b: FlexFields =
            serde_json::from_value(json!({"id": "7", "flag": "0", "port": "10050"})).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.flag, b.flag);
        assert_eq!(a.port, b.port);
    }

    #[test]
    fn test_flexible_i32_rejects_non_numeric_string() {
        let result: Result<FlexFields, _> =
            serde_json::from_value(json!({"id": "1", "flag": "enabled"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_flexible_string_rejects_object() {
        let result: Result<FlexFields, _> = serde_json::from_value(json!({"id": {}, "flag": 0}));
        assert!(result.is_err());
    }

    #[test]
    fn test_opt_flexible_string_null_is_none() {
        let parsed: FlexFields =
            serde_json::from_value(json!({"id": "1", "flag": 0, "port": null})).unwrap();
        assert!(parsed.port.is_none());
    }

    #[test]
    fn test_details_from_object() {
        let parsed: DetailsField =
            serde_json::from_value(json!({"details": {"version": "2", "community": "public"}}))
                .unwrap();
        let details = parsed.details.unwrap();
        assert_eq!(details.version, 2);
        assert_eq!(details.community, "public");
    }

    #[test]
    fn test_details_from_one_element_array() {
        let from_array: DetailsField =
            serde_json::from_value(json!({"details": [{"version": 2, "community": "public"}]}))
                .unwrap();
        let from_object: DetailsField =
            serde_json::from_value(json!({"details": {"version": 2, "community": "public"}}))
                .unwrap();
        assert_eq!(from_array.details, from_object.details);
    }

    #[test]
    fn test_details_absent_forms() {
        for body in [json!({}), json!({"details": []}), json!({"details": {}})] {
            let parsed: DetailsField = serde_json::from_value(body).unwrap();
            assert!(parsed.details.is_none());
        }
    }

    #[test]
    fn test_details_rejects_multi_element_array() {
        let result: Result<DetailsField, _> =
            serde_json::from_value(json!({"details": [{"version": 2}, {"version": 2}]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_details_rejects_scalar() {
        let result: Result<DetailsField, _> = serde_json::from_value(json!({"details": 2}));
        assert!(result.is_err());
    }
}
