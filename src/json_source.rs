//! The ambient JSON record adapter
//!
//! A streaming record parser that yields typed leaves straight off the wire
//! is out of scope here; this module is the minimal stand-in that lets the
//! CLI and the test suite drive the walker from ordinary JSON. It is
//! deliberately not a zero-copy/streaming parser — it builds a
//! [`serde_json::Value`] first and converts that, trading some throughput for
//! reuse of a crate already in the dependency tree.

use serde_json::Value;

use crate::value::FieldValue;

/// Convert a parsed [`serde_json::Value`] document into the typed tree the
/// walker consumes
///
/// Object field order is preserved (`serde_json`'s `Value::Object` is backed
/// by an order-preserving map whenever the `preserve_order` feature is
/// enabled; without it, insertion order still matches source order for a
/// freshly-parsed document). Arrays are re-serialized verbatim as their
/// source text and kept as an opaque templated string rather than descended
/// into. Numbers are classified integer vs float via
/// [`serde_json::Number::is_i64`]/[`is_u64`](serde_json::Number::is_u64),
/// with unsigned values outside the signed range falling back to float.
pub fn to_field_value(value: &Value) -> FieldValue {
	match value {
		Value::Null => FieldValue::Null,
		Value::Bool(b) => FieldValue::Boolean(*b),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				FieldValue::Integer(i)
			} else if let Some(u) = n.as_u64() {
				if u <= i64::MAX as u64 {
					FieldValue::Integer(u as i64)
				} else {
					FieldValue::Float(u as f64)
				}
			} else {
				FieldValue::Float(n.as_f64().unwrap_or(f64::NAN))
			}
		}
		Value::String(s) => FieldValue::String(s.clone()),
		Value::Array(_) => FieldValue::Array(serde_json::to_string(value).expect("serializing a parsed Value never fails")),
		Value::Object(map) => {
			FieldValue::Object(map.iter().map(|(k, v)| (k.clone(), to_field_value(v))).collect())
		}
	}
}

/// Parse one line of newline-delimited JSON into the walker's input tree
///
/// Returns [`ArchiveError::MalformedInput`](crate::error::ArchiveError::MalformedInput)
/// on a parse failure; the caller decides whether to skip or abort.
pub fn parse_line(line: &str) -> crate::error::Result<FieldValue> {
	let value: Value = serde_json::from_str(line).map_err(|e| crate::error::ArchiveError::MalformedInput(e.to_string()))?;
	Ok(to_field_value(&value))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn objects_preserve_field_order() {
		let v: Value = serde_json::from_str(r#"{"z":1,"a":2,"m":3}"#).unwrap();
		let FieldValue::Object(fields) = to_field_value(&v) else { panic!("expected object") };
		let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(keys, vec!["z", "a", "m"]);
	}

	#[test]
	fn arrays_are_reserialized_verbatim() {
		let v: Value = serde_json::from_str(r#"{"a":[1,2,"x"]}"#).unwrap();
		let FieldValue::Object(fields) = to_field_value(&v) else { panic!("expected object") };
		assert_eq!(fields[0].1, FieldValue::Array("[1,2,\"x\"]".to_owned()));
	}

	#[test]
	fn malformed_input_is_reported_not_panicked() {
		assert!(parse_line("{not json").is_err());
	}
}
