//! # JSON Decoding
//!
//! Converts a JSON document into a [`MessageValue`] guided by the schema, in
//! the spirit of the protobuf JSON mapping:
//!
//! - field names may be given as declared (`user_id`) or in lowerCamelCase
//!   (`userId`);
//! - `null` leaves a field unset;
//! - 64-bit integers may be given as numbers or decimal strings;
//! - floats accept `"NaN"`, `"Infinity"` and `"-Infinity"`;
//! - bytes are standard base64;
//! - enums accept value names or ordinals;
//! - map keys are JSON object keys, parsed per the declared key type;
//! - `google.protobuf.*` values the registry does not declare are kept as
//!   opaque JSON.
//!
//! Decoding only checks shape. Constraint checks belong to the engine.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value as Json;

use crate::error::DecodeError;
use crate::registry::{TypeRegistry, WELL_KNOWN_PREFIX};
use crate::schema::{Cardinality, FieldDescriptor, FieldType, MessageDescriptor};
use crate::value::{FieldData, MapKey, MessageValue, Value};

/// Decodes `json` as an instance of the message type `type_name`.
///
/// # Errors
///
/// Returns a [`DecodeError`] naming the dotted path of the first value that
/// does not fit its declared type.
pub fn decode_message(
    json: &Json,
    type_name: &str,
    registry: &dyn TypeRegistry,
) -> Result<MessageValue, DecodeError> {
    Decoder { registry }.message(json, type_name, "")
}

struct Decoder<'r> {
    registry: &'r dyn TypeRegistry,
}

impl Decoder<'_> {
    fn message(&self, json: &Json, type_name: &str, path: &str) -> Result<MessageValue, DecodeError> {
        let Some(descriptor) = self.registry.find_message(type_name) else {
            if type_name.starts_with(WELL_KNOWN_PREFIX) {
                return Ok(MessageValue::opaque(type_name, json.clone()));
            }
            return Err(DecodeError::UnknownType(type_name.to_string()));
        };
        let object = json.as_object().ok_or_else(|| DecodeError::ExpectedObject {
            path: display_path(path),
            type_name: type_name.to_string(),
        })?;

        let mut message = MessageValue::new(type_name);
        for (key, value) in object {
            let field = lookup_field(descriptor, key).ok_or_else(|| DecodeError::UnknownField {
                path: display_path(path),
                type_name: type_name.to_string(),
                field: key.clone(),
            })?;
            if value.is_null() {
                continue;
            }
            let field_path = join(path, &field.name);
            let data = self.field(field, value, &field_path)?;
            message.set(field.name.clone(), data);
        }
        Ok(message)
    }

    fn field(&self, field: &FieldDescriptor, json: &Json, path: &str) -> Result<FieldData, DecodeError> {
        match &field.cardinality {
            Cardinality::Singular => Ok(FieldData::Single(self.element(&field.field_type, json, path)?)),
            Cardinality::Repeated => {
                let items = json.as_array().ok_or_else(|| mismatch(path, "a JSON array", json))?;
                let values = items
                    .iter()
                    .map(|item| self.element(&field.field_type, item, path))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FieldData::Repeated(values))
            }
            Cardinality::Map { key } => {
                let entries = json.as_object().ok_or_else(|| mismatch(path, "a JSON object", json))?;
                let mut map = BTreeMap::new();
                for (raw_key, item) in entries {
                    let entry_path = join(path, raw_key);
                    let key = map_key(key, raw_key, &entry_path)?;
                    map.insert(key, self.element(&field.field_type, item, &entry_path)?);
                }
                Ok(FieldData::Map(map))
            }
        }
    }

    fn element(&self, field_type: &FieldType, json: &Json, path: &str) -> Result<Value, DecodeError> {
        match field_type {
            FieldType::Message(name) => Ok(Value::Message(self.message(json, name, path)?)),
            FieldType::Int32 => {
                let n = integer(json, path, "int32")?;
                i32::try_from(n)
                    .map(Value::Int32)
                    .map_err(|_| out_of_range(path, n, "int32"))
            }
            FieldType::Int64 => Ok(Value::Int64(integer(json, path, "int64")?)),
            FieldType::Float => {
                let f = float(json, path, "float")?;
                if f.is_finite() && f.abs() > f64::from(f32::MAX) {
                    return Err(out_of_range(path, f, "float"));
                }
                Ok(Value::Float(f as f32))
            }
            FieldType::Double => Ok(Value::Double(float(json, path, "double")?)),
            FieldType::String => json
                .as_str()
                .map(Value::from)
                .ok_or_else(|| mismatch(path, "a string", json)),
            FieldType::Bytes => {
                let text = json.as_str().ok_or_else(|| mismatch(path, "a base64 string", json))?;
                STANDARD
                    .decode(text)
                    .map(Value::Bytes)
                    .map_err(|e| DecodeError::InvalidBytes {
                        path: display_path(path),
                        reason: e.to_string(),
                    })
            }
            FieldType::Bool => json
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| mismatch(path, "a boolean", json)),
            FieldType::Enum(name) => self.enum_value(name, json, path),
        }
    }

    fn enum_value(&self, enum_name: &str, json: &Json, path: &str) -> Result<Value, DecodeError> {
        if let Some(label) = json.as_str() {
            let number = self
                .registry
                .find_enum(enum_name)
                .and_then(|e| e.number_of(label))
                .ok_or_else(|| DecodeError::UnknownEnumValue {
                    path: display_path(path),
                    enum_name: enum_name.to_string(),
                    value: label.to_string(),
                })?;
            return Ok(Value::Enum(number));
        }
        let n = integer(json, path, "an enum name or ordinal")?;
        i32::try_from(n)
            .map(Value::Enum)
            .map_err(|_| out_of_range(path, n, "enum ordinal"))
    }
}

fn lookup_field<'a>(descriptor: &'a MessageDescriptor, key: &str) -> Option<&'a FieldDescriptor> {
    descriptor
        .field(key)
        .or_else(|| descriptor.fields.iter().find(|f| lower_camel(&f.name) == key))
}

fn lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn integer(json: &Json, path: &str, expected: &str) -> Result<i64, DecodeError> {
    match json {
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0) {
                if f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Ok(f as i64)
                } else {
                    Err(out_of_range(path, n, expected))
                }
            } else {
                Err(out_of_range(path, n, expected))
            }
        }
        Json::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| mismatch(path, expected, json)),
        other => Err(mismatch(path, expected, other)),
    }
}

fn float(json: &Json, path: &str, expected: &str) -> Result<f64, DecodeError> {
    match json {
        Json::Number(n) => n.as_f64().ok_or_else(|| out_of_range(path, n, expected)),
        Json::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other.parse::<f64>().map_err(|_| mismatch(path, expected, json)),
        },
        other => Err(mismatch(path, expected, other)),
    }
}

fn map_key(key_type: &FieldType, raw: &str, path: &str) -> Result<MapKey, DecodeError> {
    let bad = || DecodeError::TypeMismatch {
        path: display_path(path),
        expected: format!("a {key_type} map key"),
        actual: format!("{raw:?}"),
    };
    match key_type {
        FieldType::String => Ok(MapKey::String(raw.to_string())),
        FieldType::Bool => match raw {
            "true" => Ok(MapKey::Bool(true)),
            "false" => Ok(MapKey::Bool(false)),
            _ => Err(bad()),
        },
        FieldType::Int32 => raw
            .parse::<i32>()
            .map(|n| MapKey::Int(n.into()))
            .map_err(|_| bad()),
        FieldType::Int64 => raw.parse::<i64>().map(MapKey::Int).map_err(|_| bad()),
        _ => Err(bad()),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

fn mismatch(path: &str, expected: &str, json: &Json) -> DecodeError {
    DecodeError::TypeMismatch {
        path: display_path(path),
        expected: expected.to_string(),
        actual: json_kind(json).to_string(),
    }
}

fn out_of_range(path: &str, value: impl ToString, expected: &str) -> DecodeError {
    DecodeError::OutOfRange {
        path: display_path(path),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SchemaSet;
    use serde_json::json;

    fn registry() -> SchemaSet {
        SchemaSet::from_yaml_str(
            "decode.yaml",
            r#"
messages:
  - full_name: acme.Order
    fields:
      - { name: order_id, type: string }
      - { name: quantity, type: int32 }
      - { name: total_cents, type: int64 }
      - { name: weight, type: double }
      - { name: status, type: { enum: acme.Status } }
      - { name: lines, type: { message: acme.Line }, cardinality: repeated }
      - { name: notes, type: string, cardinality: { map: { key: int32 } } }
      - { name: signature, type: bytes }
      - { name: gift, type: bool }
      - { name: ratio, type: float }
      - { name: placed_at, type: { message: google.protobuf.Timestamp } }
  - full_name: acme.Line
    fields:
      - { name: sku, type: string }
enums:
  - full_name: acme.Status
    values:
      - { name: STATUS_UNKNOWN, number: 0 }
      - { name: PAID, number: 2 }
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_decode_full_document() {
        let doc = json!({
            "orderId": "o-1",
            "quantity": 3,
            "total_cents": "1200",
            "weight": "NaN",
            "status": "PAID",
            "lines": [{"sku": "a"}, {"sku": "b"}],
            "notes": {"2": "fragile", "1": "first"},
            "signature": "AQID",
            "gift": true
        });
        let msg = decode_message(&doc, "acme.Order", &registry()).unwrap();
        assert_eq!(msg.get("order_id"), Some(&FieldData::single("o-1")));
        assert_eq!(msg.get("total_cents"), Some(&FieldData::single(1200i64)));
        assert_eq!(msg.get("status"), Some(&FieldData::Single(Value::Enum(2))));
        assert_eq!(msg.get("signature"), Some(&FieldData::Single(Value::Bytes(vec![1, 2, 3]))));
        let Some(FieldData::Repeated(lines)) = msg.get("lines") else {
            panic!("lines should be repeated");
        };
        assert_eq!(lines.len(), 2);
        let Some(FieldData::Map(notes)) = msg.get("notes") else {
            panic!("notes should be a map");
        };
        assert_eq!(notes.keys().next(), Some(&MapKey::Int(1)));
    }

    #[test]
    fn test_null_leaves_field_unset() {
        let msg = decode_message(&json!({"order_id": null}), "acme.Order", &registry()).unwrap();
        assert!(msg.get("order_id").is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = decode_message(&json!({"nope": 1}), "acme.Order", &registry()).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownField { field, .. } if field == "nope"));
    }

    #[test]
    fn test_int32_overflow_rejected() {
        let err = decode_message(&json!({"quantity": 3_000_000_000i64}), "acme.Order", &registry())
            .unwrap_err();
        assert!(matches!(err, DecodeError::OutOfRange { .. }));
    }

    #[test]
    fn test_nested_path_in_error() {
        let err = decode_message(&json!({"lines": [{"sku": 5}]}), "acme.Order", &registry())
            .unwrap_err();
        assert_eq!(err.to_string(), "lines.sku: expected a string, found a number");
    }

    #[test]
    fn test_unknown_enum_name() {
        let err = decode_message(&json!({"status": "LOST"}), "acme.Order", &registry()).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownEnumValue { .. }));
    }

    #[test]
    fn test_root_must_be_object() {
        let err = decode_message(&json!([1]), "acme.Order", &registry()).unwrap_err();
        assert!(matches!(err, DecodeError::ExpectedObject { .. }));
    }

    #[test]
    fn test_well_known_values_kept_opaque() {
        let msg = decode_message(
            &json!({"placedAt": "2024-01-01T00:00:00Z"}),
            "acme.Order",
            &registry(),
        )
        .unwrap();
        let Some(FieldData::Single(Value::Message(stamp))) = msg.get("placed_at") else {
            panic!("placed_at should decode as a message");
        };
        assert_eq!(stamp.type_name(), "google.protobuf.Timestamp");
        assert!(!stamp.is_default());

        let msg = decode_message(&json!({"placed_at": {"seconds": 1}}), "acme.Order", &registry())
            .unwrap();
        assert!(msg.get("placed_at").is_some());
    }

    #[test]
    fn test_float_overflow_rejected() {
        let err = decode_message(&json!({"ratio": 1e300}), "acme.Order", &registry()).unwrap_err();
        assert!(matches!(err, DecodeError::OutOfRange { .. }));

        let msg = decode_message(&json!({"ratio": "-Infinity"}), "acme.Order", &registry()).unwrap();
        assert_eq!(msg.get("ratio"), Some(&FieldData::single(f32::NEG_INFINITY)));
        let msg = decode_message(&json!({"ratio": 0.1}), "acme.Order", &registry()).unwrap();
        assert_eq!(msg.get("ratio"), Some(&FieldData::single(0.1f32)));
    }

    #[test]
    fn test_lower_camel() {
        assert_eq!(lower_camel("total_cents"), "totalCents");
        assert_eq!(lower_camel("id"), "id");
    }
}
