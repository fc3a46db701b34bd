//! # Decoded Message Values
//!
//! The dynamic side of the model: a [`MessageValue`] holds the values of one
//! message instance, keyed by field name. Each present field holds
//! [`FieldData`] shaped after its cardinality. Absent fields are simply not
//! in the map; the engine substitutes category defaults when it needs them.

use std::collections::BTreeMap;
use std::fmt;

use crate::schema::{FieldType, ValueCategory};

/// A single element value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A nested message.
    Message(MessageValue),
    /// 32-bit integer.
    Int32(i32),
    /// 64-bit integer.
    Int64(i64),
    /// Single-precision float.
    Float(f32),
    /// Double-precision float.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Boolean.
    Bool(bool),
    /// Enum ordinal.
    Enum(i32),
}

impl Value {
    /// The category this value belongs to.
    pub fn category(&self) -> ValueCategory {
        match self {
            Self::Message(_) => ValueCategory::Message,
            Self::Int32(_) => ValueCategory::Int32,
            Self::Int64(_) => ValueCategory::Int64,
            Self::Float(_) => ValueCategory::Float,
            Self::Double(_) => ValueCategory::Double,
            Self::String(_) => ValueCategory::String,
            Self::Bytes(_) => ValueCategory::Bytes,
            Self::Bool(_) => ValueCategory::Bool,
            Self::Enum(_) => ValueCategory::Enum,
        }
    }

    /// The default value of a declared type: zero, empty, `false`, ordinal 0,
    /// or a message with no fields set.
    pub fn default_for(field_type: &FieldType) -> Value {
        match field_type {
            FieldType::Message(name) => Self::Message(MessageValue::new(name.clone())),
            FieldType::Int32 => Self::Int32(0),
            FieldType::Int64 => Self::Int64(0),
            FieldType::Float => Self::Float(0.0),
            FieldType::Double => Self::Double(0.0),
            FieldType::String => Self::String(String::new()),
            FieldType::Bytes => Self::Bytes(Vec::new()),
            FieldType::Bool => Self::Bool(false),
            FieldType::Enum(_) => Self::Enum(0),
        }
    }

    /// True when the value equals the default of its category.
    pub fn is_default(&self) -> bool {
        match self {
            Self::Message(m) => m.is_default(),
            Self::Int32(v) => *v == 0,
            Self::Int64(v) => *v == 0,
            Self::Float(v) => *v == 0.0,
            Self::Double(v) => *v == 0.0,
            Self::String(v) => v.is_empty(),
            Self::Bytes(v) => v.is_empty(),
            Self::Bool(v) => !*v,
            Self::Enum(v) => *v == 0,
        }
    }

    /// The nested message, for message values.
    pub fn as_message(&self) -> Option<&MessageValue> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    /// The string, for string values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(m) => write!(f, "{}{{..}}", m.type_name()),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Enum(v) => write!(f, "#{v}"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<MessageValue> for Value {
    fn from(v: MessageValue) -> Self {
        Self::Message(v)
    }
}

/// A map key. Keys are primitive and never validated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    /// Boolean key.
    Bool(bool),
    /// Integer key of either width.
    Int(i64),
    /// String key.
    String(String),
}

impl From<&str> for MapKey {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<i64> for MapKey {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

/// The value(s) of one present field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    /// A singular value.
    Single(Value),
    /// Elements of a repeated field, in order.
    Repeated(Vec<Value>),
    /// Entries of a map field, ordered by key.
    Map(BTreeMap<MapKey, Value>),
}

impl FieldData {
    /// A singular value.
    pub fn single(value: impl Into<Value>) -> Self {
        Self::Single(value.into())
    }

    /// A repeated value from any sequence of elements.
    pub fn repeated<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Repeated(values.into_iter().map(Into::into).collect())
    }

    /// A map value from key/value pairs.
    pub fn map<K: Into<MapKey>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// True for a default singular value or an empty collection.
    pub fn is_default(&self) -> bool {
        match self {
            Self::Single(v) => v.is_default(),
            Self::Repeated(values) => values.is_empty(),
            Self::Map(entries) => entries.is_empty(),
        }
    }

    /// Short name of the shape, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Single(_) => "singular",
            Self::Repeated(_) => "repeated",
            Self::Map(_) => "map",
        }
    }
}

/// One decoded message instance.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageValue {
    type_name: String,
    fields: BTreeMap<String, FieldData>,
    raw: Option<serde_json::Value>,
}

impl MessageValue {
    /// An instance of `type_name` with no fields set.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
            raw: None,
        }
    }

    /// An instance of a type the registry does not describe, kept as its
    /// JSON encoding. Used for `google.protobuf.*` values.
    pub fn opaque(type_name: impl Into<String>, raw: serde_json::Value) -> Self {
        Self {
            raw: Some(raw),
            ..Self::new(type_name)
        }
    }

    /// Sets a field, consuming and returning the message.
    pub fn with(mut self, field: impl Into<String>, data: FieldData) -> Self {
        self.fields.insert(field.into(), data);
        self
    }

    /// Sets a singular field, consuming and returning the message.
    pub fn with_value(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FieldData::single(value))
    }

    /// Sets a field in place.
    pub fn set(&mut self, field: impl Into<String>, data: FieldData) {
        self.fields.insert(field.into(), data);
    }

    /// Full name of the message type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The data of a field, if present.
    pub fn get(&self, field: &str) -> Option<&FieldData> {
        self.fields.get(field)
    }

    /// Names of the present fields, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The JSON encoding of an opaque instance.
    pub fn raw(&self) -> Option<&serde_json::Value> {
        self.raw.as_ref()
    }

    /// True when every present field holds its default. An opaque instance
    /// is default when its encoding is null or empty.
    pub fn is_default(&self) -> bool {
        let raw_default = match &self.raw {
            None | Some(serde_json::Value::Null) => true,
            Some(serde_json::Value::Object(o)) => o.is_empty(),
            Some(serde_json::Value::String(s)) => s.is_empty(),
            Some(_) => false,
        };
        raw_default && self.fields.values().all(FieldData::is_default)
    }
}
