//! # Message Schema Model
//!
//! Static schema metadata: message and enum descriptors, field descriptors
//! with their attached validation options, and the [`FieldDeclaration`] view
//! the validation engine works with.
//!
//! ## Options
//!
//! Field options mirror the custom protobuf options schema authors write:
//! `required`, `if_missing`, `pattern`, `distinct`, `range`, `min`, `max` and
//! `digits`. Options registered by a host live in [`FieldOptions::custom`],
//! keyed by option name. Message options carry `required_field`
//! (alternatives) and `constraint_for` (external constraint paths).
//!
//! ## Identifier Conventions
//!
//! The first field of an entity-state message is its entity ID, and the first
//! field of a command message is its command ID. These flags are derived by
//! [`MessageDescriptor::declaration`] rather than stored in the schema.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of value categories a field can hold.
///
/// For map fields the category is that of the map value; keys are primitive
/// and never validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueCategory {
    /// A nested message.
    Message,
    /// 32-bit integer kinds (`int32`, `uint32`, `sint32`, `fixed32`, `sfixed32`).
    Int32,
    /// 64-bit integer kinds (`int64`, `uint64`, `sint64`, `fixed64`, `sfixed64`).
    Int64,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    /// UTF-8 string.
    String,
    /// Raw bytes.
    Bytes,
    /// Boolean.
    Bool,
    /// Enum value, held as its ordinal.
    Enum,
}

impl ValueCategory {
    /// Returns all nine categories in declaration order.
    pub fn all() -> &'static [ValueCategory] {
        &[
            Self::Message,
            Self::Int32,
            Self::Int64,
            Self::Float,
            Self::Double,
            Self::String,
            Self::Bytes,
            Self::Bool,
            Self::Enum,
        ]
    }

    /// Returns the snake_case identifier of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Bool => "bool",
            Self::Enum => "enum",
        }
    }

    /// True for the four numeric categories.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int32 | Self::Int64 | Self::Float | Self::Double)
    }

    /// True for the two floating-point categories.
    pub fn is_floating(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

impl fmt::Display for ValueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a field.
///
/// Serialized as a bare string for scalars (`int32`, `string`, ...) and as a
/// single-key map for named types (`{ message: pkg.Type }`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FieldTypeRepr", into = "FieldTypeRepr")]
pub enum FieldType {
    /// A message type, by full name.
    Message(String),
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    /// UTF-8 string.
    String,
    /// Raw bytes.
    Bytes,
    /// Boolean.
    Bool,
    /// An enum type, by full name.
    Enum(String),
}

/// Serialized shape of [`FieldType`].
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FieldTypeRepr {
    Scalar(String),
    Named(NamedType),
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct NamedType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    enum_name: Option<String>,
}

impl TryFrom<FieldTypeRepr> for FieldType {
    type Error = String;

    fn try_from(repr: FieldTypeRepr) -> Result<Self, Self::Error> {
        match repr {
            FieldTypeRepr::Scalar(name) => match name.as_str() {
                "int32" | "uint32" | "sint32" | "fixed32" | "sfixed32" => Ok(Self::Int32),
                "int64" | "uint64" | "sint64" | "fixed64" | "sfixed64" => Ok(Self::Int64),
                "float" => Ok(Self::Float),
                "double" => Ok(Self::Double),
                "string" => Ok(Self::String),
                "bytes" => Ok(Self::Bytes),
                "bool" => Ok(Self::Bool),
                other => Err(format!("unknown scalar type `{other}`")),
            },
            FieldTypeRepr::Named(NamedType {
                message: Some(name),
                enum_name: None,
            }) => Ok(Self::Message(name)),
            FieldTypeRepr::Named(NamedType {
                message: None,
                enum_name: Some(name),
            }) => Ok(Self::Enum(name)),
            FieldTypeRepr::Named(_) => {
                Err("a named type needs exactly one of `message` or `enum`".to_string())
            }
        }
    }
}

impl From<FieldType> for FieldTypeRepr {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Message(name) => Self::Named(NamedType {
                message: Some(name),
                enum_name: None,
            }),
            FieldType::Enum(name) => Self::Named(NamedType {
                message: None,
                enum_name: Some(name),
            }),
            scalar => Self::Scalar(scalar.category().as_str().to_string()),
        }
    }
}

impl FieldType {
    /// The value category of this type.
    pub fn category(&self) -> ValueCategory {
        match self {
            Self::Message(_) => ValueCategory::Message,
            Self::Int32 => ValueCategory::Int32,
            Self::Int64 => ValueCategory::Int64,
            Self::Float => ValueCategory::Float,
            Self::Double => ValueCategory::Double,
            Self::String => ValueCategory::String,
            Self::Bytes => ValueCategory::Bytes,
            Self::Bool => ValueCategory::Bool,
            Self::Enum(_) => ValueCategory::Enum,
        }
    }

    /// Full name of the referenced message or enum type, if any.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Message(name) | Self::Enum(name) => Some(name),
            _ => None,
        }
    }

    /// True for types protobuf accepts as map keys.
    pub fn is_valid_map_key(&self) -> bool {
        matches!(self, Self::Int32 | Self::Int64 | Self::String | Self::Bool)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(name) | Self::Enum(name) => f.write_str(name),
            other => f.write_str(other.category().as_str()),
        }
    }
}

/// Cardinality of a field.
///
/// Serialized as `singular`, `repeated`, or `{ map: { key: <type> } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CardinalityRepr", into = "CardinalityRepr")]
pub enum Cardinality {
    /// A single value.
    #[default]
    Singular,
    /// An ordered list of values.
    Repeated,
    /// A map; the field's declared type is the value type.
    Map {
        /// Type of the map keys.
        key: FieldType,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CardinalityRepr {
    Plain(String),
    Map { map: MapKeyRepr },
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapKeyRepr {
    key: FieldType,
}

impl TryFrom<CardinalityRepr> for Cardinality {
    type Error = String;

    fn try_from(repr: CardinalityRepr) -> Result<Self, Self::Error> {
        match repr {
            CardinalityRepr::Plain(name) => match name.as_str() {
                "singular" => Ok(Self::Singular),
                "repeated" => Ok(Self::Repeated),
                other => Err(format!("unknown cardinality `{other}`")),
            },
            CardinalityRepr::Map { map } => Ok(Self::Map { key: map.key }),
        }
    }
}

impl From<Cardinality> for CardinalityRepr {
    fn from(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::Singular => Self::Plain("singular".to_string()),
            Cardinality::Repeated => Self::Plain("repeated".to_string()),
            Cardinality::Map { key } => Self::Map {
                map: MapKeyRepr { key },
            },
        }
    }
}

/// Role of a message that drives the identifier conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// No identifier convention applies.
    #[default]
    Plain,
    /// Entity state; the first field is the entity ID.
    Entity,
    /// A command; the first field is the command ID.
    Command,
}

/// Custom message for a missing required value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IfMissingOption {
    /// Message format replacing the default one.
    pub msg_format: Option<String>,
}

/// Flags altering how a `pattern` regex is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternModifier {
    /// Match letters regardless of case.
    pub case_insensitive: bool,
    /// `^` and `$` match at line boundaries.
    pub multiline: bool,
    /// `.` also matches line terminators.
    pub dot_all: bool,
    /// A match anywhere in the string suffices instead of a full match.
    pub partial_match: bool,
}

/// The `pattern` option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternOption {
    /// Regular expression the whole value must match.
    pub regex: String,
    /// Matching flags.
    #[serde(default)]
    pub modifier: PatternModifier,
    /// Message format replacing the default one.
    #[serde(default)]
    pub msg_format: Option<String>,
}

/// The `min` and `max` options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundOption {
    /// The bound, as a numeric literal.
    pub value: String,
    /// Whether the bound itself is excluded.
    #[serde(default)]
    pub exclusive: bool,
    /// Message format replacing the default one.
    #[serde(default)]
    pub msg_format: Option<String>,
}

/// The `digits` option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DigitsOption {
    /// Maximum number of digits before the decimal point.
    pub integer_max: u32,
    /// Maximum number of digits after the decimal point.
    #[serde(default)]
    pub fraction_max: u32,
    /// Message format replacing the default one.
    #[serde(default)]
    pub msg_format: Option<String>,
}

/// Validation options attached to a field.
///
/// Every option is optional: `None` means the option is not set on the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldOptions {
    /// Explicit `required` flag. `Some(false)` opts an entity ID out.
    pub required: Option<bool>,
    /// Custom message for missing values.
    pub if_missing: Option<IfMissingOption>,
    /// Regex for string values.
    pub pattern: Option<PatternOption>,
    /// Disallow duplicate elements in repeated and map fields.
    pub distinct: Option<bool>,
    /// Interval token such as `[0,23]` or `(0..1]`.
    pub range: Option<String>,
    /// Lower bound.
    pub min: Option<BoundOption>,
    /// Upper bound.
    pub max: Option<BoundOption>,
    /// Digit count limits.
    pub digits: Option<DigitsOption>,
    /// Values of host-registered options, keyed by option name.
    pub custom: BTreeMap<String, serde_json::Value>,
}

impl FieldOptions {
    /// Returns these options with every option set in `rule` taking precedence.
    ///
    /// Used when an external constraint re-declares options for a field.
    pub fn overlay(&self, rule: &FieldOptions) -> FieldOptions {
        let mut custom = self.custom.clone();
        custom.extend(rule.custom.iter().map(|(k, v)| (k.clone(), v.clone())));
        FieldOptions {
            required: rule.required.or(self.required),
            if_missing: rule.if_missing.clone().or_else(|| self.if_missing.clone()),
            pattern: rule.pattern.clone().or_else(|| self.pattern.clone()),
            distinct: rule.distinct.or(self.distinct),
            range: rule.range.clone().or_else(|| self.range.clone()),
            min: rule.min.clone().or_else(|| self.min.clone()),
            max: rule.max.clone().or_else(|| self.max.clone()),
            digits: rule.digits.clone().or_else(|| self.digits.clone()),
            custom,
        }
    }
}

/// Validation options attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageOptions {
    /// Pipe-separated field names; at least one must be set.
    pub required_field: Option<String>,
    /// Comma-separated `pkg.Type.field` paths this message constrains.
    pub constraint_for: Option<String>,
}

/// Schema of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDescriptor {
    /// Field name as declared.
    pub name: String,
    /// Declared type; for maps, the value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Singular, repeated or map.
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Attached validation options.
    #[serde(default)]
    pub options: FieldOptions,
}

impl FieldDescriptor {
    /// A singular field without options.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            cardinality: Cardinality::Singular,
            options: FieldOptions::default(),
        }
    }

    /// Marks the field as repeated.
    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    /// Turns the field into a map keyed by `key`.
    pub fn map(mut self, key: FieldType) -> Self {
        self.cardinality = Cardinality::Map { key };
        self
    }

    /// Replaces the field options.
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }
}

/// Schema of a message type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageDescriptor {
    /// Fully-qualified name, e.g. `acme.billing.Invoice`.
    pub full_name: String,
    /// Identifier convention role.
    #[serde(default)]
    pub role: MessageRole,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Message-level options.
    #[serde(default)]
    pub options: MessageOptions,
}

impl MessageDescriptor {
    /// A plain message without fields.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            role: MessageRole::Plain,
            fields: Vec::new(),
            options: MessageOptions::default(),
        }
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the identifier convention role.
    pub fn with_role(mut self, role: MessageRole) -> Self {
        self.role = role;
        self
    }

    /// Replaces the message options.
    pub fn with_options(mut self, options: MessageOptions) -> Self {
        self.options = options;
        self
    }

    /// The last segment of the full name.
    pub fn simple_name(&self) -> &str {
        self.full_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.full_name)
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Derives the declaration of the named field.
    pub fn declaration(&self, name: &str) -> Option<FieldDeclaration> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .map(|index| self.declaration_at(index))
    }

    /// Derives the declarations of all fields, in declaration order.
    pub fn declarations(&self) -> Vec<FieldDeclaration> {
        (0..self.fields.len()).map(|i| self.declaration_at(i)).collect()
    }

    fn declaration_at(&self, index: usize) -> FieldDeclaration {
        let field = &self.fields[index];
        let first = index == 0;
        FieldDeclaration {
            name: field.name.clone(),
            full_name: format!("{}.{}", self.full_name, field.name),
            field_type: field.field_type.clone(),
            cardinality: field.cardinality.clone(),
            entity_id: first && self.role == MessageRole::Entity,
            command_id: first && self.role == MessageRole::Command,
        }
    }
}

/// A declared enum value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumValue {
    /// Value name, e.g. `STATUS_ACTIVE`.
    pub name: String,
    /// Ordinal.
    pub number: i32,
}

/// Schema of an enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDescriptor {
    /// Fully-qualified name.
    pub full_name: String,
    /// Declared values.
    #[serde(default)]
    pub values: Vec<EnumValue>,
}

impl EnumDescriptor {
    /// Ordinal of the value with the given name.
    pub fn number_of(&self, name: &str) -> Option<i32> {
        self.values.iter().find(|v| v.name == name).map(|v| v.number)
    }

    /// Name of the value with the given ordinal.
    pub fn name_of(&self, number: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.number == number)
            .map(|v| v.name.as_str())
    }
}

/// Immutable metadata of one field as the validation engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDeclaration {
    name: String,
    full_name: String,
    field_type: FieldType,
    cardinality: Cardinality,
    entity_id: bool,
    command_id: bool,
}

impl FieldDeclaration {
    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `pkg.Message.field`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Declared type; for maps, the value type.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Cardinality.
    pub fn cardinality(&self) -> &Cardinality {
        &self.cardinality
    }

    /// Effective element category. Map fields report the value category.
    pub fn category(&self) -> ValueCategory {
        self.field_type.category()
    }

    /// True for repeated (non-map) fields.
    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    /// True for map fields.
    pub fn is_map(&self) -> bool {
        matches!(self.cardinality, Cardinality::Map { .. })
    }

    /// True for repeated and map fields.
    pub fn is_collection(&self) -> bool {
        self.cardinality != Cardinality::Singular
    }

    /// True for singular fields.
    pub fn is_not_collection(&self) -> bool {
        !self.is_collection()
    }

    /// True for the first field of an entity-state message.
    pub fn is_entity_id(&self) -> bool {
        self.entity_id
    }

    /// True for the first field of a command message.
    pub fn is_command_id(&self) -> bool {
        self.command_id
    }

    /// Declaration of the keys of a map field.
    pub fn key_declaration(&self) -> Option<FieldDeclaration> {
        match &self.cardinality {
            Cardinality::Map { key } => Some(self.entry_part("key", key.clone())),
            _ => None,
        }
    }

    /// Declaration of the values of a map field.
    pub fn value_declaration(&self) -> Option<FieldDeclaration> {
        match &self.cardinality {
            Cardinality::Map { .. } => Some(self.entry_part("value", self.field_type.clone())),
            _ => None,
        }
    }

    fn entry_part(&self, part: &str, field_type: FieldType) -> FieldDeclaration {
        FieldDeclaration {
            name: part.to_string(),
            full_name: format!("{}.{}", self.full_name, part),
            field_type,
            cardinality: Cardinality::Singular,
            entity_id: false,
            command_id: false,
        }
    }
}
