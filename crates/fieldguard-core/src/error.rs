//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by every fieldguard crate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Reference parse failures are distinct variants, one per malformed shape.
//! - Schema errors name the offending type and field.
//! - Decode errors carry the dotted path of the value that failed to decode.
//!
//! None of these describe a constraint violation. Violations are data and are
//! returned as values by the validation engine.

use thiserror::Error;

/// Top-level error type for fieldguard.
#[derive(Error, Debug)]
pub enum FieldguardError {
    /// A field reference string could not be parsed or resolved.
    #[error("field reference error: {0}")]
    Reference(#[from] ReferenceError),

    /// A schema bundle is malformed or inconsistent.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A message instance does not conform to its schema.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The schema carries a validation option that cannot be evaluated.
    #[error("validation configuration error: {0}")]
    Validation(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error while parsing or resolving a field reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// The reference, or the type reference passed for a wildcard check, is empty or blank.
    #[error("field reference must not be empty or blank")]
    Blank,

    /// A `*` was given without the `.field_name` suffix.
    #[error("wildcard `*` must be followed by `.field_name`")]
    LoneWildcard,

    /// A wildcard was given in a suffix form such as `*Event`.
    #[error("wildcard type reference must be a single `*`, got `{0}`")]
    SuffixWildcard(String),

    /// One of the dot-separated segments is empty, e.g. `.field` or `Type.`.
    #[error("field reference `{reference}` contains an empty segment")]
    EmptySegment {
        /// The rejected reference.
        reference: String,
    },

    /// A segment is not a valid identifier.
    #[error("`{segment}` in field reference `{reference}` is not a valid identifier")]
    InvalidIdentifier {
        /// The rejected reference.
        reference: String,
        /// The offending segment.
        segment: String,
    },

    /// A pipe-separated list was given where a single reference is expected.
    #[error("`{0}` lists alternatives; parse it with `FieldReference::parse_alternatives`")]
    UnexpectedAlternatives(String),

    /// A typed reference was resolved against a message of another type.
    #[error("reference `{reference}` targets type `{expected}`, not `{actual}`")]
    TypeMismatch {
        /// The reference being resolved.
        reference: String,
        /// The type named by the reference.
        expected: String,
        /// The full name of the message it was resolved against.
        actual: String,
    },
}

/// Error in a schema bundle.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Two message or enum descriptors share a full name.
    #[error("type `{0}` is declared more than once")]
    DuplicateType(String),

    /// A message declares two fields with the same name.
    #[error("message `{message}` declares field `{field}` more than once")]
    DuplicateField {
        /// Full name of the message.
        message: String,
        /// The repeated field name.
        field: String,
    },

    /// A field refers to a message or enum type the bundle does not declare.
    #[error("field `{field}` refers to unknown type `{type_name}`")]
    UnknownType {
        /// Full name of the referring field.
        field: String,
        /// The unresolved type name.
        type_name: String,
    },

    /// A map field uses a key type protobuf does not allow.
    #[error("map field `{field}` cannot use `{key}` as a key type")]
    InvalidMapKey {
        /// Full name of the map field.
        field: String,
        /// The rejected key type.
        key: String,
    },

    /// The bundle could not be parsed.
    #[error("schema load error for '{source_name}': {reason}")]
    Load {
        /// File name or other identifier of the bundle.
        source_name: String,
        /// Reason the bundle could not be parsed.
        reason: String,
    },

    /// IO error reading a bundle.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error while decoding a JSON document into a message value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The registry does not know the requested message type.
    #[error("unknown message type `{0}`")]
    UnknownType(String),

    /// A JSON object was expected.
    #[error("{path}: expected a JSON object for message `{type_name}`")]
    ExpectedObject {
        /// Dotted path of the value.
        path: String,
        /// Message type being decoded.
        type_name: String,
    },

    /// The document contains a field the message does not declare.
    #[error("{path}: message `{type_name}` has no field `{field}`")]
    UnknownField {
        /// Dotted path of the enclosing message.
        path: String,
        /// Message type being decoded.
        type_name: String,
        /// The undeclared field.
        field: String,
    },

    /// A value has the wrong JSON shape for its declared type.
    #[error("{path}: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Dotted path of the value.
        path: String,
        /// Expected shape.
        expected: String,
        /// The JSON shape found.
        actual: String,
    },

    /// A number does not fit the declared numeric type.
    #[error("{path}: {value} is out of range for {expected}")]
    OutOfRange {
        /// Dotted path of the value.
        path: String,
        /// The offending literal.
        value: String,
        /// Declared numeric type.
        expected: String,
    },

    /// An enum value name is not declared by the enum type.
    #[error("{path}: enum `{enum_name}` has no value `{value}`")]
    UnknownEnumValue {
        /// Dotted path of the value.
        path: String,
        /// Full name of the enum.
        enum_name: String,
        /// The unknown value name.
        value: String,
    },

    /// A bytes field is not valid base64.
    #[error("{path}: invalid base64 bytes: {reason}")]
    InvalidBytes {
        /// Dotted path of the value.
        path: String,
        /// Decoder message.
        reason: String,
    },
}
