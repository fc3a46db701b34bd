//! # Engine Errors
//!
//! A [`ValidationError`] means the schema or the engine setup is wrong, not
//! the data. Data problems are reported as
//! [`ConstraintViolation`](crate::ConstraintViolation) values instead.

use fieldguard_core::{DecodeError, ReferenceError, ValueCategory};
use thiserror::Error;

/// Authoring or configuration error raised during validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// An option is set on a field whose category it cannot check.
    #[error("option `{option}` cannot be applied to field `{field}` of category `{category}`")]
    OptionInapplicable {
        /// Option name.
        option: String,
        /// Full name of the field.
        field: String,
        /// Category of the field.
        category: ValueCategory,
    },

    /// An option carries a value that cannot be evaluated, such as a bad regex.
    #[error("option `{option}` on field `{field}` is invalid: {reason}")]
    InvalidOption {
        /// Option name.
        option: String,
        /// Full name of the field.
        field: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// A field carries a custom option no registered option understands.
    #[error("field `{field}` carries unregistered option `{option}`")]
    UnknownOption {
        /// Option name.
        option: String,
        /// Full name of the field.
        field: String,
    },

    /// A message option holds a malformed field reference.
    #[error("invalid field reference in message `{message}`: {source}")]
    Reference {
        /// Full name of the message carrying the option.
        message: String,
        /// Parse failure.
        #[source]
        source: ReferenceError,
    },

    /// A `required_field` alternative is not a bare field name.
    #[error("`required_field` of `{message}` must list bare field names, got `{reference}`")]
    InvalidAlternative {
        /// Full name of the message.
        message: String,
        /// The offending reference.
        reference: String,
    },

    /// The registry does not know a message type.
    #[error("unknown message type `{0}`")]
    UnknownType(String),

    /// A message value or option names a field its type does not declare.
    #[error("message `{type_name}` has no field `{field}`")]
    UnknownField {
        /// Full name of the message type.
        type_name: String,
        /// The undeclared field.
        field: String,
    },

    /// A field value does not have the shape or category of its declaration.
    #[error("value of field `{field}` does not match its declaration: expected {expected}, found {actual}")]
    ShapeMismatch {
        /// Full name of the field.
        field: String,
        /// Declared shape or category.
        expected: String,
        /// Shape or category of the value.
        actual: String,
    },

    /// Message nesting went deeper than the configured limit.
    #[error("message nesting exceeds the maximum depth of {max_depth} at `{path}`")]
    DepthExceeded {
        /// Configured limit.
        max_depth: usize,
        /// Type name of the message that would exceed it.
        path: String,
    },

    /// An external constraint could not be built or registered.
    #[error("external constraint error: {0}")]
    External(#[from] ExternalConstraintError),

    /// A JSON instance could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The engine configuration could not be parsed.
    #[error("engine config error for '{source_name}': {reason}")]
    Config {
        /// File name or other identifier of the config.
        source_name: String,
        /// Reason the config could not be parsed.
        reason: String,
    },

    /// IO error reading configuration.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error constructing or registering an external constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalConstraintError {
    /// The constraint names no target paths.
    #[error("external constraint `{rule}` names no target fields")]
    NoPaths {
        /// Full name of the rule message.
        rule: String,
    },

    /// A target path is empty or blank.
    #[error("external constraint `{rule}` has a blank target path")]
    BlankPath {
        /// Full name of the rule message.
        rule: String,
    },

    /// A target path is not of the form `pkg.Owner.field`.
    #[error("target `{path}` of external constraint `{rule}` must have the form `pkg.Type.field`")]
    InvalidPath {
        /// Full name of the rule message.
        rule: String,
        /// The rejected path.
        path: String,
    },

    /// The owner type of a target path is unknown.
    #[error("target `{path}` of external constraint `{rule}` refers to unknown type `{owner}`")]
    UnknownOwner {
        /// Full name of the rule message.
        rule: String,
        /// The rejected path.
        path: String,
        /// The unresolved owner type.
        owner: String,
    },

    /// The owner type does not declare the target field.
    #[error("target `{path}` of external constraint `{rule}` names a field that does not exist")]
    UnknownField {
        /// Full name of the rule message.
        rule: String,
        /// The rejected path.
        path: String,
    },

    /// The target field does not hold messages.
    #[error("target `{path}` of external constraint `{rule}` is not a message field")]
    NotMessageField {
        /// Full name of the rule message.
        rule: String,
        /// The rejected path.
        path: String,
    },

    /// The rule declares a field the target message type lacks.
    #[error("external constraint `{rule}` declares field `{field}` missing from target type `{target_type}`")]
    MissingRuleField {
        /// Full name of the rule message.
        rule: String,
        /// Full name of the target message type.
        target_type: String,
        /// The unmatched rule field.
        field: String,
    },

    /// Two constraints target the same field.
    #[error("field `{path}` is targeted by both `{existing}` and `{rule}`")]
    DuplicateTarget {
        /// The contested field.
        path: String,
        /// Rule registered first.
        existing: String,
        /// Rule registered second.
        rule: String,
    },
}
