//! # fieldguard-core — Foundational Types for fieldguard
//!
//! This crate is the leaf of the fieldguard workspace. It defines the static
//! schema model that validation options are attached to, the dynamic value
//! model that decoded message instances are expressed in, and the small
//! field-reference language used by cross-field and cross-message options.
//!
//! ## Key Design Principles
//!
//! 1. **Closed value categories.** [`ValueCategory`] has exactly nine variants
//!    (message, four numeric kinds, string, bytes, bool, enum). Every consumer
//!    matches it exhaustively, so adding a category is a compile-time change.
//!
//! 2. **Derived declarations.** A [`FieldDeclaration`] is computed once from
//!    its owning [`MessageDescriptor`]; the entity-id and command-id convention
//!    flags never live in the schema files themselves.
//!
//! 3. **Typed reference errors.** Parsing `Type.field`, `*.field` and
//!    `a|b` reference strings produces [`ReferenceError`] variants rather than
//!    generic argument errors.
//!
//! 4. **Registries are collaborators.** The engine only needs the
//!    [`TypeRegistry`] trait; [`SchemaSet`] is an in-memory implementation
//!    loaded from YAML or JSON bundles.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `fieldguard-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod decode;
pub mod error;
pub mod path;
pub mod reference;
pub mod registry;
pub mod schema;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use decode::decode_message;
pub use error::{DecodeError, FieldguardError, ReferenceError, SchemaError};
pub use path::FieldPath;
pub use reference::FieldReference;
pub use registry::{SchemaSet, TypeRegistry};
pub use schema::{
    BoundOption, Cardinality, DigitsOption, EnumDescriptor, EnumValue, FieldDeclaration,
    FieldDescriptor, FieldOptions, FieldType, IfMissingOption, MessageDescriptor, MessageOptions,
    MessageRole, PatternModifier, PatternOption, ValueCategory,
};
pub use value::{FieldData, MapKey, MessageValue, Value};
