//! # Type Registry
//!
//! The validation engine resolves message and enum types by full name through
//! the [`TypeRegistry`] trait. Loading descriptors from `.proto` files is the
//! job of an external collaborator; [`SchemaSet`] is an in-memory registry
//! built from a YAML or JSON bundle:
//!
//! ```yaml
//! messages:
//!   - full_name: acme.time.LocalTime
//!     fields:
//!       - name: hour
//!         type: int32
//!         options: { range: "[0,23]" }
//! enums: []
//! ```
//!
//! ## Consistency
//!
//! [`SchemaSet::new`] rejects duplicate type names, duplicate field names,
//! invalid map key types and fields referring to undeclared types. Types under
//! `google.protobuf.` may be referenced without being declared.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::schema::{Cardinality, EnumDescriptor, MessageDescriptor};

/// Prefix of the protobuf well-known types, which may stay undeclared.
pub const WELL_KNOWN_PREFIX: &str = "google.protobuf.";

/// Lookup of message and enum descriptors by full name.
///
/// Implementations must be immutable once shared; the engine holds them
/// behind an `Arc` and validates concurrently.
pub trait TypeRegistry: Send + Sync {
    /// Finds a message descriptor.
    fn find_message(&self, full_name: &str) -> Option<&MessageDescriptor>;

    /// Finds an enum descriptor.
    fn find_enum(&self, full_name: &str) -> Option<&EnumDescriptor>;

    /// All message descriptors, in a stable order.
    fn messages(&self) -> Box<dyn Iterator<Item = &MessageDescriptor> + '_>;
}

/// Serialized shape of a bundle.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaBundle {
    #[serde(default)]
    messages: Vec<MessageDescriptor>,
    #[serde(default)]
    enums: Vec<EnumDescriptor>,
}

/// An in-memory, immutable [`TypeRegistry`].
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    messages: Vec<MessageDescriptor>,
    enums: Vec<EnumDescriptor>,
    message_index: HashMap<String, usize>,
    enum_index: HashMap<String, usize>,
}

impl SchemaSet {
    /// Builds a registry, checking the descriptors for consistency.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for duplicate names, bad map keys, or
    /// references to undeclared types.
    pub fn new(
        messages: Vec<MessageDescriptor>,
        enums: Vec<EnumDescriptor>,
    ) -> Result<Self, SchemaError> {
        let mut message_index = HashMap::new();
        for (i, message) in messages.iter().enumerate() {
            if message_index.insert(message.full_name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateType(message.full_name.clone()));
            }
        }
        let mut enum_index = HashMap::new();
        for (i, en) in enums.iter().enumerate() {
            if message_index.contains_key(&en.full_name)
                || enum_index.insert(en.full_name.clone(), i).is_some()
            {
                return Err(SchemaError::DuplicateType(en.full_name.clone()));
            }
        }

        let set = Self {
            messages,
            enums,
            message_index,
            enum_index,
        };
        set.check_fields()?;
        Ok(set)
    }

    /// Parses a YAML bundle.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Load`] for malformed YAML and any consistency
    /// error from [`SchemaSet::new`].
    pub fn from_yaml_str(source_name: &str, content: &str) -> Result<Self, SchemaError> {
        let bundle: SchemaBundle =
            serde_yaml::from_str(content).map_err(|e| SchemaError::Load {
                source_name: source_name.to_string(),
                reason: format!("invalid YAML: {e}"),
            })?;
        Self::new(bundle.messages, bundle.enums)
    }

    /// Parses a JSON bundle.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Load`] for malformed JSON and any consistency
    /// error from [`SchemaSet::new`].
    pub fn from_json_str(source_name: &str, content: &str) -> Result<Self, SchemaError> {
        let bundle: SchemaBundle =
            serde_json::from_str(content).map_err(|e| SchemaError::Load {
                source_name: source_name.to_string(),
                reason: format!("invalid JSON: {e}"),
            })?;
        Self::new(bundle.messages, bundle.enums)
    }

    /// Loads a bundle from disk, choosing the format by extension
    /// (`.json` for JSON, anything else as YAML).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        let name = path.display().to_string();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&name, &content),
            _ => Self::from_yaml_str(&name, &content),
        }
    }

    /// Number of message types.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of enum types.
    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    fn check_fields(&self) -> Result<(), SchemaError> {
        for message in &self.messages {
            let mut seen = std::collections::HashSet::new();
            for field in &message.fields {
                let full = format!("{}.{}", message.full_name, field.name);
                if !seen.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        message: message.full_name.clone(),
                        field: field.name.clone(),
                    });
                }
                if let Cardinality::Map { key } = &field.cardinality {
                    if !key.is_valid_map_key() {
                        return Err(SchemaError::InvalidMapKey {
                            field: full,
                            key: key.to_string(),
                        });
                    }
                }
                if let Some(type_name) = field.field_type.type_name() {
                    let known = self.message_index.contains_key(type_name)
                        || self.enum_index.contains_key(type_name)
                        || type_name.starts_with(WELL_KNOWN_PREFIX);
                    if !known {
                        return Err(SchemaError::UnknownType {
                            field: full,
                            type_name: type_name.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl TypeRegistry for SchemaSet {
    fn find_message(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.message_index
            .get(full_name)
            .map(|&i| &self.messages[i])
    }

    fn find_enum(&self, full_name: &str) -> Option<&EnumDescriptor> {
        self.enum_index.get(full_name).map(|&i| &self.enums[i])
    }

    fn messages(&self) -> Box<dyn Iterator<Item = &MessageDescriptor> + '_> {
        Box::new(self.messages.iter())
    }
}
