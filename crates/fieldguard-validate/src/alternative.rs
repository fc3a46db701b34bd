//! # Alternative-Required Fields
//!
//! The `required_field` message option lists field names separated by `|`.
//! At least one of them must be set; otherwise the message gets a single
//! violation at its root path.

use fieldguard_core::{FieldPath, FieldReference, MessageDescriptor, MessageValue};

use crate::error::ValidationError;
use crate::violation::ConstraintViolation;

const NONE_SET: &str = "None of the fields match the `required_field` definition: %s";

/// Parses `required_field` of `descriptor` into field names.
///
/// # Errors
///
/// Returns an error for malformed references, references that are not bare
/// field names, and names the message does not declare.
pub(crate) fn alternatives(descriptor: &MessageDescriptor) -> Result<Vec<String>, ValidationError> {
    let Some(raw) = descriptor.options.required_field.as_deref() else {
        return Ok(Vec::new());
    };
    let references =
        FieldReference::parse_alternatives(raw).map_err(|source| ValidationError::Reference {
            message: descriptor.full_name.clone(),
            source,
        })?;
    references
        .into_iter()
        .map(|reference| {
            if !reference.is_inner() {
                return Err(ValidationError::InvalidAlternative {
                    message: descriptor.full_name.clone(),
                    reference: reference.to_string(),
                });
            }
            let name = reference.field_name();
            if descriptor.field(name).is_none() {
                return Err(ValidationError::UnknownField {
                    type_name: descriptor.full_name.clone(),
                    field: name.to_string(),
                });
            }
            Ok(name.to_string())
        })
        .collect()
}

/// Checks `required_field` of `descriptor` against `message`.
pub(crate) fn check_alternatives(
    descriptor: &MessageDescriptor,
    message: &MessageValue,
) -> Result<Option<ConstraintViolation>, ValidationError> {
    let names = alternatives(descriptor)?;
    if names.is_empty() {
        return Ok(None);
    }
    let any_set = names
        .iter()
        .any(|name| message.get(name).is_some_and(|data| !data.is_default()));
    if any_set {
        return Ok(None);
    }
    let raw = descriptor.options.required_field.as_deref().unwrap_or_default();
    Ok(Some(ConstraintViolation::new(
        NONE_SET,
        vec![raw.trim().to_string()],
        FieldPath::root(),
    )))
}
