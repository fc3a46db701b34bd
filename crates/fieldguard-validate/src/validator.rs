//! # Field Validators
//!
//! Validates one [`FieldValue`]. The sequence is fixed:
//!
//! 1. identifier convention (entity or command ID);
//! 2. the category's own rules; message fields recurse into the nested
//!    message here;
//! 3. every option registered for the category.
//!
//! Dispatch matches [`ValueCategory`] exhaustively, so a new category has to
//! state its "not set" semantics and own rules before the crate compiles.

use fieldguard_core::{Value, ValueCategory};

use crate::error::ValidationError;
use crate::field_value::FieldValue;
use crate::message::MessageValidator;
use crate::option::{inapplicable, MISSING_VALUE};
use crate::violation::ConstraintViolation;

const REPEATED_ENTITY_ID: &str = "Entity ID field `%s` must not be a repeated field.";
const REPEATED_COMMAND_ID: &str = "Command ID field `%s` must not be a repeated field.";

/// True when the field counts as not set for its category.
///
/// A collection is not set when empty. A singular numeric or bool field is
/// always set; zero is a legitimate value.
pub(crate) fn value_not_set(value: &FieldValue<'_>) -> bool {
    let Some(first) = value.values().first() else {
        return true;
    };
    if value.declaration().is_collection() {
        return false;
    }
    match value.declaration().category() {
        ValueCategory::Message | ValueCategory::String | ValueCategory::Bytes => first.is_default(),
        ValueCategory::Enum => matches!(first, Value::Enum(ordinal) if *ordinal <= 0),
        ValueCategory::Int32
        | ValueCategory::Int64
        | ValueCategory::Float
        | ValueCategory::Double
        | ValueCategory::Bool => false,
    }
}

/// Validates one field of a message.
pub(crate) fn validate_field(
    value: &FieldValue<'_>,
    messages: &MessageValidator<'_>,
) -> Result<Vec<ConstraintViolation>, ValidationError> {
    let mut violations = check_identifier(value);
    violations.extend(own_rules(value, messages)?);
    violations.extend(option_violations(value, messages)?);
    Ok(violations)
}

fn check_identifier(value: &FieldValue<'_>) -> Vec<ConstraintViolation> {
    if !value.is_required_identifier() {
        return Vec::new();
    }
    let decl = value.declaration();
    if decl.is_collection() {
        let format = if decl.is_command_id() {
            REPEATED_COMMAND_ID
        } else {
            REPEATED_ENTITY_ID
        };
        return vec![ConstraintViolation::new(
            format,
            vec![decl.full_name().to_string()],
            value.path().clone(),
        )];
    }
    if !value_not_set(value) {
        return Vec::new();
    }
    let format = value
        .options()
        .if_missing
        .as_ref()
        .and_then(|m| m.msg_format.as_deref())
        .unwrap_or(MISSING_VALUE);
    vec![ConstraintViolation::new(format, Vec::new(), value.path().clone())]
}

fn own_rules(
    value: &FieldValue<'_>,
    messages: &MessageValidator<'_>,
) -> Result<Vec<ConstraintViolation>, ValidationError> {
    match value.declaration().category() {
        ValueCategory::Message => nested_messages(value, messages),
        ValueCategory::Int32
        | ValueCategory::Int64
        | ValueCategory::Float
        | ValueCategory::Double
        | ValueCategory::String
        | ValueCategory::Bytes
        | ValueCategory::Bool
        | ValueCategory::Enum => Ok(Vec::new()),
    }
}

/// Validates every element of a message field carried by the instance,
/// prefixing the nested violations with the field's path.
///
/// An absent field is not recursed into. A present element is validated
/// even when all of its fields hold defaults.
fn nested_messages(
    value: &FieldValue<'_>,
    messages: &MessageValidator<'_>,
) -> Result<Vec<ConstraintViolation>, ValidationError> {
    if !value.is_present() {
        return Ok(Vec::new());
    }
    let rule = messages.constraint_for(value.declaration().full_name());
    let mut violations = Vec::new();
    for nested in value.values().iter().filter_map(Value::as_message) {
        if messages.is_well_known(nested.type_name()) {
            continue;
        }
        let found = messages.validate(nested, rule, value.context().depth() + 1)?;
        violations.extend(found.iter().map(|v| v.prefixed(value.path())));
    }
    Ok(violations)
}

fn option_violations(
    value: &FieldValue<'_>,
    messages: &MessageValidator<'_>,
) -> Result<Vec<ConstraintViolation>, ValidationError> {
    let registry = messages.options();
    let category = value.declaration().category();

    if let Some(option) = value.options().custom.keys().find(|name| !registry.is_registered(name)) {
        return Err(ValidationError::UnknownOption {
            option: option.clone(),
            field: value.declaration().full_name().to_string(),
        });
    }
    if let Some(option) = registry
        .misplaced(category)
        .into_iter()
        .find(|option| option.is_present(value))
    {
        return Err(inapplicable(option.name(), value));
    }

    let mut violations = Vec::new();
    for option in registry.options_for(category) {
        violations.extend(option.validate_against(value)?);
    }
    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::testing::field_value;
    use fieldguard_core::{FieldData, FieldDescriptor, FieldType};

    #[test]
    fn test_not_set_per_category() {
        let string = FieldDescriptor::new("s", FieldType::String);
        assert!(value_not_set(&field_value(string.clone(), None)));
        let data = FieldData::single("x");
        assert!(!value_not_set(&field_value(string, Some(&data))));

        assert!(!value_not_set(&field_value(FieldDescriptor::new("n", FieldType::Double), None)));
        assert!(!value_not_set(&field_value(FieldDescriptor::new("b", FieldType::Bool), None)));

        let enum_field = FieldDescriptor::new("e", FieldType::Enum("acme.E".into()));
        let negative = FieldData::Single(Value::Enum(-1));
        assert!(value_not_set(&field_value(enum_field.clone(), Some(&negative))));
        let positive = FieldData::Single(Value::Enum(3));
        assert!(!value_not_set(&field_value(enum_field, Some(&positive))));
    }

    #[test]
    fn test_collections_set_when_non_empty() {
        let field = FieldDescriptor::new("ns", FieldType::Int32).repeated();
        assert!(value_not_set(&field_value(field.clone(), None)));
        let data = FieldData::repeated([0i32]);
        assert!(!value_not_set(&field_value(field, Some(&data))));
    }

    #[test]
    fn test_message_not_set_when_default() {
        let field = FieldDescriptor::new("m", FieldType::Message("acme.M".into()));
        assert!(value_not_set(&field_value(field, None)));
    }
}
