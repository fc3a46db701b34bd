//! # Message Validation
//!
//! Validates one message instance: every declared field in declaration order,
//! then the `required_field` alternatives. Violations are relative to the
//! message's own root; the caller prefixes them when the message is nested.

use std::borrow::Cow;

use fieldguard_core::{FieldPath, MessageDescriptor, MessageValue, TypeRegistry};

use crate::alternative::check_alternatives;
use crate::config::EngineConfig;
use crate::error::ValidationError;
use crate::external::ExternalConstraints;
use crate::field_value::{FieldContext, FieldValue};
use crate::registry::OptionRegistry;
use crate::validator::validate_field;
use crate::violation::ConstraintViolation;

/// Borrowed view of an engine for the duration of one validation call.
pub(crate) struct MessageValidator<'e> {
    pub(crate) registry: &'e dyn TypeRegistry,
    pub(crate) options: &'e OptionRegistry,
    pub(crate) config: &'e EngineConfig,
    pub(crate) constraints: &'e ExternalConstraints,
}

impl<'e> MessageValidator<'e> {
    /// The option registry.
    pub(crate) fn options(&self) -> &'e OptionRegistry {
        self.options
    }

    /// True when messages of `type_name` are not recursed into.
    pub(crate) fn is_well_known(&self, type_name: &str) -> bool {
        self.config.is_well_known(type_name)
    }

    /// The rule message of the external constraint targeting `field`.
    pub(crate) fn constraint_for(&self, field: &str) -> Option<&'e MessageDescriptor> {
        self.constraints.for_target(field).map(|c| c.rule())
    }

    /// Validates `message`, found `depth` levels below the validated root.
    ///
    /// `rule` carries the options of an external constraint that override the
    /// message's own field options.
    pub(crate) fn validate(
        &self,
        message: &MessageValue,
        rule: Option<&MessageDescriptor>,
        depth: usize,
    ) -> Result<Vec<ConstraintViolation>, ValidationError> {
        if depth > self.config.max_depth {
            return Err(ValidationError::DepthExceeded {
                max_depth: self.config.max_depth,
                path: message.type_name().to_string(),
            });
        }
        let descriptor = self
            .registry
            .find_message(message.type_name())
            .ok_or_else(|| ValidationError::UnknownType(message.type_name().to_string()))?;

        if let Some(undeclared) = message.field_names().find(|name| descriptor.field(name).is_none()) {
            return Err(ValidationError::UnknownField {
                type_name: descriptor.full_name.clone(),
                field: undeclared.to_string(),
            });
        }

        let mut violations = Vec::new();
        for (field, declaration) in descriptor.fields.iter().zip(descriptor.declarations()) {
            let options = match rule.and_then(|r| r.field(&field.name)) {
                Some(overriding) => Cow::Owned(field.options.overlay(&overriding.options)),
                None => Cow::Borrowed(&field.options),
            };
            let value = FieldValue::of(
                declaration,
                options,
                message.get(&field.name),
                FieldContext::new(FieldPath::of(field.name.clone()), depth),
            )?;
            violations.extend(validate_field(&value, self)?);
        }
        violations.extend(check_alternatives(descriptor, message)?);
        Ok(violations)
    }
}
