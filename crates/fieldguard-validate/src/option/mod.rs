//! # Validating Options
//!
//! A [`ValidatingOption`] is one kind of constraint a schema author can attach
//! to a field. Evaluating an option against a field value is always:
//!
//! 1. option not present on the field: no violations;
//! 2. present but not applicable to the field: authoring error;
//! 3. otherwise: the option's own check.
//!
//! [`ValidatingOption::validate_against`] implements that sequence once;
//! options supply the three predicates and the check. Host-defined options
//! read their settings from [`FieldOptions::custom`](fieldguard_core::FieldOptions).

mod bounds;
mod digits;
mod distinct;
mod pattern;
mod required;

pub use bounds::{Max, Min, Range};
pub use digits::Digits;
pub use distinct::Distinct;
pub use pattern::Pattern;
pub use required::Required;

pub(crate) use required::MISSING_VALUE;

use std::fmt;

use fieldguard_core::FieldPath;

use crate::error::ValidationError;
use crate::field_value::FieldValue;
use crate::violation::ConstraintViolation;

/// One constraint kind.
pub trait ValidatingOption: fmt::Debug + Send + Sync {
    /// Option name as written in schemas.
    fn name(&self) -> &str;

    /// True when the option is set on the field.
    fn is_present(&self, value: &FieldValue<'_>) -> bool;

    /// True when the option can check a field of this category and cardinality.
    fn applies_to(&self, value: &FieldValue<'_>) -> bool;

    /// Checks a field on which the option is present and applicable.
    fn check(&self, value: &FieldValue<'_>) -> Result<Vec<ConstraintViolation>, ValidationError>;

    /// Evaluates the option against a field.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OptionInapplicable`] when the option is set
    /// on a field it cannot check, and any error from [`Self::check`].
    fn validate_against(
        &self,
        value: &FieldValue<'_>,
    ) -> Result<Vec<ConstraintViolation>, ValidationError> {
        if !self.is_present(value) {
            return Ok(Vec::new());
        }
        if !self.applies_to(value) {
            return Err(inapplicable(self.name(), value));
        }
        tracing::trace!(option = self.name(), field = value.declaration().full_name(), "checking option");
        self.check(value)
    }
}

/// The authoring error for an option set where it cannot apply.
pub(crate) fn inapplicable(option: &str, value: &FieldValue<'_>) -> ValidationError {
    ValidationError::OptionInapplicable {
        option: option.to_string(),
        field: value.declaration().full_name().to_string(),
        category: value.declaration().category(),
    }
}

/// The authoring error for an option whose setting cannot be evaluated.
pub(crate) fn invalid(option: &str, value: &FieldValue<'_>, reason: impl fmt::Display) -> ValidationError {
    ValidationError::InvalidOption {
        option: option.to_string(),
        field: value.declaration().full_name().to_string(),
        reason: reason.to_string(),
    }
}

/// A violation at the field's path using the custom format if one is set.
pub(crate) fn violation(
    custom: Option<&str>,
    default_format: &str,
    params: Vec<String>,
    path: &FieldPath,
) -> ConstraintViolation {
    ConstraintViolation::new(custom.unwrap_or(default_format), params, path.clone())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::borrow::Cow;

    use fieldguard_core::{FieldData, FieldDescriptor, FieldPath, MessageDescriptor};

    use crate::field_value::{FieldContext, FieldValue};

    /// A field value for `field` declared on a throwaway message.
    pub(crate) fn field_value(field: FieldDescriptor, data: Option<&FieldData>) -> FieldValue<'_> {
        let name = field.name.clone();
        let options = field.options.clone();
        let decl = MessageDescriptor::new("acme.Sample")
            .with_field(field)
            .declaration(&name)
            .unwrap();
        FieldValue::of(decl, Cow::Owned(options), data, FieldContext::new(FieldPath::of(name), 0))
            .unwrap()
    }
}
