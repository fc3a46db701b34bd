use crate::error::ValidationError;
use crate::field_value::FieldValue;
use crate::validator::value_not_set;
use crate::violation::ConstraintViolation;

use super::{violation, ValidatingOption};

/// Default message of a missing required value.
pub(crate) const MISSING_VALUE: &str = "A value must be set.";

/// `required: true`. Applies to every category.
///
/// Identifier fields are checked by the identifier convention instead, so a
/// missing entity ID is reported once.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl ValidatingOption for Required {
    fn name(&self) -> &str {
        "required"
    }

    fn is_present(&self, value: &FieldValue<'_>) -> bool {
        value.options().required == Some(true) && !value.is_required_identifier()
    }

    fn applies_to(&self, _value: &FieldValue<'_>) -> bool {
        true
    }

    fn check(&self, value: &FieldValue<'_>) -> Result<Vec<ConstraintViolation>, ValidationError> {
        if !value_not_set(value) {
            return Ok(Vec::new());
        }
        let custom = value
            .options()
            .if_missing
            .as_ref()
            .and_then(|m| m.msg_format.as_deref());
        Ok(vec![violation(custom, MISSING_VALUE, Vec::new(), value.path())])
    }
}
