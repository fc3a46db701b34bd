use fieldguard_core::Value;

use crate::error::ValidationError;
use crate::field_value::FieldValue;
use crate::violation::ConstraintViolation;

use super::{violation, ValidatingOption};

const DUPLICATES: &str = "Values must be distinct.";

/// `distinct: true`. Repeated and map fields only.
///
/// Reports one violation per field; its parameters are the duplicated
/// values, each listed once.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distinct;

impl ValidatingOption for Distinct {
    fn name(&self) -> &str {
        "distinct"
    }

    fn is_present(&self, value: &FieldValue<'_>) -> bool {
        value.options().distinct == Some(true)
    }

    fn applies_to(&self, value: &FieldValue<'_>) -> bool {
        value.declaration().is_collection()
    }

    fn check(&self, value: &FieldValue<'_>) -> Result<Vec<ConstraintViolation>, ValidationError> {
        let duplicates = duplicates(value.values());
        if duplicates.is_empty() {
            return Ok(Vec::new());
        }
        let params = duplicates.iter().map(ToString::to_string).collect();
        Ok(vec![violation(None, DUPLICATES, params, value.path())])
    }
}

/// Values occurring more than once, in order of their second occurrence.
fn duplicates(values: &[Value]) -> Vec<&Value> {
    let mut found: Vec<&Value> = Vec::new();
    for (i, v) in values.iter().enumerate() {
        if values[..i].contains(v) && !found.contains(&v) {
            found.push(v);
        }
    }
    found
}
