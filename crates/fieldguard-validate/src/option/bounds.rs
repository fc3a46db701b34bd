//! `range`, `min` and `max`: numeric bounds checked per element.

use fieldguard_core::BoundOption;

use crate::error::ValidationError;
use crate::field_value::FieldValue;
use crate::number::{Number, NumberRange};
use crate::violation::ConstraintViolation;

use super::{invalid, violation, ValidatingOption};

const OUT_OF_RANGE: &str = "The number must be in range %s.";
const BELOW_MIN: &str = "The number must be greater than or equal to %s.";
const BELOW_EXCLUSIVE_MIN: &str = "The number must be greater than %s.";
const ABOVE_MAX: &str = "The number must be less than or equal to %s.";
const ABOVE_EXCLUSIVE_MAX: &str = "The number must be less than %s.";

fn numbers<'v>(value: &'v FieldValue<'_>) -> impl Iterator<Item = Number> + 'v {
    value.values().iter().filter_map(Number::from_value)
}

/// `range: "[a, b]"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Range;

impl ValidatingOption for Range {
    fn name(&self) -> &str {
        "range"
    }

    fn is_present(&self, value: &FieldValue<'_>) -> bool {
        value.options().range.is_some()
    }

    fn applies_to(&self, value: &FieldValue<'_>) -> bool {
        value.declaration().category().is_numeric()
    }

    fn check(&self, value: &FieldValue<'_>) -> Result<Vec<ConstraintViolation>, ValidationError> {
        let Some(token) = value.options().range.as_deref() else {
            return Ok(Vec::new());
        };
        let range = NumberRange::parse(token).map_err(|e| invalid(self.name(), value, e))?;
        Ok(numbers(value)
            .filter(|n| !range.contains(*n))
            .map(|n| {
                violation(
                    None,
                    OUT_OF_RANGE,
                    vec![token.trim().to_string(), n.to_string()],
                    value.path(),
                )
            })
            .collect())
    }
}

/// Which side a [`BoundOption`] limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Lower,
    Upper,
}

fn check_bound(
    name: &str,
    side: Side,
    option: &BoundOption,
    value: &FieldValue<'_>,
) -> Result<Vec<ConstraintViolation>, ValidationError> {
    let bound = Number::parse(&option.value)
        .ok_or_else(|| invalid(name, value, format!("`{}` is not a number", option.value)))?;
    let default_format = match (side, option.exclusive) {
        (Side::Lower, false) => BELOW_MIN,
        (Side::Lower, true) => BELOW_EXCLUSIVE_MIN,
        (Side::Upper, false) => ABOVE_MAX,
        (Side::Upper, true) => ABOVE_EXCLUSIVE_MAX,
    };
    let within = |n: Number| match (side, option.exclusive) {
        (Side::Lower, false) => n >= bound,
        (Side::Lower, true) => n > bound,
        (Side::Upper, false) => n <= bound,
        (Side::Upper, true) => n < bound,
    };
    Ok(numbers(value)
        .filter(|n| !within(*n))
        .map(|n| {
            violation(
                option.msg_format.as_deref(),
                default_format,
                vec![option.value.trim().to_string(), n.to_string()],
                value.path(),
            )
        })
        .collect())
}

/// `min: { value, exclusive }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

impl ValidatingOption for Min {
    fn name(&self) -> &str {
        "min"
    }

    fn is_present(&self, value: &FieldValue<'_>) -> bool {
        value.options().min.is_some()
    }

    fn applies_to(&self, value: &FieldValue<'_>) -> bool {
        value.declaration().category().is_numeric()
    }

    fn check(&self, value: &FieldValue<'_>) -> Result<Vec<ConstraintViolation>, ValidationError> {
        match value.options().min.as_ref() {
            Some(option) => check_bound(self.name(), Side::Lower, option, value),
            None => Ok(Vec::new()),
        }
    }
}

/// `max: { value, exclusive }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

impl ValidatingOption for Max {
    fn name(&self) -> &str {
        "max"
    }

    fn is_present(&self, value: &FieldValue<'_>) -> bool {
        value.options().max.is_some()
    }

    fn applies_to(&self, value: &FieldValue<'_>) -> bool {
        value.declaration().category().is_numeric()
    }

    fn check(&self, value: &FieldValue<'_>) -> Result<Vec<ConstraintViolation>, ValidationError> {
        match value.options().max.as_ref() {
            Some(option) => check_bound(self.name(), Side::Upper, option, value),
            None => Ok(Vec::new()),
        }
    }
}
