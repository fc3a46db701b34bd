use crate::error::ValidationError;
use crate::field_value::FieldValue;
use crate::number::Number;
use crate::violation::ConstraintViolation;

use super::{invalid, violation, ValidatingOption};

const TOO_MANY_DIGITS: &str =
    "The number must have at most %s integer digits and %s fraction digits.";

/// `digits: { integer_max, fraction_max }`. Numeric fields only.
///
/// Counts decimal digits of the shortest representation of each value.
/// Infinite values are not counted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Digits;

/// Integer and fraction digit counts of a number.
fn digit_counts(n: Number) -> Option<(usize, usize)> {
    let text = match n {
        Number::Int(i) => i.unsigned_abs().to_string(),
        Number::Float(f) if f.is_finite() => f.abs().to_string(),
        Number::Float32(f) if f.is_finite() => f.abs().to_string(),
        Number::Float(_) | Number::Float32(_) => return None,
    };
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    Some((integer.len(), fraction.len()))
}

impl ValidatingOption for Digits {
    fn name(&self) -> &str {
        "digits"
    }

    fn is_present(&self, value: &FieldValue<'_>) -> bool {
        value.options().digits.is_some()
    }

    fn applies_to(&self, value: &FieldValue<'_>) -> bool {
        value.declaration().category().is_numeric()
    }

    fn check(&self, value: &FieldValue<'_>) -> Result<Vec<ConstraintViolation>, ValidationError> {
        let Some(option) = value.options().digits.as_ref() else {
            return Ok(Vec::new());
        };
        if option.integer_max == 0 {
            return Err(invalid(self.name(), value, "`integer_max` must be positive"));
        }
        let integer_max = option.integer_max as usize;
        let fraction_max = option.fraction_max as usize;
        Ok(value
            .values()
            .iter()
            .filter_map(Number::from_value)
            .filter(|n| {
                digit_counts(*n)
                    .is_some_and(|(int, frac)| int > integer_max || frac > fraction_max)
            })
            .map(|n| {
                violation(
                    option.msg_format.as_deref(),
                    TOO_MANY_DIGITS,
                    vec![
                        option.integer_max.to_string(),
                        option.fraction_max.to_string(),
                        n.to_string(),
                    ],
                    value.path(),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::testing::field_value;
    use fieldguard_core::{DigitsOption, FieldData, FieldDescriptor, FieldOptions, FieldType};

    fn amount(integer_max: u32, fraction_max: u32) -> FieldDescriptor {
        FieldDescriptor::new("amount", FieldType::Double).with_options(FieldOptions {
            digits: Some(DigitsOption {
                integer_max,
                fraction_max,
                msg_format: None,
            }),
            ..Default::default()
        })
    }

    #[test]
    fn test_digit_counts() {
        assert_eq!(digit_counts(Number::Int(-1234)), Some((4, 0)));
        assert_eq!(digit_counts(Number::Float(12.25)), Some((2, 2)));
        assert_eq!(digit_counts(Number::Float(0.0)), Some((1, 0)));
        assert_eq!(digit_counts(Number::Float(f64::INFINITY)), None);
        assert_eq!(digit_counts(Number::Float32(0.1)), Some((1, 1)));
        assert_eq!(digit_counts(Number::Float32(f32::NEG_INFINITY)), None);
    }

    #[test]
    fn test_within_limits() {
        let data = FieldData::single(99.99f64);
        let value = field_value(amount(2, 2), Some(&data));
        assert!(Digits.validate_against(&value).unwrap().is_empty());
    }

    #[test]
    fn test_too_many_fraction_digits() {
        let data = FieldData::single(9.125f64);
        let value = field_value(amount(2, 2), Some(&data));
        let violations = Digits.validate_against(&value).unwrap();
        assert_eq!(
            violations[0].message(),
            "The number must have at most 2 integer digits and 2 fraction digits."
        );
    }

    #[test]
    fn test_float_field_counts_single_precision_digits() {
        let price = FieldDescriptor::new("price", FieldType::Float).with_options(FieldOptions {
            digits: Some(DigitsOption {
                integer_max: 3,
                fraction_max: 2,
                msg_format: None,
            }),
            ..Default::default()
        });
        let data = FieldData::single(0.1f32);
        let value = field_value(price.clone(), Some(&data));
        assert!(Digits.validate_against(&value).unwrap().is_empty());

        let data = FieldData::single(0.125f32);
        let value = field_value(price, Some(&data));
        let violations = Digits.validate_against(&value).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].params()[2], "0.125");
    }

    #[test]
    fn test_zero_integer_max_is_authoring_error() {
        let value = field_value(amount(0, 2), None);
        assert!(matches!(
            Digits.validate_against(&value),
            Err(ValidationError::InvalidOption { .. })
        ));
    }
}
