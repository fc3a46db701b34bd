use fieldguard_core::{PatternOption, ValueCategory};
use regex::{Regex, RegexBuilder};

use crate::error::ValidationError;
use crate::field_value::FieldValue;
use crate::violation::ConstraintViolation;

use super::{invalid, violation, ValidatingOption};

const MISMATCH: &str = "The string must match the regular expression `%s`.";

/// `pattern`. String fields only; checks every element.
///
/// The whole string must match unless the modifier asks for a partial match.
/// Empty strings are skipped; `required` covers them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pattern;

impl Pattern {
    fn compile(option: &PatternOption) -> Result<Regex, regex::Error> {
        let modifier = option.modifier;
        let source = if modifier.partial_match {
            option.regex.clone()
        } else {
            format!(r"\A(?:{})\z", option.regex)
        };
        RegexBuilder::new(&source)
            .case_insensitive(modifier.case_insensitive)
            .multi_line(modifier.multiline)
            .dot_matches_new_line(modifier.dot_all)
            .build()
    }
}

impl ValidatingOption for Pattern {
    fn name(&self) -> &str {
        "pattern"
    }

    fn is_present(&self, value: &FieldValue<'_>) -> bool {
        value.options().pattern.is_some()
    }

    fn applies_to(&self, value: &FieldValue<'_>) -> bool {
        value.declaration().category() == ValueCategory::String
    }

    fn check(&self, value: &FieldValue<'_>) -> Result<Vec<ConstraintViolation>, ValidationError> {
        let Some(option) = value.options().pattern.as_ref() else {
            return Ok(Vec::new());
        };
        let regex = Self::compile(option).map_err(|e| invalid(self.name(), value, e))?;
        let violations = value
            .values()
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.is_empty() && !regex.is_match(s))
            .map(|s| {
                violation(
                    option.msg_format.as_deref(),
                    MISMATCH,
                    vec![option.regex.clone(), s.to_string()],
                    value.path(),
                )
            })
            .collect();
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::testing::field_value;
    use fieldguard_core::{FieldData, FieldDescriptor, FieldOptions, FieldType, PatternModifier};

    fn pattern_field(regex: &str, modifier: PatternModifier) -> FieldDescriptor {
        FieldDescriptor::new("code", FieldType::String).with_options(FieldOptions {
            pattern: Some(PatternOption {
                regex: regex.into(),
                modifier,
                msg_format: None,
            }),
            ..Default::default()
        })
    }

    fn check(regex: &str, modifier: PatternModifier, input: &str) -> usize {
        let data = FieldData::single(input);
        let value = field_value(pattern_field(regex, modifier), Some(&data));
        Pattern.validate_against(&value).unwrap().len()
    }

    #[test]
    fn test_letters_only() {
        assert_eq!(check("^[A-Za-z]+$", PatternModifier::default(), "abc123"), 1);
        assert_eq!(check("^[A-Za-z]+$", PatternModifier::default(), "abc"), 0);
    }

    #[test]
    fn test_empty_string_skipped() {
        assert_eq!(check("[a-z]+", PatternModifier::default(), ""), 0);
    }

    #[test]
    fn test_full_match_by_default() {
        assert_eq!(check("[a-z]+", PatternModifier::default(), "abc1"), 1);
        let partial = PatternModifier {
            partial_match: true,
            ..Default::default()
        };
        assert_eq!(check("[a-z]+", partial, "abc1"), 0);
    }

    #[test]
    fn test_case_insensitive() {
        let modifier = PatternModifier {
            case_insensitive: true,
            ..Default::default()
        };
        assert_eq!(check("[a-z]+", modifier, "ABC"), 0);
    }

    #[test]
    fn test_each_element_checked() {
        let data = FieldData::repeated(["ok", "NO", "fine", "B4D"]);
        let field = pattern_field("[a-z]+", PatternModifier::default()).repeated();
        let value = field_value(field, Some(&data));
        let violations = Pattern.validate_against(&value).unwrap();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1].params()[1], "B4D");
        assert_eq!(
            violations[0].message(),
            "The string must match the regular expression `[a-z]+`."
        );
    }

    #[test]
    fn test_invalid_regex_is_authoring_error() {
        let data = FieldData::single("x");
        let value = field_value(pattern_field("([a-z", PatternModifier::default()), Some(&data));
        assert!(matches!(
            Pattern.validate_against(&value),
            Err(ValidationError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_pattern_on_int_is_inapplicable() {
        let field = FieldDescriptor::new("n", FieldType::Int32).with_options(FieldOptions {
            pattern: Some(PatternOption {
                regex: "1".into(),
                modifier: PatternModifier::default(),
                msg_format: None,
            }),
            ..Default::default()
        });
        let value = field_value(field, None);
        assert!(matches!(
            Pattern.validate_against(&value),
            Err(ValidationError::OptionInapplicable { .. })
        ));
    }
}
