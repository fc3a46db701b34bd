//! # Field References
//!
//! A small language for naming fields from option values:
//!
//! | Form                 | Kind     | Meaning                                   |
//! |----------------------|----------|-------------------------------------------|
//! | `field_name`         | inner    | a field of the same message               |
//! | `*.field_name`       | wildcard | a field with that name in any type        |
//! | `context.field_name` | context  | a field of the enclosing context message  |
//! | `pkg.Type.field`     | typed    | a field of the named type                 |
//!
//! Several alternatives may be joined with `|`; see
//! [`FieldReference::parse_alternatives`].
//!
//! Parsing never guesses. A lone `*`, a suffix wildcard such as
//! `*Event.user_id`, blank input and empty segments (`.field`, `Type.`,
//! `Type. .field`) are each rejected with their own [`ReferenceError`].

use std::fmt;
use std::str::FromStr;

use crate::error::ReferenceError;
use crate::schema::{FieldDescriptor, MessageDescriptor};

/// Type reference matching any message type.
pub const WILDCARD: &str = "*";

/// Type reference naming the enclosing context message.
pub const CONTEXT: &str = "context";

const PIPE: char = '|';
const DOT: char = '.';

/// A parsed field reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldReference {
    /// `*.field`: the field in any message type.
    Wildcard {
        /// Referenced field name.
        field: String,
    },
    /// `field`: a field of the message declaring the option.
    Inner {
        /// Referenced field name.
        field: String,
    },
    /// `context.field`: a field of the context message.
    Context {
        /// Referenced field name.
        field: String,
    },
    /// `Type.field` or `pkg.Type.field`.
    Typed {
        /// The type reference, possibly dotted.
        type_name: String,
        /// Referenced field name.
        field: String,
    },
}

impl FieldReference {
    /// Parses a single reference.
    ///
    /// # Errors
    ///
    /// Returns a [`ReferenceError`] describing the malformed shape.
    pub fn parse(input: &str) -> Result<Self, ReferenceError> {
        let value = input.trim();
        if value.is_empty() {
            return Err(ReferenceError::Blank);
        }
        if value.contains(PIPE) {
            return Err(ReferenceError::UnexpectedAlternatives(value.to_string()));
        }

        let segments: Vec<&str> = value.split(DOT).map(str::trim).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ReferenceError::EmptySegment {
                reference: value.to_string(),
            });
        }

        let (field, type_segments) = match segments.split_last() {
            Some(split) => split,
            None => return Err(ReferenceError::Blank),
        };

        if type_segments.is_empty() {
            if *field == WILDCARD {
                return Err(ReferenceError::LoneWildcard);
            }
            check_identifier(value, field)?;
            return Ok(Self::Inner {
                field: field.to_string(),
            });
        }

        check_identifier(value, field)?;
        let type_name = type_segments.join(".");
        if type_segments.len() == 1 {
            match type_segments[0] {
                WILDCARD => {
                    return Ok(Self::Wildcard {
                        field: field.to_string(),
                    })
                }
                CONTEXT => {
                    return Ok(Self::Context {
                        field: field.to_string(),
                    })
                }
                _ => {}
            }
        }
        if type_name.contains(WILDCARD) {
            return Err(ReferenceError::SuffixWildcard(type_name));
        }
        for segment in type_segments {
            check_identifier(value, segment)?;
        }
        Ok(Self::Typed {
            type_name,
            field: field.to_string(),
        })
    }

    /// Splits a raw option value on `|` and parses every alternative, in order.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed alternative, including empty ones (`a||b`).
    pub fn parse_alternatives(input: &str) -> Result<Vec<Self>, ReferenceError> {
        if input.trim().is_empty() {
            return Err(ReferenceError::Blank);
        }
        input.split(PIPE).map(Self::parse).collect()
    }

    /// Tells whether a type reference denotes all types.
    ///
    /// # Errors
    ///
    /// Blank input and suffix forms such as `*Event` are rejected.
    pub fn is_wildcard_type(type_ref: &str) -> Result<bool, ReferenceError> {
        let value = type_ref.trim();
        if value.is_empty() {
            return Err(ReferenceError::Blank);
        }
        if value == WILDCARD {
            return Ok(true);
        }
        if value.contains(WILDCARD) {
            return Err(ReferenceError::SuffixWildcard(value.to_string()));
        }
        Ok(false)
    }

    /// The referenced field name.
    pub fn field_name(&self) -> &str {
        match self {
            Self::Wildcard { field }
            | Self::Inner { field }
            | Self::Context { field }
            | Self::Typed { field, .. } => field,
        }
    }

    /// The type part as written: `*`, `context`, the type name, or `None` for
    /// inner references.
    pub fn type_ref(&self) -> Option<&str> {
        match self {
            Self::Wildcard { .. } => Some(WILDCARD),
            Self::Context { .. } => Some(CONTEXT),
            Self::Typed { type_name, .. } => Some(type_name),
            Self::Inner { .. } => None,
        }
    }

    /// True for `*.field`.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard { .. })
    }

    /// True for a bare field name.
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner { .. })
    }

    /// True for `context.field`.
    pub fn is_context(&self) -> bool {
        matches!(self, Self::Context { .. })
    }

    /// True for `Type.field`.
    pub fn is_typed(&self) -> bool {
        matches!(self, Self::Typed { .. })
    }

    /// Tells whether this reference may point into the given message type.
    ///
    /// Typed references match on the full name, the simple name, or any
    /// dotted suffix of the full name. All other kinds match any type.
    pub fn matches_type(&self, full_name: &str) -> bool {
        match self {
            Self::Typed { type_name, .. } => {
                full_name == type_name
                    || full_name
                        .strip_suffix(type_name.as_str())
                        .is_some_and(|prefix| prefix.ends_with(DOT))
            }
            _ => true,
        }
    }

    /// Resolves the reference against a message descriptor.
    ///
    /// Context references are resolved against whatever descriptor the
    /// caller passes, which should be the context message.
    ///
    /// # Errors
    ///
    /// A typed reference naming another type fails with
    /// [`ReferenceError::TypeMismatch`] instead of returning `None`.
    pub fn find<'a>(
        &self,
        message: &'a MessageDescriptor,
    ) -> Result<Option<&'a FieldDescriptor>, ReferenceError> {
        if let Self::Typed { type_name, .. } = self {
            if !self.matches_type(&message.full_name) {
                return Err(ReferenceError::TypeMismatch {
                    reference: self.to_string(),
                    expected: type_name.clone(),
                    actual: message.full_name.clone(),
                });
            }
        }
        Ok(message.field(self.field_name()))
    }
}

impl FromStr for FieldReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_ref() {
            Some(type_ref) => write!(f, "{type_ref}.{}", self.field_name()),
            None => f.write_str(self.field_name()),
        }
    }
}

fn check_identifier(reference: &str, segment: &str) -> Result<(), ReferenceError> {
    let mut chars = segment.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else if segment.contains(WILDCARD) {
        Err(ReferenceError::SuffixWildcard(segment.to_string()))
    } else {
        Err(ReferenceError::InvalidIdentifier {
            reference: reference.to_string(),
            segment: segment.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn timestamp() -> MessageDescriptor {
        MessageDescriptor::new("google.protobuf.Timestamp")
            .with_field(FieldDescriptor::new("seconds", FieldType::Int64))
            .with_field(FieldDescriptor::new("nanos", FieldType::Int32))
    }

    #[test]
    fn test_recognizes_wildcard() {
        assert!(FieldReference::parse("*.user_id").unwrap().is_wildcard());
        assert!(!FieldReference::parse("UserCreated.user_id").unwrap().is_wildcard());
    }

    #[test]
    fn test_recognizes_inner() {
        assert!(FieldReference::parse("another_field").unwrap().is_inner());
        let typed = FieldReference::parse("AnotherMessage.another_field").unwrap();
        assert!(!typed.is_inner());
        assert!(typed.is_typed());
    }

    #[test]
    fn test_recognizes_context() {
        assert!(FieldReference::parse("context.timestamp").unwrap().is_context());
        let field_named_context = FieldReference::parse("AnotherMessage.context").unwrap();
        assert!(!field_named_context.is_context());
        assert_eq!(field_named_context.field_name(), "context");
    }

    #[test]
    fn test_type_name_of_typed_reference() {
        let r = FieldReference::parse("ReferencedType.some_field").unwrap();
        assert_eq!(r.type_ref(), Some("ReferencedType"));
        let dotted = FieldReference::parse("acme.events.DocumentUpdated.id").unwrap();
        assert_eq!(dotted.type_ref(), Some("acme.events.DocumentUpdated"));
        assert_eq!(dotted.field_name(), "id");
    }

    #[test]
    fn test_alternatives_keep_order() {
        let refs =
            FieldReference::parse_alternatives("*.document_id | DocumentUpdated.id|context.user")
                .unwrap();
        assert_eq!(refs.len(), 3);
        assert!(refs[0].is_wildcard());
        assert_eq!(refs[1].type_ref(), Some("DocumentUpdated"));
        assert!(refs[2].is_context());
    }

    #[test]
    fn test_single_parse_rejects_alternatives() {
        assert!(matches!(
            FieldReference::parse("a|b"),
            Err(ReferenceError::UnexpectedAlternatives(_))
        ));
    }

    #[test]
    fn test_rejects_blank() {
        assert_eq!(FieldReference::parse(""), Err(ReferenceError::Blank));
        assert_eq!(FieldReference::parse("  "), Err(ReferenceError::Blank));
        assert_eq!(FieldReference::parse_alternatives(" "), Err(ReferenceError::Blank));
    }

    #[test]
    fn test_rejects_empty_segments() {
        for input in [".field_name", "TypeName.", "Some. .field_name", "io.spine. .TypeName.field_name", "a||b"] {
            let result = FieldReference::parse_alternatives(input);
            assert!(result.is_err(), "`{input}` should be rejected");
        }
        assert!(matches!(
            FieldReference::parse("TypeName."),
            Err(ReferenceError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_rejects_wildcard_forms() {
        assert_eq!(FieldReference::parse("*"), Err(ReferenceError::LoneWildcard));
        assert_eq!(
            FieldReference::parse("*Event.user_id"),
            Err(ReferenceError::SuffixWildcard("*Event".into()))
        );
        assert!(FieldReference::parse("acme.*.user_id").is_err());
        assert!(FieldReference::parse("*.*").is_err());
    }

    #[test]
    fn test_rejects_non_identifiers() {
        assert!(matches!(
            FieldReference::parse("a & b"),
            Err(ReferenceError::InvalidIdentifier { .. })
        ));
        assert!(FieldReference::parse("Type.1field").is_err());
    }

    #[test]
    fn test_is_wildcard_type() {
        assert_eq!(FieldReference::is_wildcard_type("*"), Ok(true));
        assert_eq!(FieldReference::is_wildcard_type("UserCreated"), Ok(false));
        assert_eq!(FieldReference::is_wildcard_type(""), Err(ReferenceError::Blank));
        assert_eq!(FieldReference::is_wildcard_type(" "), Err(ReferenceError::Blank));
        assert!(FieldReference::is_wildcard_type("*Event").is_err());
    }

    #[test]
    fn test_find_via_qualified_simple_and_bare_names() {
        let ts = timestamp();
        for input in ["google.protobuf.Timestamp.seconds", "Timestamp.seconds", "protobuf.Timestamp.seconds", "seconds", "*.seconds"] {
            let r = FieldReference::parse(input).unwrap();
            let found = r.find(&ts).unwrap();
            assert_eq!(found.map(|f| f.name.as_str()), Some("seconds"), "via `{input}`");
        }
    }

    #[test]
    fn test_find_rejects_other_type() {
        let r = FieldReference::parse("LocalTime.seconds").unwrap();
        assert!(matches!(
            r.find(&timestamp()),
            Err(ReferenceError::TypeMismatch { .. })
        ));
        let partial = FieldReference::parse("stamp.seconds").unwrap();
        assert!(partial.find(&timestamp()).is_err());
    }

    #[test]
    fn test_find_missing_field_is_none() {
        let r = FieldReference::parse("minutes").unwrap();
        assert_eq!(r.find(&timestamp()).unwrap(), None);
    }

    #[test]
    fn test_display_round_trips() {
        for input in ["*.user_id", "user_id", "context.ts", "acme.Type.field"] {
            assert_eq!(FieldReference::parse(input).unwrap().to_string(), input);
        }
    }

    #[test]
    fn test_equality_by_parsed_form() {
        assert_eq!(
            FieldReference::parse(" Type.field ").unwrap(),
            "Type.field".parse::<FieldReference>().unwrap()
        );
    }
}
