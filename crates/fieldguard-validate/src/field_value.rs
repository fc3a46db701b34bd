//! # Field Value Normalization
//!
//! A [`FieldValue`] presents one field of one message instance to the
//! validators in a uniform shape. Whatever the cardinality, [`FieldValue::values`]
//! is the ordered list of element values:
//!
//! - singular: one element, the category default when the field is absent;
//! - repeated: the elements, empty when absent;
//! - map: the values ordered by key, empty when absent. Keys are not
//!   validated.

use std::borrow::Cow;

use fieldguard_core::{
    Cardinality, FieldData, FieldDeclaration, FieldOptions, FieldPath, Value,
};

use crate::error::ValidationError;

/// Where a field sits relative to the message being validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContext {
    path: FieldPath,
    depth: usize,
}

impl FieldContext {
    /// Context of a field at `path` inside a message nested `depth` levels
    /// below the validated root.
    pub fn new(path: FieldPath, depth: usize) -> Self {
        Self { path, depth }
    }

    /// Path of the field from the root of its enclosing message.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Nesting depth of the enclosing message; the validated root is 0.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// One field of one instance, with its declaration and effective options.
#[derive(Debug, Clone)]
pub struct FieldValue<'a> {
    declaration: FieldDeclaration,
    options: Cow<'a, FieldOptions>,
    present: bool,
    values: Cow<'a, [Value]>,
    context: FieldContext,
}

impl<'a> FieldValue<'a> {
    /// Normalizes the data of a field.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ShapeMismatch`] when `data` does not have the
    /// declared cardinality or holds values of another category.
    pub fn of(
        declaration: FieldDeclaration,
        options: Cow<'a, FieldOptions>,
        data: Option<&'a FieldData>,
        context: FieldContext,
    ) -> Result<Self, ValidationError> {
        let values: Cow<'a, [Value]> = match (declaration.cardinality(), data) {
            (Cardinality::Singular, None) => {
                Cow::Owned(vec![Value::default_for(declaration.field_type())])
            }
            (Cardinality::Singular, Some(FieldData::Single(v))) => {
                Cow::Borrowed(std::slice::from_ref(v))
            }
            (Cardinality::Repeated, None) | (Cardinality::Map { .. }, None) => {
                Cow::Borrowed(&[])
            }
            (Cardinality::Repeated, Some(FieldData::Repeated(values))) => {
                Cow::Borrowed(values.as_slice())
            }
            (Cardinality::Map { .. }, Some(FieldData::Map(entries))) => {
                Cow::Owned(entries.values().cloned().collect())
            }
            (cardinality, Some(other)) => {
                return Err(ValidationError::ShapeMismatch {
                    field: declaration.full_name().to_string(),
                    expected: shape_name(cardinality).to_string(),
                    actual: other.shape().to_string(),
                })
            }
        };

        let category = declaration.category();
        if let Some(stray) = values.iter().find(|v| v.category() != category) {
            return Err(ValidationError::ShapeMismatch {
                field: declaration.full_name().to_string(),
                expected: category.to_string(),
                actual: stray.category().to_string(),
            });
        }

        Ok(Self {
            declaration,
            options,
            present: data.is_some(),
            values,
            context,
        })
    }

    /// Static metadata of the field.
    pub fn declaration(&self) -> &FieldDeclaration {
        &self.declaration
    }

    /// Effective options: the field's own, possibly overridden by an
    /// external constraint.
    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Element values in order, regardless of cardinality.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Position of the field.
    pub fn context(&self) -> &FieldContext {
        &self.context
    }

    /// Path of the field from the root of its enclosing message.
    pub fn path(&self) -> &FieldPath {
        self.context.path()
    }

    /// True when the instance carries the field, even with default content.
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// True when the field is absent or holds its default.
    pub fn is_default(&self) -> bool {
        if !self.present {
            return true;
        }
        if self.declaration.is_collection() {
            self.values.is_empty()
        } else {
            self.values.iter().all(Value::is_default)
        }
    }

    /// True when the identifier convention makes this field required: a
    /// command ID always, an entity ID unless `required: false` opts out.
    pub fn is_required_identifier(&self) -> bool {
        let decl = &self.declaration;
        decl.is_command_id() || (decl.is_entity_id() && self.options.required != Some(false))
    }
}

fn shape_name(cardinality: &Cardinality) -> &'static str {
    match cardinality {
        Cardinality::Singular => "singular",
        Cardinality::Repeated => "repeated",
        Cardinality::Map { .. } => "map",
    }
}
