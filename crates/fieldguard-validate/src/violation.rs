//! # Constraint Violations
//!
//! A [`ConstraintViolation`] records one failed constraint: a message format
//! with `%s` placeholders, the ordered parameters that fill them, and the
//! path of the offending field. Violations are immutable once built. A
//! nested message's violations reach its parent through
//! [`ConstraintViolation::prefixed`].

use std::fmt;

use fieldguard_core::FieldPath;
use serde::{Deserialize, Serialize};

/// Placeholder substituted by the parameters, in order.
const PLACEHOLDER: &str = "%s";

/// One failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    msg_format: String,
    params: Vec<String>,
    field_path: FieldPath,
}

impl ConstraintViolation {
    /// Creates a violation.
    pub fn new(
        msg_format: impl Into<String>,
        params: Vec<String>,
        field_path: FieldPath,
    ) -> Self {
        Self {
            msg_format: msg_format.into(),
            params,
            field_path,
        }
    }

    /// The message format, with `%s` placeholders.
    pub fn msg_format(&self) -> &str {
        &self.msg_format
    }

    /// Parameters filling the placeholders.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Path of the offending field; the root path for message-level violations.
    pub fn field_path(&self) -> &FieldPath {
        &self.field_path
    }

    /// The same violation with `parent` prepended to its path.
    pub fn prefixed(&self, parent: &FieldPath) -> Self {
        Self {
            msg_format: self.msg_format.clone(),
            params: self.params.clone(),
            field_path: self.field_path.prefixed(parent),
        }
    }

    /// The format with each `%s` replaced by the next parameter.
    ///
    /// Placeholders beyond the last parameter are left as they are; extra
    /// parameters are ignored.
    pub fn message(&self) -> String {
        let mut out = String::with_capacity(self.msg_format.len());
        let mut params = self.params.iter();
        let mut rest = self.msg_format.as_str();
        while let Some(at) = rest.find(PLACEHOLDER) {
            out.push_str(&rest[..at]);
            match params.next() {
                Some(param) => out.push_str(param),
                None => out.push_str(PLACEHOLDER),
            }
            rest = &rest[at + PLACEHOLDER.len()..];
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field_path.is_root() {
            write!(f, "(root): {}", self.message())
        } else {
            write!(f, "{}: {}", self.field_path, self.message())
        }
    }
}

/// Ordered violations of one message instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations {
    violations: Vec<ConstraintViolation>,
}

impl Violations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    /// Iterates the violations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ConstraintViolation> {
        self.violations.iter()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<ConstraintViolation> {
        self.violations
    }
}

impl From<Vec<ConstraintViolation>> for Violations {
    fn from(violations: Vec<ConstraintViolation>) -> Self {
        Self { violations }
    }
}

impl IntoIterator for Violations {
    type Item = ConstraintViolation;
    type IntoIter = std::vec::IntoIter<ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a ConstraintViolation;
    type IntoIter = std::slice::Iter<'a, ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}
