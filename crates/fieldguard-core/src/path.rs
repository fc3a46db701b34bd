//! # Field Paths
//!
//! A [`FieldPath`] is the sequence of field names leading from a message root
//! to the field a violation was found in. Nested-message validation produces
//! paths relative to the nested message; the parent prefixes them with the
//! name of the field that holds the nested message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence of field names from a message root to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The empty path, addressing the message itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A path of a single field directly under the root.
    pub fn of(field: impl Into<String>) -> Self {
        Self(vec![field.into()])
    }

    /// Returns a new path extended by `field`.
    pub fn child(&self, field: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(field.into());
        Self(segments)
    }

    /// Returns a new path with `parent` prepended.
    pub fn prefixed(&self, parent: &FieldPath) -> Self {
        let mut segments = Vec::with_capacity(parent.0.len() + self.0.len());
        segments.extend(parent.0.iter().cloned());
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }

    /// The field names, root first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True for the path addressing the message itself.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Name of the last field on the path.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}
