//! # Engine Configuration
//!
//! Loaded from YAML:
//!
//! ```yaml
//! max_depth: 32
//! well_known_prefixes:
//!   - google.protobuf.
//!   - acme.external.
//! ```
//!
//! Omitted keys keep their defaults.

use std::path::Path;

use fieldguard_core::registry::WELL_KNOWN_PREFIX;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default limit on message nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings of an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Deepest nesting level validated; deeper messages are an error.
    pub max_depth: usize,
    /// Type name prefixes whose messages are never recursed into.
    pub well_known_prefixes: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            well_known_prefixes: vec![WELL_KNOWN_PREFIX.to_string()],
        }
    }
}

impl EngineConfig {
    /// Parses a YAML config.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Config`] for malformed YAML or unknown keys.
    pub fn from_yaml_str(source_name: &str, content: &str) -> Result<Self, ValidationError> {
        serde_yaml::from_str(content).map_err(|e| ValidationError::Config {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Loads a YAML config from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Io`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&path.display().to_string(), &content)
    }

    /// True when messages of `type_name` are exempt from recursion.
    pub fn is_well_known(&self, type_name: &str) -> bool {
        self.well_known_prefixes
            .iter()
            .any(|prefix| type_name.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth, 64);
        assert!(config.is_well_known("google.protobuf.Timestamp"));
        assert!(!config.is_well_known("acme.Timestamp"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = EngineConfig::from_yaml_str("c.yaml", "max_depth: 3").unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.well_known_prefixes, ["google.protobuf."]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EngineConfig::from_yaml_str("c.yaml", "depth: 3").unwrap_err();
        assert!(matches!(err, ValidationError::Config { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "well_known_prefixes: [acme.ext.]").unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert!(config.is_well_known("acme.ext.Money"));
        assert!(!config.is_well_known("google.protobuf.Any"));
    }
}
