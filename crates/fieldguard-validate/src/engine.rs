//! # Validation Engine
//!
//! [`Engine`] owns everything a validation call needs: the type registry, the
//! option registry, the configuration, and the external constraints. It is
//! immutable once built and `Send + Sync`; each call to [`Engine::validate`]
//! owns its own accumulator.
//!
//! ```ignore
//! let engine = Engine::builder(Arc::new(schema_set))
//!     .config(EngineConfig::load(path)?)
//!     .register_option(ValueCategory::String, Arc::new(MaxLength))
//!     .build()?;
//! let violations = engine.validate(&message)?;
//! ```

use std::sync::Arc;

use fieldguard_core::{decode_message, MessageValue, TypeRegistry, ValueCategory};

use crate::config::EngineConfig;
use crate::error::ValidationError;
use crate::external::{ExternalConstraint, ExternalConstraints};
use crate::message::MessageValidator;
use crate::option::ValidatingOption;
use crate::registry::OptionRegistry;
use crate::violation::Violations;

/// Validates message instances against the schemas of a registry.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<dyn TypeRegistry>,
    options: OptionRegistry,
    config: EngineConfig,
    constraints: ExternalConstraints,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("config", &self.config)
            .field("constraints", &self.constraints.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Starts building an engine over `registry` with the built-in options
    /// and the default configuration.
    pub fn builder(registry: Arc<dyn TypeRegistry>) -> EngineBuilder {
        EngineBuilder {
            registry,
            options: OptionRegistry::builtin(),
            config: EngineConfig::default(),
            constraints: Vec::new(),
        }
    }

    /// An engine with the built-in options and the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::External`] when a `constraint_for` option
    /// in the registry cannot be resolved.
    pub fn new(registry: Arc<dyn TypeRegistry>) -> Result<Self, ValidationError> {
        Self::builder(registry).build()
    }

    /// Validates a message instance.
    ///
    /// Every field and every applicable option is evaluated; the result
    /// lists all violations in field declaration order.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the schema is wrong: an option
    /// that cannot apply or cannot be evaluated, a malformed reference, an
    /// unknown type, or nesting beyond the configured depth.
    pub fn validate(&self, message: &MessageValue) -> Result<Violations, ValidationError> {
        tracing::debug!(type_name = message.type_name(), "validating message");
        let validator = MessageValidator {
            registry: self.registry.as_ref(),
            options: &self.options,
            config: &self.config,
            constraints: &self.constraints,
        };
        match validator.validate(message, None, 0) {
            Ok(violations) => {
                tracing::debug!(
                    type_name = message.type_name(),
                    violations = violations.len(),
                    "validation finished"
                );
                Ok(Violations::from(violations))
            }
            Err(e) => {
                tracing::warn!(type_name = message.type_name(), error = %e, "validation aborted");
                Err(e)
            }
        }
    }

    /// Decodes a JSON instance of `type_name` and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Decode`] when the document does not fit the
    /// schema, and any error of [`Engine::validate`].
    pub fn validate_json(
        &self,
        json: &serde_json::Value,
        type_name: &str,
    ) -> Result<Violations, ValidationError> {
        let message = decode_message(json, type_name, self.registry.as_ref())?;
        self.validate(&message)
    }

    /// The type registry.
    pub fn registry(&self) -> &dyn TypeRegistry {
        self.registry.as_ref()
    }

    /// The option registry.
    pub fn options(&self) -> &OptionRegistry {
        &self.options
    }

    /// The configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The external constraints in effect.
    pub fn constraints(&self) -> &ExternalConstraints {
        &self.constraints
    }
}

/// Configures an [`Engine`].
pub struct EngineBuilder {
    registry: Arc<dyn TypeRegistry>,
    options: OptionRegistry,
    config: EngineConfig,
    constraints: Vec<ExternalConstraint>,
}

impl EngineBuilder {
    /// Replaces the configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the option registry, dropping the built-in options unless
    /// `options` carries them.
    pub fn options(mut self, options: OptionRegistry) -> Self {
        self.options = options;
        self
    }

    /// Adds an option for fields of `category`.
    pub fn register_option(
        mut self,
        category: ValueCategory,
        option: Arc<dyn ValidatingOption>,
    ) -> Self {
        self.options.register(category, option);
        self
    }

    /// Adds an external constraint on top of those announced by
    /// `constraint_for`.
    pub fn external_constraint(mut self, constraint: ExternalConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Builds the engine, discovering `constraint_for` options in the
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::External`] when a discovered constraint
    /// cannot be resolved or two constraints target the same field.
    pub fn build(self) -> Result<Engine, ValidationError> {
        let mut constraints = ExternalConstraints::discover(self.registry.as_ref())
            .map_err(|e| {
                tracing::warn!(error = %e, "external constraint discovery failed");
                e
            })?;
        for constraint in self.constraints {
            constraints.insert(constraint)?;
        }
        tracing::debug!(
            max_depth = self.config.max_depth,
            constraints = constraints.len(),
            "validation engine ready"
        );
        Ok(Engine {
            registry: self.registry,
            options: self.options,
            config: self.config,
            constraints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldguard_core::{FieldData, SchemaSet};

    fn engine(yaml: &str) -> Engine {
        let set = SchemaSet::from_yaml_str("test.yaml", yaml).unwrap();
        Engine::new(Arc::new(set)).unwrap()
    }

    const TIME: &str = r#"
messages:
  - full_name: acme.time.LocalTime
    fields:
      - { name: hour, type: int32, options: { range: "[0,23]" } }
      - { name: minute, type: int64, options: { range: "[0,59]" } }
"#;

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_out_of_range_hour() {
        let engine = engine(TIME);
        let time = MessageValue::new("acme.time.LocalTime")
            .with_value("hour", 24i32)
            .with_value("minute", 30i64);
        let violations = engine.validate(&time).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.violations()[0].field_path().to_string(), "hour");
    }

    #[test]
    fn test_unknown_type() {
        let engine = engine(TIME);
        let err = engine.validate(&MessageValue::new("acme.Nope")).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownType(name) if name == "acme.Nope"));
    }

    #[test]
    fn test_undeclared_field() {
        let engine = engine(TIME);
        let time = MessageValue::new("acme.time.LocalTime").with("second", FieldData::single(1i32));
        assert!(matches!(
            engine.validate(&time),
            Err(ValidationError::UnknownField { field, .. }) if field == "second"
        ));
    }

    #[test]
    fn test_validate_json() {
        let engine = engine(TIME);
        let json = serde_json::json!({"hour": 23, "minute": "60"});
        let violations = engine.validate_json(&json, "acme.time.LocalTime").unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.violations()[0].field_path().to_string(), "minute");

        let bad = serde_json::json!({"hour": "noon"});
        assert!(matches!(
            engine.validate_json(&bad, "acme.time.LocalTime"),
            Err(ValidationError::Decode(_))
        ));
    }

    #[test]
    fn test_validate_json_with_well_known_field() {
        let engine = engine(
            r#"
messages:
  - full_name: acme.Event
    fields:
      - name: stamp
        type: { message: google.protobuf.Timestamp }
        options: { required: true }
"#,
        );
        for stamp in [
            serde_json::json!("2024-01-01T00:00:00Z"),
            serde_json::json!({"seconds": 1}),
        ] {
            let json = serde_json::json!({ "stamp": stamp });
            assert!(engine.validate_json(&json, "acme.Event").unwrap().is_empty());
        }
        let missing = engine.validate_json(&serde_json::json!({}), "acme.Event").unwrap();
        assert_eq!(missing.len(), 1);
    }
}
