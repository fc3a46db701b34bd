//! # External Constraints
//!
//! An external constraint lets a rule message `A` declare field options for
//! the message type `B` held by fields of some unrelated owner type. Each
//! target is written as the full path of the holding field,
//! `pkg.Owner.field`. When the engine descends through a targeted field, the
//! options of `A`'s fields override `B`'s own options, option by option.
//!
//! Rule messages announce their targets with the `constraint_for` message
//! option (comma-separated paths); [`ExternalConstraints::discover`] collects
//! them from a registry. Hosts may also register constraints directly.

use std::collections::HashMap;

use fieldguard_core::{FieldType, MessageDescriptor, TypeRegistry};

use crate::error::ExternalConstraintError;

/// One resolved target of an external constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintTarget {
    owner: String,
    field: String,
    target_type: String,
}

impl ConstraintTarget {
    /// Full name of the message declaring the targeted field.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Name of the targeted field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// `pkg.Owner.field`.
    pub fn path(&self) -> String {
        format!("{}.{}", self.owner, self.field)
    }

    /// Full name of the message type the targeted field holds.
    pub fn target_type(&self) -> &str {
        &self.target_type
    }
}

/// Field options of a rule message bound onto fields of other messages.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalConstraint {
    rule: MessageDescriptor,
    paths: Vec<String>,
    targets: Vec<ConstraintTarget>,
}

impl ExternalConstraint {
    /// Builds a constraint of `rule` over the given field paths.
    ///
    /// # Errors
    ///
    /// Fails when no path is given, a path is blank or not of the form
    /// `pkg.Owner.field`, the owner or field is unknown, the field does not
    /// hold messages, or a field of `rule` has no counterpart in the targeted
    /// message type.
    pub fn new<I, S>(
        rule: MessageDescriptor,
        paths: I,
        registry: &dyn TypeRegistry,
    ) -> Result<Self, ExternalConstraintError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths: Vec<String> = paths
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .collect();
        if paths.is_empty() {
            return Err(ExternalConstraintError::NoPaths {
                rule: rule.full_name.clone(),
            });
        }
        let targets = paths
            .iter()
            .map(|path| resolve(&rule, path, registry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            rule,
            paths,
            targets,
        })
    }

    /// The constraint announced by `rule`'s `constraint_for` option, if any.
    ///
    /// # Errors
    ///
    /// Any error of [`ExternalConstraint::new`].
    pub fn from_descriptor(
        rule: &MessageDescriptor,
        registry: &dyn TypeRegistry,
    ) -> Result<Option<Self>, ExternalConstraintError> {
        let Some(raw) = rule.options.constraint_for.as_deref() else {
            return Ok(None);
        };
        Self::new(rule.clone(), raw.split(','), registry).map(Some)
    }

    /// The rule message.
    pub fn rule(&self) -> &MessageDescriptor {
        &self.rule
    }

    /// Target paths as given, trimmed.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Resolved targets, in path order.
    pub fn targets(&self) -> &[ConstraintTarget] {
        &self.targets
    }
}

fn resolve(
    rule: &MessageDescriptor,
    path: &str,
    registry: &dyn TypeRegistry,
) -> Result<ConstraintTarget, ExternalConstraintError> {
    let rule_name = || rule.full_name.clone();
    if path.is_empty() {
        return Err(ExternalConstraintError::BlankPath { rule: rule_name() });
    }
    let invalid = || ExternalConstraintError::InvalidPath {
        rule: rule_name(),
        path: path.to_string(),
    };
    let (owner, field) = path.rsplit_once('.').ok_or_else(invalid)?;
    if owner.is_empty() || field.is_empty() {
        return Err(invalid());
    }
    let owner_descriptor =
        registry
            .find_message(owner)
            .ok_or_else(|| ExternalConstraintError::UnknownOwner {
                rule: rule_name(),
                path: path.to_string(),
                owner: owner.to_string(),
            })?;
    let field_descriptor =
        owner_descriptor
            .field(field)
            .ok_or_else(|| ExternalConstraintError::UnknownField {
                rule: rule_name(),
                path: path.to_string(),
            })?;
    let FieldType::Message(target_type) = &field_descriptor.field_type else {
        return Err(ExternalConstraintError::NotMessageField {
            rule: rule_name(),
            path: path.to_string(),
        });
    };
    let target = registry.find_message(target_type).ok_or_else(|| {
        ExternalConstraintError::UnknownOwner {
            rule: rule_name(),
            path: path.to_string(),
            owner: target_type.clone(),
        }
    })?;
    if let Some(missing) = rule.fields.iter().find(|f| target.field(&f.name).is_none()) {
        return Err(ExternalConstraintError::MissingRuleField {
            rule: rule_name(),
            target_type: target_type.clone(),
            field: missing.name.clone(),
        });
    }
    Ok(ConstraintTarget {
        owner: owner.to_string(),
        field: field.to_string(),
        target_type: target_type.clone(),
    })
}

/// All external constraints known to an engine, indexed by targeted field.
#[derive(Debug, Clone, Default)]
pub struct ExternalConstraints {
    constraints: Vec<ExternalConstraint>,
    by_target: HashMap<String, usize>,
}

impl ExternalConstraints {
    /// No constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the constraints announced through `constraint_for` by the
    /// messages of `registry`.
    ///
    /// # Errors
    ///
    /// Fails on the first constraint that cannot be built or that targets a
    /// field already targeted.
    pub fn discover(registry: &dyn TypeRegistry) -> Result<Self, ExternalConstraintError> {
        let mut constraints = Self::new();
        for rule in registry.messages() {
            if let Some(constraint) = ExternalConstraint::from_descriptor(rule, registry)? {
                tracing::debug!(
                    rule = %rule.full_name,
                    targets = constraint.targets().len(),
                    "discovered external constraint"
                );
                constraints.insert(constraint)?;
            }
        }
        Ok(constraints)
    }

    /// Adds a constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ExternalConstraintError::DuplicateTarget`] when one of its
    /// targets already has a constraint.
    pub fn insert(&mut self, constraint: ExternalConstraint) -> Result<(), ExternalConstraintError> {
        for target in constraint.targets() {
            if let Some(&existing) = self.by_target.get(&target.path()) {
                return Err(ExternalConstraintError::DuplicateTarget {
                    path: target.path(),
                    existing: self.constraints[existing].rule.full_name.clone(),
                    rule: constraint.rule.full_name.clone(),
                });
            }
        }
        let index = self.constraints.len();
        for target in constraint.targets() {
            self.by_target.insert(target.path(), index);
        }
        self.constraints.push(constraint);
        Ok(())
    }

    /// The constraint targeting the field `pkg.Owner.field`, if any.
    pub fn for_target(&self, field_path: &str) -> Option<&ExternalConstraint> {
        self.by_target
            .get(field_path)
            .and_then(|&i| self.constraints.get(i))
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// True when there are no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterates the constraints in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ExternalConstraint> {
        self.constraints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldguard_core::SchemaSet;

    const BUNDLE: &str = r#"
messages:
  - full_name: acme.time.LocalTime
    fields:
      - { name: hour, type: int32 }
      - { name: minute, type: int32 }
  - full_name: acme.cal.Meeting
    fields:
      - { name: starts, type: { message: acme.time.LocalTime } }
      - { name: ends, type: { message: acme.time.LocalTime } }
      - { name: title, type: string }
  - full_name: acme.cal.WorkingHours
    options: { constraint_for: "acme.cal.Meeting.starts, acme.cal.Meeting.ends" }
    fields:
      - { name: hour, type: int32, options: { range: "[9,17]" } }
"#;

    fn registry() -> SchemaSet {
        SchemaSet::from_yaml_str("cal.yaml", BUNDLE).unwrap()
    }

    fn rule(registry: &SchemaSet) -> MessageDescriptor {
        registry.find_message("acme.cal.WorkingHours").unwrap().clone()
    }

    fn error_for(path: &str) -> ExternalConstraintError {
        let registry = registry();
        ExternalConstraint::new(rule(&registry), [path], &registry).unwrap_err()
    }

    #[test]
    fn test_resolves_targets() {
        let registry = registry();
        let constraint = ExternalConstraint::from_descriptor(&rule(&registry), &registry)
            .unwrap()
            .unwrap();
        assert_eq!(constraint.paths(), ["acme.cal.Meeting.starts", "acme.cal.Meeting.ends"]);
        assert_eq!(constraint.targets()[1].target_type(), "acme.time.LocalTime");
        assert_eq!(constraint.targets()[0].owner(), "acme.cal.Meeting");
    }

    #[test]
    fn test_rejects_blank_path() {
        assert!(matches!(error_for("  "), ExternalConstraintError::BlankPath { .. }));
    }

    #[test]
    fn test_rejects_path_without_owner() {
        assert!(matches!(
            error_for("package-without-class"),
            ExternalConstraintError::InvalidPath { .. }
        ));
    }

    #[test]
    fn test_rejects_unknown_owner() {
        assert!(matches!(
            error_for("acme.cal.Agenda.starts"),
            ExternalConstraintError::UnknownOwner { .. }
        ));
    }

    #[test]
    fn test_rejects_non_existing_field() {
        assert!(matches!(
            error_for("acme.cal.Meeting.non_existing"),
            ExternalConstraintError::UnknownField { .. }
        ));
    }

    #[test]
    fn test_rejects_non_message_field() {
        assert!(matches!(
            error_for("acme.cal.Meeting.title"),
            ExternalConstraintError::NotMessageField { .. }
        ));
    }

    #[test]
    fn test_rejects_rule_field_missing_in_target() {
        let registry = registry();
        let rule = rule(&registry).with_field(fieldguard_core::FieldDescriptor::new(
            "second",
            FieldType::Int32,
        ));
        let err = ExternalConstraint::new(rule, ["acme.cal.Meeting.starts"], &registry).unwrap_err();
        assert!(matches!(
            err,
            ExternalConstraintError::MissingRuleField { field, .. } if field == "second"
        ));
    }

    #[test]
    fn test_rejects_empty_path_list() {
        let registry = registry();
        let err = ExternalConstraint::new(rule(&registry), Vec::<String>::new(), &registry).unwrap_err();
        assert!(matches!(err, ExternalConstraintError::NoPaths { .. }));
    }

    #[test]
    fn test_equal_inputs_give_equal_constraints() {
        let registry = registry();
        let a = ExternalConstraint::new(rule(&registry), ["acme.cal.Meeting.starts"], &registry).unwrap();
        let b = ExternalConstraint::new(rule(&registry), [" acme.cal.Meeting.starts "], &registry).unwrap();
        let c = ExternalConstraint::new(rule(&registry), ["acme.cal.Meeting.ends"], &registry).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_discover_and_lookup() {
        let constraints = ExternalConstraints::discover(&registry()).unwrap();
        assert_eq!(constraints.len(), 1);
        assert!(constraints.for_target("acme.cal.Meeting.ends").is_some());
        assert!(constraints.for_target("acme.cal.Meeting.title").is_none());
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let registry = registry();
        let mut constraints = ExternalConstraints::discover(&registry).unwrap();
        let again = ExternalConstraint::new(rule(&registry), ["acme.cal.Meeting.starts"], &registry).unwrap();
        assert!(matches!(
            constraints.insert(again),
            Err(ExternalConstraintError::DuplicateTarget { .. })
        ));
        assert_eq!(constraints.len(), 1);
    }
}
