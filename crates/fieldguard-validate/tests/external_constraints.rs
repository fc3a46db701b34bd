//! Integration test: options of a rule message override the options of the
//! message type held by the fields it targets.

use std::sync::Arc;

use fieldguard_core::{MessageValue, SchemaSet, TypeRegistry};
use fieldguard_validate::{Engine, ExternalConstraint, ExternalConstraintError, ValidationError};

const BUNDLE: &str = r#"
messages:
  - full_name: acme.time.LocalTime
    fields:
      - { name: hour, type: int32, options: { range: "[0,23]" } }
      - { name: minute, type: int32, options: { range: "[0,59]" } }

  - full_name: acme.cal.Meeting
    fields:
      - { name: starts, type: { message: acme.time.LocalTime } }
      - { name: reminder, type: { message: acme.time.LocalTime } }

  - full_name: acme.cal.OfficeHours
    options: { constraint_for: "acme.cal.Meeting.starts" }
    fields:
      - { name: hour, type: int32, options: { range: "[9,17]" } }
"#;

fn schema() -> Arc<SchemaSet> {
    Arc::new(SchemaSet::from_yaml_str("cal.yaml", BUNDLE).unwrap())
}

fn time(hour: i32, minute: i32) -> MessageValue {
    MessageValue::new("acme.time.LocalTime")
        .with_value("hour", hour)
        .with_value("minute", minute)
}

fn meeting(starts: MessageValue, reminder: MessageValue) -> MessageValue {
    MessageValue::new("acme.cal.Meeting")
        .with_value("starts", starts)
        .with_value("reminder", reminder)
}

#[test]
fn test_discovered_constraint_overrides_target_options() {
    let engine = Engine::new(schema()).unwrap();
    assert_eq!(engine.constraints().len(), 1);

    // 20:00 is a valid time but outside office hours.
    let violations = engine.validate(&meeting(time(20, 0), time(20, 0))).unwrap();
    assert_eq!(violations.len(), 1);
    let violation = &violations.violations()[0];
    assert_eq!(violation.field_path().to_string(), "starts.hour");
    assert_eq!(violation.message(), "The number must be in range [9,17].");
}

#[test]
fn test_constraint_applies_to_zero_valued_target() {
    let engine = Engine::new(schema()).unwrap();
    let violations = engine.validate(&meeting(time(0, 0), time(9, 0))).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations.violations()[0].field_path().to_string(), "starts.hour");
}

#[test]
fn test_options_not_in_rule_still_apply() {
    let engine = Engine::new(schema()).unwrap();
    let violations = engine.validate(&meeting(time(10, 61), time(10, 0))).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations.violations()[0].field_path().to_string(), "starts.minute");
}

#[test]
fn test_untargeted_field_keeps_own_options() {
    let engine = Engine::new(schema()).unwrap();
    let violations = engine.validate(&meeting(time(10, 0), time(24, 0))).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations.violations()[0].field_path().to_string(), "reminder.hour");
}

#[test]
fn test_host_registered_constraint() {
    let registry = schema();
    let rule = registry
        .find_message("acme.cal.OfficeHours")
        .cloned()
        .unwrap();
    let constraint = ExternalConstraint::new(rule, ["acme.cal.Meeting.reminder"], registry.as_ref()).unwrap();
    let engine = Engine::builder(registry)
        .external_constraint(constraint)
        .build()
        .unwrap();
    let violations = engine.validate(&meeting(time(8, 0), time(8, 0))).unwrap();
    let paths: Vec<String> = violations.iter().map(|v| v.field_path().to_string()).collect();
    assert_eq!(paths, ["starts.hour", "reminder.hour"]);
}

#[test]
fn test_conflicting_constraints_rejected_at_build() {
    let registry = schema();
    let rule = registry
        .find_message("acme.cal.OfficeHours")
        .cloned()
        .unwrap();
    let constraint = ExternalConstraint::new(rule, ["acme.cal.Meeting.starts"], registry.as_ref()).unwrap();
    let err = Engine::builder(registry)
        .external_constraint(constraint)
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ValidationError::External(ExternalConstraintError::DuplicateTarget { .. })
    ));
}

#[test]
fn test_unresolvable_constraint_for_fails_engine_construction() {
    let yaml = r#"
messages:
  - full_name: acme.Target
    fields:
      - { name: x, type: int32 }
  - full_name: acme.Holder
    fields:
      - { name: target, type: { message: acme.Target } }
  - full_name: acme.Rule
    options: { constraint_for: "acme.Holder.missing" }
    fields:
      - { name: x, type: int32 }
"#;
    let registry = SchemaSet::from_yaml_str("bad.yaml", yaml).unwrap();
    let err = Engine::new(Arc::new(registry)).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::External(ExternalConstraintError::UnknownField { .. })
    ));
}
