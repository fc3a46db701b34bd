//! Integration test: run the subcommand handlers against files on disk.

use std::io::Write;
use std::path::PathBuf;

use fieldguard_cli::reference::{run_parse_ref, ParseRefArgs};
use fieldguard_cli::validate::{load_instance, run_validate, OutputFormat, ValidateArgs};
use tempfile::TempDir;

const SCHEMA: &str = r#"
messages:
  - full_name: acme.time.LocalTime
    fields:
      - { name: hour, type: int32, options: { range: "[0,23]" } }
      - { name: minute, type: int64, options: { range: "[0,59]" } }
  - full_name: acme.contact.Contact
    options: { required_field: "email|phone" }
    fields:
      - { name: email, type: string }
      - { name: phone, type: string }
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn args(dir: &TempDir, instance: PathBuf) -> ValidateArgs {
    ValidateArgs {
        schema: write(dir, "schema.yaml", SCHEMA),
        type_name: "acme.time.LocalTime".into(),
        config: None,
        format: OutputFormat::Text,
        instance,
    }
}

#[test]
fn test_valid_instance_exits_zero() {
    let dir = TempDir::new().unwrap();
    let instance = write(&dir, "time.json", r#"{"hour": 23, "minute": "59"}"#);
    assert_eq!(run_validate(&args(&dir, instance)).unwrap(), 0);
}

#[test]
fn test_violations_exit_one() {
    let dir = TempDir::new().unwrap();
    let instance = write(&dir, "time.yaml", "hour: 24\nminute: 30\n");
    let mut args = args(&dir, instance);
    args.format = OutputFormat::Json;
    assert_eq!(run_validate(&args).unwrap(), 1);
}

#[test]
fn test_config_is_applied() {
    let dir = TempDir::new().unwrap();
    let instance = write(&dir, "time.json", r#"{"hour": 1}"#);
    let mut args = args(&dir, instance);
    args.config = Some(write(&dir, "engine.yaml", "max_depth: 0\n"));
    assert_eq!(run_validate(&args).unwrap(), 0);

    args.config = Some(write(&dir, "bad.yaml", "max_depth: deep\n"));
    assert!(run_validate(&args).is_err());
}

#[test]
fn test_decode_error_is_an_error() {
    let dir = TempDir::new().unwrap();
    let instance = write(&dir, "time.json", r#"{"hour": "noon"}"#);
    let err = run_validate(&args(&dir, instance)).unwrap_err();
    assert!(format!("{err:#}").contains("hour"));
}

#[test]
fn test_load_instance_formats() {
    let dir = TempDir::new().unwrap();
    let yaml = load_instance(&write(&dir, "a.yml", "hour: 3\n")).unwrap();
    let json = load_instance(&write(&dir, "a.json", r#"{"hour": 3}"#)).unwrap();
    assert_eq!(yaml, json);
    assert!(load_instance(&write(&dir, "b.json", "{")).is_err());
}

#[test]
fn test_parse_ref_resolves_against_type() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "schema.yaml", SCHEMA);
    let resolved = ParseRefArgs {
        reference: "email | contact.Contact.phone".into(),
        schema: Some(schema.clone()),
        type_name: Some("acme.contact.Contact".into()),
    };
    assert_eq!(run_parse_ref(&resolved).unwrap(), 0);

    let missing = ParseRefArgs {
        reference: "fax".into(),
        schema: Some(schema.clone()),
        type_name: Some("acme.contact.Contact".into()),
    };
    assert_eq!(run_parse_ref(&missing).unwrap(), 1);

    let mismatch = ParseRefArgs {
        reference: "LocalTime.hour".into(),
        schema: Some(schema),
        type_name: Some("acme.contact.Contact".into()),
    };
    assert!(run_parse_ref(&mismatch).is_err());
}

#[test]
fn test_parse_ref_rejects_malformed() {
    let args = ParseRefArgs {
        reference: "*Event.user_id".into(),
        schema: None,
        type_name: None,
    };
    assert!(run_parse_ref(&args).is_err());
}
