//! # Validate Subcommand
//!
//! Validates one message instance against a schema bundle and prints the
//! violations.
//!
//! ```bash
//! fieldguard validate --schema schema.yaml --type acme.tasks.Task task.json
//! fieldguard validate --schema schema.yaml --type acme.tasks.Task --format json task.yaml
//! ```
//!
//! Exit code: 0 when the instance is valid, 1 when it has violations. Schema,
//! decode and configuration errors propagate as errors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use fieldguard_core::SchemaSet;
use fieldguard_validate::{Engine, EngineConfig, Violations};

/// Output format of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per violation.
    #[default]
    Text,
    /// A JSON report.
    Json,
}

/// Arguments for the `fieldguard validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema bundle (YAML, or JSON with a `.json` extension).
    #[arg(long, value_name = "PATH")]
    pub schema: PathBuf,

    /// Full name of the instance's message type.
    #[arg(long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// Engine configuration (YAML).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Instance to validate (JSON, or YAML with a `.yaml`/`.yml` extension).
    #[arg(value_name = "INSTANCE")]
    pub instance: PathBuf,
}

/// One violation as printed in JSON reports.
#[derive(Debug, Serialize)]
struct ViolationView {
    field_path: String,
    message: String,
    msg_format: String,
    params: Vec<String>,
}

/// JSON report.
#[derive(Debug, Serialize)]
struct Report<'a> {
    type_name: &'a str,
    valid: bool,
    violations: Vec<ViolationView>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 when violations were found.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let schema = SchemaSet::load(&args.schema)
        .with_context(|| format!("failed to load schema bundle {}", args.schema.display()))?;
    tracing::info!(
        messages = schema.message_count(),
        enums = schema.enum_count(),
        "loaded schema bundle"
    );

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let engine = Engine::builder(Arc::new(schema))
        .config(config)
        .build()
        .context("failed to build validation engine")?;

    let instance = load_instance(&args.instance)?;
    let violations = engine
        .validate_json(&instance, &args.type_name)
        .with_context(|| format!("failed to validate {}", args.instance.display()))?;

    println!("{}", render(&args.type_name, &violations, args.format)?);
    Ok(if violations.is_empty() { 0 } else { 1 })
}

/// Reads an instance document as JSON, or as YAML for `.yaml`/`.yml` files.
pub fn load_instance(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
    };
    Ok(value)
}

/// Formats the violations of one instance.
pub fn render(type_name: &str, violations: &Violations, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text if violations.is_empty() => Ok(format!("OK: {type_name}")),
        OutputFormat::Text => Ok(format!(
            "FAIL: {type_name} ({} violation(s))\n{violations}",
            violations.len()
        )),
        OutputFormat::Json => {
            let report = Report {
                type_name,
                valid: violations.is_empty(),
                violations: violations
                    .iter()
                    .map(|v| ViolationView {
                        field_path: v.field_path().to_string(),
                        message: v.message(),
                        msg_format: v.msg_format().to_string(),
                        params: v.params().to_vec(),
                    })
                    .collect(),
            };
            serde_json::to_string_pretty(&report).context("failed to serialize report")
        }
    }
}
