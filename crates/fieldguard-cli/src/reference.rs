//! # Parse-Ref Subcommand
//!
//! Parses field reference strings and, given a schema bundle and a type,
//! resolves them. Useful when writing `required_field` options.
//!
//! ```bash
//! fieldguard parse-ref 'email | phone'
//! fieldguard parse-ref --schema schema.yaml --type acme.Contact 'Contact.email'
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;

use fieldguard_core::{FieldReference, SchemaSet, TypeRegistry};

/// Arguments for the `fieldguard parse-ref` subcommand.
#[derive(Args, Debug)]
pub struct ParseRefArgs {
    /// Reference, or `|`-separated alternatives.
    #[arg(value_name = "REFERENCE")]
    pub reference: String,

    /// Schema bundle to resolve against.
    #[arg(long, value_name = "PATH", requires = "type_name")]
    pub schema: Option<PathBuf>,

    /// Message type to resolve against.
    #[arg(long = "type", value_name = "TYPE", requires = "schema")]
    pub type_name: Option<String>,
}

/// Execute the parse-ref subcommand.
///
/// Returns exit code: 0 when every alternative parses (and resolves, if a
/// type was given), 1 when one does not resolve to a field.
pub fn run_parse_ref(args: &ParseRefArgs) -> Result<u8> {
    let references = FieldReference::parse_alternatives(&args.reference)
        .with_context(|| format!("cannot parse `{}`", args.reference))?;

    let target = match (&args.schema, &args.type_name) {
        (Some(path), Some(type_name)) => {
            let schema = SchemaSet::load(path)
                .with_context(|| format!("failed to load schema bundle {}", path.display()))?;
            Some((schema, type_name.as_str()))
        }
        _ => None,
    };

    let mut unresolved = false;
    for reference in &references {
        let mut line = describe(reference);
        if let Some((schema, type_name)) = &target {
            let descriptor = schema
                .find_message(type_name)
                .ok_or_else(|| anyhow!("unknown message type `{type_name}`"))?;
            match reference.find(descriptor)? {
                Some(field) => line.push_str(&format!(
                    " -> {}.{} ({})",
                    descriptor.full_name, field.name, field.field_type
                )),
                None => {
                    unresolved = true;
                    line.push_str(" -> not found");
                }
            }
        }
        println!("{line}");
    }
    Ok(u8::from(unresolved))
}

/// One-line description of a parsed reference.
pub fn describe(reference: &FieldReference) -> String {
    let kind = if reference.is_wildcard() {
        "wildcard"
    } else if reference.is_context() {
        "context"
    } else if reference.is_typed() {
        "typed"
    } else {
        "inner"
    };
    match reference.type_ref() {
        Some(type_ref) if reference.is_typed() => {
            format!("{kind}: field `{}` of `{type_ref}`", reference.field_name())
        }
        _ => format!("{kind}: field `{}`", reference.field_name()),
    }
}
