//! # fieldguard-cli — Command-Line Interface for fieldguard
//!
//! Provides the `fieldguard` binary.
//!
//! ## Subcommands
//!
//! - `fieldguard validate`: validate a JSON or YAML instance against a
//!   schema bundle.
//! - `fieldguard parse-ref`: parse and optionally resolve field references.
//!
//! Log verbosity follows `RUST_LOG` when set, otherwise `-v` flags.

pub mod reference;
pub mod validate;
