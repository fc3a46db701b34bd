//! # fieldguard-validate — Declarative Message Validation
//!
//! Given a decoded message instance and the schema of its type, produces the
//! complete list of constraint violations.
//!
//! ## Flow
//!
//! ```text
//! MessageValue ──▶ MessageValidator ──▶ FieldValue (per declared field)
//!                        │                   │
//!                        │                   ├─ identifier convention
//!                        │                   ├─ own rules (nested messages recurse)
//!                        │                   └─ OptionRegistry options for the category
//!                        └─ required_field alternatives
//! ```
//!
//! ## Errors vs Violations
//!
//! Data problems are [`ConstraintViolation`]s; every field and every
//! applicable option is evaluated. Authoring problems in the schema (an
//! option that cannot apply, a malformed range or regex, an unresolvable
//! reference) are [`ValidationError`]s and abort the call.
//!
//! ## Crate Policy
//!
//! - No global state: options, config and constraints live in the [`Engine`].
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

mod alternative;
pub mod config;
pub mod engine;
pub mod error;
pub mod external;
pub mod field_value;
mod message;
pub mod number;
pub mod option;
pub mod registry;
mod validator;
pub mod violation;

pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder};
pub use error::{ExternalConstraintError, ValidationError};
pub use external::{ConstraintTarget, ExternalConstraint, ExternalConstraints};
pub use field_value::{FieldContext, FieldValue};
pub use number::{Number, NumberRange, RangeSyntaxError, RangeType};
pub use option::ValidatingOption;
pub use registry::OptionRegistry;
pub use violation::{ConstraintViolation, Violations};
