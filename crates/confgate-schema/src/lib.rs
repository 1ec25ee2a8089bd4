//! # confgate-schema — Load, Then Validate
//!
//! The pipeline behind the `confgate` gate, split into three leaf
//! components that never call each other:
//!
//! - [`document`] — reads a config file as JSON or YAML, autodetecting the
//!   format when no hint is given, and rejects vacuous documents.
//! - [`schema`] — reads a JSON Schema file (JSON only).
//! - [`validate`] — hands both values to the `jsonschema` engine and
//!   returns one verdict: valid, or the first violation.
//!
//! [`yaml`] is the document loader's YAML 1.1 safe-subset parser: plain
//! `yes` is a boolean and plain `010` is octal 8.
//!
//! Each component returns its own error enum. [`ErrorCategory`] groups
//! their variants into the input / format / emptiness / schema-definition /
//! conformance / unexpected taxonomy.
//!
//! ## Crate Policy
//!
//! - No global state. Every function is a pure load or check.
//! - JSON Schema semantics are the engine's. Nothing here re-derives them.
//! - Underlying causes are kept as `#[source]` for diagnostics.

pub mod document;
pub mod error;
pub mod schema;
pub mod validate;
pub mod yaml;

pub use document::{is_vacuous, load_document, ConfigDocument, DocumentError, Format, SyntaxError};
pub use error::ErrorCategory;
pub use schema::{load_schema, SchemaDocument, SchemaError};
pub use validate::{compile, validate, ValidateError, Violation};
pub use yaml::YamlError;
