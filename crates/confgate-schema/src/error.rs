//! # Error Taxonomy
//!
//! Every loader and the validator return their own `thiserror` enum. Each
//! variant belongs to exactly one [`ErrorCategory`], which is what callers
//! use when they need to tell malformed input apart from a schema violation
//! or a tooling failure. The process exit code does not depend on it.

use std::fmt;

/// Coarse classification of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A file is missing, unreadable, or failed with an I/O error.
    Input,
    /// Config content is not parseable in the selected or detected format.
    Format,
    /// Config parsed to an empty or absent value.
    Emptiness,
    /// Schema is not valid JSON, or not a well-formed JSON Schema.
    SchemaDefinition,
    /// Config is well-formed but does not satisfy the schema.
    Conformance,
    /// Anything the engine reported that fits none of the above.
    Unexpected,
}

impl ErrorCategory {
    /// Stable lowercase identifier, used as a structured log field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Format => "format",
            Self::Emptiness => "emptiness",
            Self::SchemaDefinition => "schema_definition",
            Self::Conformance => "conformance",
            Self::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
