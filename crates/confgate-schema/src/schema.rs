//! # Schema Loader
//!
//! Reads a JSON Schema file. Schemas are always JSON, whatever the file
//! extension says. No emptiness check applies: `{}` is the permissive
//! schema and is accepted.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Error while loading a schema file.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The path does not resolve to a file.
    #[error("Schema file not found: {}", .path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
        /// The `NotFound` I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid JSON.
    #[error("Invalid JSON format in schema file {}: {source}", .path.display())]
    InvalidSyntax {
        /// Path of the offending file.
        path: PathBuf,
        /// Parser diagnostic.
        #[source]
        source: serde_json::Error,
    },

    /// Any other I/O failure.
    #[error("Error reading schema file: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: io::Error,
    },
}

impl SchemaError {
    /// Taxonomy bucket for this failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } | Self::Io { .. } => ErrorCategory::Input,
            Self::InvalidSyntax { .. } => ErrorCategory::SchemaDefinition,
        }
    }
}

/// A parsed JSON Schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    path: PathBuf,
    value: Value,
}

impl SchemaDocument {
    /// Wrap an in-memory schema value. `path` is only used for diagnostics.
    pub fn from_value(path: impl Into<PathBuf>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    /// Path the schema was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed schema value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The `$schema` dialect URI, if the schema declares one.
    pub fn dialect(&self) -> Option<&str> {
        self.value.get("$schema").and_then(Value::as_str)
    }
}

/// Load and parse a JSON Schema file.
///
/// # Errors
///
/// Returns [`SchemaError::NotFound`] for a missing file,
/// [`SchemaError::InvalidSyntax`] when the content is not JSON, and
/// [`SchemaError::Io`] for any other read failure.
pub fn load_schema(path: &Path) -> Result<SchemaDocument, SchemaError> {
    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => SchemaError::NotFound {
            path: path.to_path_buf(),
            source,
        },
        _ => SchemaError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let value: Value =
        serde_json::from_str(&content).map_err(|source| SchemaError::InvalidSyntax {
            path: path.to_path_buf(),
            source,
        })?;

    let schema = SchemaDocument::from_value(path, value);
    tracing::debug!(
        path = %path.display(),
        bytes = content.len(),
        dialect = schema.dialect().unwrap_or("engine default"),
        "loaded schema"
    );
    Ok(schema)
}
