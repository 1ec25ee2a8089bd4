//! # Schema Validation
//!
//! Runs a loaded document against a loaded schema through the `jsonschema`
//! crate and returns a single verdict.
//!
//! ## Engine Boundary
//!
//! Keyword semantics belong to the engine. This module compiles the schema,
//! asks for the first error, and classifies failures:
//!
//! - a document that fails a well-formed schema is a [`Violation`];
//! - a schema the engine refuses to compile is [`ValidateError::InvalidSchema`];
//! - reference resolution failures are [`ValidateError::Engine`].
//!
//! The draft comes from the schema's `$schema` keyword. A missing or
//! unrecognised `$schema` falls back to the engine default draft.
//!
//! ## Offline Resolution
//!
//! External `$ref` URIs are never fetched. The installed retriever refuses
//! every request, so a schema that depends on one fails to compile.

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Retrieve, Uri, ValidationError, Validator};
use serde_json::Value;
use thiserror::Error;

use crate::document::ConfigDocument;
use crate::error::ErrorCategory;
use crate::schema::SchemaDocument;

/// Retriever that resolves nothing. Built-in draft meta-schemas are bundled
/// with the engine and never reach it.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema retrieval is disabled: {}", uri.as_str()).into())
    }
}

/// The first violation reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the document.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Engine message, verbatim.
    pub message: String,
}

impl Violation {
    fn from_engine(error: &ValidationError<'_>) -> Self {
        Self {
            instance_path: error.instance_path.to_string(),
            schema_path: error.schema_path.to_string(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.instance_path.is_empty() {
            "(root)"
        } else {
            self.instance_path.as_str()
        };
        write!(
            f,
            "{} at {} (schema path {})",
            self.message, location, self.schema_path
        )
    }
}

/// Error during validation.
#[derive(Error, Debug)]
pub enum ValidateError {
    /// The document does not conform to the schema.
    #[error("Configuration validation error: {0}")]
    Violation(Violation),

    /// The schema is not a well-formed JSON Schema.
    #[error("Invalid schema: {reason}")]
    InvalidSchema {
        /// Engine diagnostic.
        reason: String,
    },

    /// The engine failed for a reason unrelated to either input's shape.
    #[error("An unexpected error occurred during validation: {reason}")]
    Engine {
        /// Engine diagnostic.
        reason: String,
    },
}

impl ValidateError {
    /// Taxonomy bucket for this failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Violation(_) => ErrorCategory::Conformance,
            Self::InvalidSchema { .. } => ErrorCategory::SchemaDefinition,
            Self::Engine { .. } => ErrorCategory::Unexpected,
        }
    }

    /// The violation, if this is a conformance failure.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::Violation(v) => Some(v),
            _ => None,
        }
    }
}

/// Compile `schema` into an engine validator.
///
/// # Errors
///
/// Returns [`ValidateError::Engine`] when a `$ref` cannot be resolved and
/// [`ValidateError::InvalidSchema`] for any other compilation failure.
pub fn compile(schema: &SchemaDocument) -> Result<Validator, ValidateError> {
    let mut opts = jsonschema::options();
    opts.with_retriever(OfflineRetriever);
    if Draft::default().detect(schema.value()).is_err() {
        tracing::debug!(
            dialect = schema.dialect().unwrap_or_default(),
            "unrecognised $schema, using the engine default draft"
        );
        opts.with_draft(Draft::default());
    }

    opts.build(schema.value()).map_err(|e| match &e.kind {
        ValidationErrorKind::Referencing(_) => ValidateError::Engine {
            reason: e.to_string(),
        },
        _ => ValidateError::InvalidSchema {
            reason: e.to_string(),
        },
    })
}

/// Validate a document against a schema.
///
/// Returns `Ok(())` when the document conforms. Only the first violation is
/// reported.
///
/// # Errors
///
/// See [`ValidateError`].
pub fn validate(document: &ConfigDocument, schema: &SchemaDocument) -> Result<(), ValidateError> {
    let validator = compile(schema)?;
    tracing::debug!(
        schema = %schema.path().display(),
        dialect = schema.dialect().unwrap_or("engine default"),
        "compiled schema"
    );

    validator
        .validate(document.value())
        .map_err(|e| ValidateError::Violation(Violation::from_engine(&e)))
}
