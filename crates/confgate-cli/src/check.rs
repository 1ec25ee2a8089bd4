//! # Check Pipeline
//!
//! Sequences document load → schema load → validation and maps the outcome
//! onto the process contract:
//!
//! - success: `Configuration is valid.` on stdout, exit code 0;
//! - any failure: the message logged at `error` on stderr, `Error: <message>`
//!   on stdout, exit code 1.
//!
//! Each step runs only if the previous one succeeded.

use std::io::{self, Write};
use std::process::ExitCode;

use thiserror::Error;

use confgate_schema::{
    load_document, load_schema, validate, DocumentError, ErrorCategory, SchemaError, ValidateError,
};

use crate::args::CheckArgs;
use crate::logging::LogSettings;

/// Confirmation printed when the document conforms.
pub const VALID_MESSAGE: &str = "Configuration is valid.";

/// Any failure of the check pipeline.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The configuration file could not be loaded.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The schema file could not be loaded.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The schema did not compile or the document does not conform.
    #[error(transparent)]
    Validate(#[from] ValidateError),
}

impl CheckError {
    /// Taxonomy bucket of the underlying component error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Document(e) => e.category(),
            Self::Schema(e) => e.category(),
            Self::Validate(e) => e.category(),
        }
    }
}

/// Run the pipeline without producing any user-facing output.
pub fn run(args: &CheckArgs) -> Result<(), CheckError> {
    tracing::info!(path = %args.config_file.display(), "loading configuration");
    let document = load_document(&args.config_file, args.format.map(Into::into))?;

    tracing::info!(path = %args.schema_file.display(), "loading schema");
    let schema = load_schema(&args.schema_file)?;

    tracing::info!(format = %document.format(), "validating configuration");
    validate(&document, &schema)?;
    Ok(())
}

/// Run the pipeline and write the one-line verdict to `out`.
///
/// Returns the process exit code.
pub fn report<W: Write>(args: &CheckArgs, out: &mut W) -> io::Result<u8> {
    match run(args) {
        Ok(()) => {
            tracing::info!("{VALID_MESSAGE}");
            writeln!(out, "{VALID_MESSAGE}")?;
            Ok(0)
        }
        Err(e) => {
            tracing::error!(category = %e.category(), "{e}");
            writeln!(out, "Error: {e}")?;
            Ok(1)
        }
    }
}

/// Entry point for the binary: scopes logging to this call and reports on
/// stdout.
pub fn execute(args: &CheckArgs) -> ExitCode {
    LogSettings::new(args.log_level).scope(|| {
        let stdout = io::stdout();
        match report(args, &mut stdout.lock()) {
            Ok(code) => ExitCode::from(code),
            Err(e) => {
                tracing::error!("failed to write verdict: {e}");
                ExitCode::FAILURE
            }
        }
    })
}
