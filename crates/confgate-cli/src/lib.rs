//! # confgate-cli — Pre-Deployment Configuration Gate
//!
//! Provides the `confgate` binary:
//!
//! ```bash
//! confgate deploy/app.yaml schemas/app.schema.json
//! confgate settings.conf schema.json --format yaml --log-level DEBUG
//! ```
//!
//! ## Modules
//!
//! - [`args`] — clap argument definitions.
//! - [`logging`] — per-invocation `tracing` subscriber on stderr.
//! - [`check`] — the load → load → validate pipeline and its exit contract.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the pipeline.
//! - Loading and validation are delegated to `confgate-schema`, with no
//!   business logic here.
//! - Exit code is 0 for a conforming document and 1 for anything else.

pub mod args;
pub mod check;
pub mod logging;

pub use args::{CheckArgs, FormatArg, LogLevel};
pub use check::{execute, report, run, CheckError, VALID_MESSAGE};
pub use logging::LogSettings;
