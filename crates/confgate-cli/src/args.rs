//! # Command-Line Arguments
//!
//! `confgate <config_file> <schema_file> [-f json|yaml] [-l LEVEL]`

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use confgate_schema::Format;

/// Validates a configuration file against a JSON schema and alerts on
/// violations.
///
/// Exits 0 when the configuration conforms and 1 on any failure.
#[derive(Parser, Debug, Clone)]
#[command(name = "confgate", version, about, long_about = None)]
pub struct CheckArgs {
    /// Path to the configuration file (JSON or YAML).
    pub config_file: PathBuf,

    /// Path to the JSON schema file.
    pub schema_file: PathBuf,

    /// Format of the config file. Autodetected if omitted.
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Diagnostic verbosity on stderr.
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

/// `--format` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Parse strictly as JSON.
    Json,
    /// Parse strictly as YAML.
    Yaml,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Format::Json,
            FormatArg::Yaml => Format::Yaml,
        }
    }
}

/// `--log-level` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
    #[value(name = "CRITICAL")]
    Critical,
}
