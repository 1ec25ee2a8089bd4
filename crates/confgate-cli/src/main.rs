//! # confgate CLI Entry Point

use std::process::ExitCode;

use clap::Parser;

use confgate_cli::CheckArgs;

fn main() -> ExitCode {
    let args = CheckArgs::parse();
    confgate_cli::execute(&args)
}
