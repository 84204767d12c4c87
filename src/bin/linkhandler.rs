//! Entry point of the `linkhandler` binary.
//!
//! Browsers and the OS start this binary with a single link argument; users
//! start it with `reg`, `forcereg`, `unreg`, `unproxy`, or no arguments. See
//! [`linkhandler::cli`] for the full command line.

use clap::Parser;
use linkhandler::cli::{self, Cli};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let parsed = match Cli::try_parse() {
        Ok(parsed) => parsed,
        Err(err) => return cli::report_parse_error(&err),
    };
    init_tracing(parsed.verbose);
    cli::run(&parsed)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "linkhandler=debug" } else { "linkhandler=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
