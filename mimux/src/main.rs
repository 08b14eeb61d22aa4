//! `mimux`: the thin binary front-end around `mimux-core`.
//!
//! Parses `argv`, opens the named input/output paths, installs logging,
//! and hands already-open, already-named descriptors to
//! `mimux_core::run`. Everything here is an external collaborator spec.md
//! §1 places out of THE CORE's scope.

mod cli;
mod error;

use clap::Parser;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    std::process::exit(run());
}

fn run() -> i32 {
    let cli = cli::Cli::parse();

    let (inputs, outputs) = match cli.open() {
        Ok(pair) => pair,
        Err(err) => {
            tracing::error!(error = %err, "failed to open path");
            return 2;
        }
    };

    let config = mimux_core::Config::from_env();
    match mimux_core::run(inputs, outputs, config) {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(error = %err, "setup failed, loop did not start");
            1
        }
    }
}
