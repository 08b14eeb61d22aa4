//! Failure modes that belong to the CLI layer, not THE CORE.
//!
//! `mimux_core::MimuxError` only ever reports setup (nonblocking-mode)
//! failure; opening the paths the user named on the command line is a
//! failure mode THE CORE doesn't have, so it's modeled separately here
//! and mapped to its own process exit code.

use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("failed to open input {path:?}: {source}"))]
    OpenInput {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("failed to open output {path:?}: {source}"))]
    OpenOutput {
        path: String,
        source: std::io::Error,
    },
}
