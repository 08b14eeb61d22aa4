//! `mimux-core` implements THE CORE of a record-oriented N:M stream
//! multiplexer: a single-threaded, nonblocking event loop that moves
//! whole records (newline-terminated byte spans) from any number of
//! readable file descriptors to any number of writable ones, preserving
//! record boundaries and per-input byte ordering.
//!
//! This crate takes already-open, already-named raw file descriptors and
//! nothing else. It has no knowledge of paths, `argv`, or process exit
//! codes — those live in the `mimux` binary crate that wraps this one.
//!
//! The event loop is the sequence documented on [`run`]: poll for
//! readiness, drain writable outputs, drain readable inputs, then
//! repeatedly exchange buffered inputs with idle outputs (and drain
//! again) until nothing more can be exchanged this cycle.

pub mod buffer;
pub mod config;
pub mod diagnostics;
mod driver;
pub mod endpoint;
mod error;
mod exchange;
pub mod nonblocking;
mod poller;
mod reader;
mod writer;

use std::os::unix::io::RawFd;

pub use config::Config;
pub use diagnostics::Diagnostics;
pub use endpoint::{Input, InputSet, Output, OutputSet};
pub use error::MimuxError;

/// One named, already-open, readable descriptor to be multiplexed from.
pub struct NamedInput {
    pub fd: RawFd,
    pub name: String,
}

/// One named, already-open, writable descriptor to be multiplexed to.
pub struct NamedOutput {
    pub fd: RawFd,
    pub name: String,
}

/// Runs the multiplexer to completion: puts every descriptor into
/// nonblocking mode (the one setup step that can fail fatally, per
/// spec.md §7), then drives the event loop until the shutdown predicate
/// holds (all inputs closed, nothing buffered, no output busy).
///
/// Descriptors are closed by the core as their owning endpoints go out of
/// scope at the end of this call.
pub fn run(
    inputs: Vec<NamedInput>,
    outputs: Vec<NamedOutput>,
    config: Config,
) -> Result<(), MimuxError> {
    for input in &inputs {
        nonblocking::set_nonblocking(input.fd).map_err(|source| {
            error::MimuxError::SetNonblocking {
                name: input.name.clone(),
                source,
            }
        })?;
    }
    for output in &outputs {
        nonblocking::set_nonblocking(output.fd).map_err(|source| {
            error::MimuxError::SetNonblocking {
                name: output.name.clone(),
                source,
            }
        })?;
    }

    let mut input_set = InputSet::new(
        inputs
            .into_iter()
            .map(|i| Input::new(i.fd, i.name))
            .collect(),
    );
    let mut output_set = OutputSet::new(
        outputs
            .into_iter()
            .map(|o| Output::new(o.fd, o.name))
            .collect(),
    );

    let diagnostics = Diagnostics::install().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to install diagnostic signal handler, continuing without it");
        Diagnostics::disabled()
    });

    driver::run_loop(&mut input_set, &mut output_set, &config, &diagnostics);
    Ok(())
}
