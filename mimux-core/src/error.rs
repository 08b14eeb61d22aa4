//! Typed errors for the small set of failures that abort the loop.
//!
//! Per-endpoint I/O failures (a dead input, a broken pipe on an output) are
//! deliberately *not* modeled here: the loop driver absorbs those by
//! closing just the offending endpoint and logging a `tracing::warn!`,
//! exactly as spec'd. Only setup failure is fatal to the whole process.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MimuxError {
    #[snafu(display("failed to set {name} nonblocking: {source}"))]
    SetNonblocking {
        name: String,
        source: std::io::Error,
    },
}
