//! The observational-only diagnostic surface from spec.md §6: "a process
//! signal... causes a snapshot of endpoint state to be written to the
//! error stream."
//!
//! The original C program installs `SIGUSR1` (and `SIGINFO` on Darwin) and
//! calls `fprintf` directly from the signal handler. That's not something
//! Rust lets you do safely (allocating, locking, or formatting in a
//! signal handler is undefined behavior if the signal lands mid-allocation
//! elsewhere in the process). Instead, following the convention the wider
//! ecosystem uses for this exact problem, the handler only flips an
//! `AtomicBool`; the loop driver checks that flag once per cycle, and if
//! set, logs the snapshot itself from ordinary, non-signal context. This
//! keeps the hard requirement from spec.md §5 that the handler "must not
//! mutate counters".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::endpoint::{InputSet, OutputSet};

/// Holds the flag a `SIGUSR1` handler sets; checked once per loop cycle.
#[derive(Clone)]
pub struct Diagnostics {
    requested: Arc<AtomicBool>,
}

impl Diagnostics {
    /// Registers the `SIGUSR1` handler. Returns `Err` only if the
    /// underlying `sigaction` call fails, which is not considered fatal
    /// by callers: a process that can't install the diagnostic handler
    /// can still multiplex records correctly, it just can't be asked for
    /// a state dump.
    pub fn install() -> std::io::Result<Self> {
        let requested = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&requested))?;
        Ok(Self { requested })
    }

    /// A `Diagnostics` that never fires, for contexts (such as tests) that
    /// don't want to install a real process-wide signal handler.
    pub fn disabled() -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// If the flag is set, logs the snapshot and clears it. Cheap to call
    /// every cycle when it isn't set.
    pub fn maybe_log_snapshot(&self, inputs: &InputSet, outputs: &OutputSet) {
        if !self.requested.swap(false, Ordering::Relaxed) {
            return;
        }
        tracing::info!(
            inputs.buffered = inputs.num_buffered(),
            inputs.readable = inputs.num_readable(),
            inputs.open = inputs.num_open(),
            inputs.total = inputs.len(),
            outputs.busy = outputs.num_busy(),
            outputs.writable = outputs.num_writable(),
            outputs.open = outputs.num_open(),
            outputs.total = outputs.len(),
            "endpoint snapshot requested"
        );
        for input in inputs.iter() {
            tracing::info!(
                name = %input.name,
                closed = input.is_closed(),
                readable = input.readable,
                buffered = input.is_buffered(),
                near_eof = input.near_eof,
                buffer.size = input.buffer.size(),
                buffer.capacity = input.buffer.capacity(),
                "input state"
            );
        }
        for output in outputs.iter() {
            tracing::info!(
                name = %output.name,
                closed = output.is_closed(),
                writable = output.writable,
                busy = output.is_busy(),
                buffer.size = output.buffer.size(),
                buffer.capacity = output.buffer.capacity(),
                "output state"
            );
        }
    }
}
