//! The readiness poller: spec.md §4.1.
//!
//! Builds a `poll(2)` request from the currently open endpoints, waits on
//! it with the configured timeout, and updates each endpoint's
//! `readable`/`writable`/`near_eof` flags (and their aggregate counts).
//! Also owns the shutdown predicate ("no flow is possible, stop") and the
//! throttle-sleep fallback for platforms where `poll` under-reports
//! readiness.

use std::time::Duration;

use crate::config::Config;
use crate::endpoint::{InputSet, OutputSet};

pub struct Poller {
    /// Reused across cycles; never reallocated after it first grows to
    /// its steady-state size, matching spec.md §5's "allocated once... and
    /// reused".
    fds: Vec<libc::pollfd>,
    poll_timeout_msec: i32,
    throttle_sleep: Duration,
}

impl Poller {
    pub fn new(config: &Config) -> Self {
        Self {
            fds: Vec::new(),
            poll_timeout_msec: config.poll_timeout_msec,
            throttle_sleep: config.throttle_sleep,
        }
    }

    /// Runs one readiness-poll step. Returns `false` exactly when the
    /// shutdown predicate holds (spec.md §4.1 step 1): all inputs closed,
    /// nothing buffered, no output busy. Otherwise returns `true`, having
    /// updated readiness flags (or, on a `poll` failure, having left them
    /// untouched and treated the cycle as having seen zero events).
    pub fn poll_cycle(&mut self, inputs: &mut InputSet, outputs: &mut OutputSet) -> bool {
        if inputs.num_closed() == inputs.len() && inputs.num_buffered() == 0 && outputs.num_busy() == 0
        {
            tracing::debug!("no data flow possible, shutting down");
            return false;
        }

        inputs.compact_closed();
        outputs.compact_closed();

        let num_inputs = inputs.num_open();
        let num_outputs = outputs.num_open();
        let total = num_inputs + num_outputs;

        self.fds.clear();
        self.fds.resize(
            total,
            libc::pollfd {
                fd: -1,
                events: 0,
                revents: 0,
            },
        );
        for i in 0..num_inputs {
            self.fds[i] = libc::pollfd {
                fd: inputs.get(i).fd(),
                events: libc::POLLIN,
                revents: 0,
            };
        }
        for i in 0..num_outputs {
            let busy = outputs.get(i).is_busy();
            self.fds[num_inputs + i] = libc::pollfd {
                fd: outputs.get(i).fd(),
                events: if busy { libc::POLLOUT } else { 0 },
                revents: 0,
            };
        }

        tracing::debug!(num_inputs, num_outputs, "polling");
        let num_events = unsafe {
            libc::poll(
                self.fds.as_mut_ptr(),
                total as libc::nfds_t,
                self.poll_timeout_msec,
            )
        };

        if num_events < 0 {
            tracing::warn!(error = %std::io::Error::last_os_error(), "poll failed");
            return true;
        }

        if num_events == 0 {
            // Timeout: optimistically mark everything polled as ready, for
            // platforms where the readiness primitive is lossy.
            tracing::debug!("poll timeout, marking all polled endpoints ready");
            for i in 0..num_inputs {
                inputs.set_readable(i, true);
                inputs.get_mut(i).near_eof = false;
            }
            for i in 0..num_outputs {
                outputs.set_writable(i, true);
            }
            return true;
        }

        for i in 0..num_inputs {
            let revents = self.fds[i].revents;
            let readable = revents & (libc::POLLIN | libc::POLLHUP) != 0;
            inputs.set_readable(i, readable);
            inputs.get_mut(i).near_eof = revents & libc::POLLHUP != 0;
        }
        for i in 0..num_outputs {
            let revents = self.fds[num_inputs + i].revents;
            let writable =
                !outputs.get(i).is_busy() || revents & (libc::POLLOUT | libc::POLLHUP) != 0;
            outputs.set_writable(i, writable);
        }

        tracing::debug!(
            readable = inputs.num_readable(),
            writable = outputs.num_writable(),
            "poll returned"
        );

        if inputs.num_readable() + outputs.num_writable() == 0 || outputs.num_busy() == num_outputs
        {
            tracing::debug!(?self.throttle_sleep, "throttling, all outputs busy");
            std::thread::sleep(self.throttle_sleep);
        }

        true
    }
}
