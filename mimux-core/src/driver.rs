//! The loop driver: spec.md §4.5.
//!
//! Sequences poll -> write -> read -> (exchange -> write)* every cycle
//! until the poller's shutdown predicate holds. This is the only place
//! that ties the other stages together; none of them call each other
//! directly.

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::endpoint::{InputSet, OutputSet};
use crate::exchange::exchange;
use crate::poller::Poller;
use crate::reader::read_inputs;
use crate::writer::write_outputs;

/// Runs the multiplexer loop to completion. Returns once the shutdown
/// predicate holds: every input closed, nothing buffered, no output
/// busy. Does not return early on per-endpoint I/O failure; those are
/// absorbed by closing the offending endpoint.
pub fn run_loop(
    inputs: &mut InputSet,
    outputs: &mut OutputSet,
    config: &Config,
    diagnostics: &Diagnostics,
) {
    let mut poller = Poller::new(config);
    let mut cycle: u64 = 0;

    loop {
        cycle += 1;
        let _span = tracing::debug_span!("cycle", cycle).entered();

        if !poller.poll_cycle(inputs, outputs) {
            break;
        }

        diagnostics.maybe_log_snapshot(inputs, outputs);

        write_outputs(outputs);

        let buffered = read_inputs(inputs);
        if buffered > 0 {
            loop {
                let exchanged = exchange(inputs, outputs);
                write_outputs(outputs);
                if exchanged == 0 {
                    break;
                }
            }
        }
    }

    tracing::debug!(cycles = cycle, "loop terminated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Input, Output};
    use std::io::Write;
    use std::os::unix::io::{FromRawFd, RawFd};

    fn pipe() -> (RawFd, RawFd) {
        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        (fds[0], fds[1])
    }

    fn run(input_payloads: Vec<&[u8]>, num_outputs: usize) -> Vec<Vec<u8>> {
        let mut inputs = Vec::new();
        let mut writer_threads = Vec::new();
        for (idx, payload) in input_payloads.iter().enumerate() {
            let (r, w) = pipe();
            crate::nonblocking::set_nonblocking(r).unwrap();
            let payload = payload.to_vec();
            // Writes the whole payload (which may exceed the pipe's own
            // buffer) on a background thread, then closes the write end so
            // the reader side observes a clean EOF.
            writer_threads.push(std::thread::spawn(move || {
                let mut f = unsafe { std::fs::File::from_raw_fd(w) };
                f.write_all(&payload).unwrap();
            }));
            inputs.push(Input::new(r, format!("in{idx}")));
        }

        let mut outputs = Vec::new();
        let mut read_ends = Vec::new();
        for idx in 0..num_outputs {
            let (r, w) = pipe();
            crate::nonblocking::set_nonblocking(w).unwrap();
            outputs.push(Output::new(w, format!("out{idx}")));
            read_ends.push(r);
        }

        let mut input_set = InputSet::new(inputs);
        let mut output_set = OutputSet::new(outputs);
        let config = Config {
            poll_timeout_msec: 50,
            throttle_sleep: std::time::Duration::from_micros(200),
        };
        run_loop(
            &mut input_set,
            &mut output_set,
            &config,
            &Diagnostics::disabled(),
        );
        drop(input_set);
        drop(output_set);
        for t in writer_threads {
            t.join().unwrap();
        }

        read_ends
            .into_iter()
            .map(|r| {
                let mut f = unsafe { std::fs::File::from_raw_fd(r) };
                let mut buf = Vec::new();
                std::io::Read::read_to_end(&mut f, &mut buf).unwrap();
                buf
            })
            .collect()
    }

    #[test]
    fn scenario_one_in_one_out_is_byte_for_byte_copy() {
        let out = run(vec![b"a\nb\n"], 1);
        assert_eq!(out[0], b"a\nb\n");
    }

    #[test]
    fn scenario_two_inputs_one_output_both_records_present() {
        let out = run(vec![b"a\n", b"b\n"], 1);
        let combined = &out[0];
        assert!(combined.windows(2).any(|w| w == b"a\n"));
        assert!(combined.windows(2).any(|w| w == b"b\n"));
        assert_eq!(combined.len(), 4);
    }

    #[test]
    fn scenario_two_inputs_two_outputs_no_split_records() {
        let out = run(vec![b"x\n", b"y\n"], 2);
        let total: usize = out.iter().map(|o| o.len()).sum();
        assert_eq!(total, 4);
        for o in &out {
            assert!(o == b"x\n" || o == b"y\n" || o.is_empty());
        }
    }

    #[test]
    fn scenario_trailing_partial_record_is_dropped() {
        let out = run(vec![b"p\npar"], 1);
        assert_eq!(out[0], b"p\n");
    }

    #[test]
    fn scenario_large_record_crosses_initial_capacity() {
        let mut payload = vec![b'a'; 64 * 1024];
        payload.push(b'\n');
        let out = run(vec![&payload], 1);
        assert_eq!(out[0].len(), payload.len());
        assert_eq!(out[0], payload);
    }

    #[test]
    fn scenario_three_inputs_hundred_records_each_two_outputs() {
        let mut payload = Vec::new();
        for i in 0..100 {
            payload.extend_from_slice(format!("r{i}\n").as_bytes());
        }
        let out = run(vec![&payload, &payload, &payload], 2);
        let total_records: usize = out
            .iter()
            .map(|o| o.iter().filter(|&&b| b == b'\n').count())
            .sum();
        assert_eq!(total_records, 300);
    }
}
