//! The reader stage: spec.md §4.2.
//!
//! Drains every readable, not-yet-full input into its buffer, scanning
//! each newly appended span for the record separator and growing the
//! buffer (doubling) when a single record outgrows it.

use crate::endpoint::InputSet;

/// Drains every eligible input once. Returns the number of inputs that
/// hold at least one complete record after this pass, matching spec.md's
/// "return value: the current count of buffered inputs."
pub fn read_inputs(inputs: &mut InputSet) -> usize {
    for i in 0..inputs.len() {
        read_one(inputs, i);
    }
    inputs.num_buffered()
}

fn read_one(inputs: &mut InputSet, i: usize) {
    loop {
        let input = inputs.get(i);
        if input.is_closed() || !input.readable || input.buffer.size() >= input.buffer.capacity() {
            return;
        }

        let attempts = if input.near_eof { 2 } else { 1 };
        for _ in 0..attempts {
            let input = inputs.get_mut(i);
            if input.is_closed() || input.buffer.spare_len() == 0 {
                break;
            }
            let fd = input.fd();
            let scan_from = input.buffer.end_of_last_record().map_or(0, |e| e + 1);
            let n = unsafe {
                let spare = input.buffer.spare_mut();
                libc::read(fd, spare.as_mut_ptr() as *mut libc::c_void, spare.len())
            };

            if n > 0 {
                let n = n as usize;
                input.buffer.commit_write(n);
                if input.buffer.scan_for_separator(scan_from) {
                    inputs.set_buffered(i, true);
                }
                tracing::debug!(name = %inputs.get(i).name, bytes = n, "read");
                continue;
            }

            if n == 0 {
                tracing::debug!(name = %input.name, "input reached eof");
                inputs.close(i);
                return;
            }

            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::WouldBlock {
                return;
            }
            tracing::warn!(name = %input.name, error = %err, "fatal read error, closing input");
            inputs.close(i);
            return;
        }

        let input = inputs.get(i);
        if input.is_closed() {
            return;
        }
        // No record boundary yet and the buffer is completely full: a
        // single record is larger than the current capacity. Double it
        // and keep reading in the same cycle so one oversized record
        // never stalls the loop waiting for a fresh poll cycle.
        if !input.buffer.is_buffered() && input.buffer.is_full() {
            inputs.get_mut(i).buffer.enlarge();
            continue;
        }
        return;
    }
}
