//! The writer stage: spec.md §4.4.
//!
//! Drains every busy, writable output by issuing a single nonblocking
//! write per cycle and advancing the buffer's read cursor by however much
//! actually went out.

use crate::endpoint::OutputSet;

/// Drains every eligible output once.
pub fn write_outputs(outputs: &mut OutputSet) {
    for i in 0..outputs.len() {
        write_one(outputs, i);
    }
}

fn write_one(outputs: &mut OutputSet, i: usize) {
    let output = outputs.get(i);
    if output.is_closed() || !output.is_busy() || !output.writable {
        return;
    }
    if output.buffer.is_empty() {
        outputs.set_busy(i, false);
        return;
    }

    let output_mut = outputs.get_mut(i);
    let fd = output_mut.fd();
    let n = unsafe {
        let bytes = output_mut.buffer.occupied();
        libc::write(fd, bytes.as_ptr() as *const libc::c_void, bytes.len())
    };

    if n >= 0 {
        let n = n as usize;
        outputs.get_mut(i).buffer.consume(n);
        tracing::debug!(name = %outputs.get(i).name, bytes = n, "wrote");
        if outputs.get(i).buffer.is_empty() {
            outputs.set_busy(i, false);
        }
        return;
    }

    let err = std::io::Error::last_os_error();
    if err.kind() == std::io::ErrorKind::WouldBlock {
        return;
    }
    tracing::warn!(name = %outputs.get(i).name, error = %err, "fatal write error, closing output, pending bytes dropped");
    outputs.close(i);
}
