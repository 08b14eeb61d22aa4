//! Puts a raw file descriptor into nonblocking mode.
//!
//! Mirrors `setNonblocking` from the original C implementation: read the
//! current flags via `F_GETFL`, OR in `O_NONBLOCK`, write them back via
//! `F_SETFL`. Every input and output descriptor must go through this
//! before the loop starts; failure here is the one setup error that's
//! fatal to the whole process (spec.md §7).

use std::os::unix::io::RawFd;

pub fn set_nonblocking(fd: RawFd) -> std::io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL, 0) };
    let flags = if flags < 0 { 0 } else { flags };
    let ret = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
    if ret < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}
