//! Raw file-descriptor streams for the console.
//!
//! Output goes straight to `write(2)` with no user-space buffer, so nothing is
//! lost when a C `main` returns without running Rust destructors.

use std::io::{self, Read, Write};

use libc::c_int;

pub const STDIN_FD: c_int = 0;
pub const STDOUT_FD: c_int = 1;

/// Blocking reader over a borrowed descriptor. `EINTR` is retried.
#[derive(Debug, Clone, Copy)]
pub struct FdReader {
    fd: c_int,
}

impl FdReader {
    pub const fn new(fd: c_int) -> Self {
        Self { fd }
    }

    pub const fn stdin() -> Self {
        Self::new(STDIN_FD)
    }
}

impl Read for FdReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            // SAFETY: `buf` is valid for writes of `buf.len()` bytes.
            let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
            if n >= 0 {
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }
}

/// Unbuffered writer over a borrowed descriptor. `EINTR` is retried; short
/// writes are completed by `write_all`.
#[derive(Debug, Clone, Copy)]
pub struct FdWriter {
    fd: c_int,
}

impl FdWriter {
    pub const fn new(fd: c_int) -> Self {
        Self { fd }
    }

    pub const fn stdout() -> Self {
        Self::new(STDOUT_FD)
    }
}

impl Write for FdWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            // SAFETY: `buf` is valid for reads of `buf.len()` bytes.
            let n = unsafe { libc::write(self.fd, buf.as_ptr().cast(), buf.len()) };
            if n >= 0 {
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
