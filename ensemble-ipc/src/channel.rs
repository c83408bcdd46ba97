//! One-Shot Channel
//!
//! A unidirectional pipe owned by exactly one parent/child pair. The child
//! keeps the write end and sends a single [`Outcome`]; the parent keeps the
//! read end and collects everything until the child closes its side.

use crate::messages::{Outcome, PayloadError};
use std::fs::File;
use std::io::{Read, Write};
use std::os::unix::io::{FromRawFd, RawFd};

/// Maximum payload size (16 MB) to prevent memory exhaustion
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Create a pipe pair, returning (read_fd, write_fd).
fn create_pipe() -> Result<(RawFd, RawFd), std::io::Error> {
    let mut fds = [0 as RawFd; 2];
    let ret = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // Close-on-exec so the ends never leak into unrelated programs.
    for &fd in &fds {
        unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFD);
            libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC);
        }
    }
    Ok((fds[0], fds[1]))
}

/// Open a one-shot channel.
pub fn channel() -> Result<(ChannelReader, ChannelWriter), std::io::Error> {
    let (read_fd, write_fd) = create_pipe()?;
    let reader = unsafe { File::from_raw_fd(read_fd) };
    let writer = unsafe { File::from_raw_fd(write_fd) };
    Ok((ChannelReader { file: reader }, ChannelWriter { file: writer }))
}

/// Read end of a one-shot channel. Closed on drop.
#[derive(Debug)]
pub struct ChannelReader {
    file: File,
}

impl ChannelReader {
    /// Block until the write end is closed and return everything sent.
    pub fn read_payload(mut self) -> Result<Vec<u8>, PayloadError> {
        let mut payload = Vec::new();
        (&mut self.file)
            .take(MAX_PAYLOAD_SIZE as u64 + 1)
            .read_to_end(&mut payload)?;
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(PayloadError::TooLarge {
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(payload)
    }

    /// Read and decode the outcome sent by the other side.
    pub fn recv(self) -> Result<Outcome, PayloadError> {
        let payload = self.read_payload()?;
        Outcome::decode(&payload)
    }
}

/// Write end of a one-shot channel. Closed on drop.
#[derive(Debug)]
pub struct ChannelWriter {
    file: File,
}

impl ChannelWriter {
    /// Send the outcome and close the channel.
    pub fn send(mut self, outcome: &Outcome) -> Result<(), std::io::Error> {
        self.file.write_all(&outcome.encode())?;
        self.file.flush()
    }
}
