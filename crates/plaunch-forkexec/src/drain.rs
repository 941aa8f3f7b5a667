// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parent-side capture: drain both pipes, then check on the child, until it
//! reaches a terminal status.

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::os::fd::{AsFd, OwnedFd};
use tracing::{trace, warn};

const CHUNK_SIZE: usize = 8192;

/// Upper bound on how long one cycle sleeps waiting for output.
const POLL_INTERVAL_MS: u16 = 50;

/// Accumulates everything readable from one non-blocking pipe.
pub(crate) struct OutputDrain {
    stream: &'static str,
    file: File,
    buf: Vec<u8>,
    open: bool,
}

impl OutputDrain {
    pub(crate) fn new(stream: &'static str, fd: OwnedFd) -> Self {
        Self {
            stream,
            file: File::from(fd),
            buf: Vec::new(),
            open: true,
        }
    }

    /// Read until the pipe would block or reaches EOF.
    pub(crate) fn drain(&mut self) {
        let mut chunk = [0u8; CHUNK_SIZE];
        while self.open {
            match self.file.read(&mut chunk) {
                Ok(0) => self.open = false,
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!(target: "plaunch.forkexec", stream = self.stream, "read failed: {e}");
                    self.open = false;
                }
            }
        }
    }

    fn poll_fd(&self) -> Option<PollFd<'_>> {
        self.open
            .then(|| PollFd::new(self.file.as_fd(), PollFlags::POLLIN))
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// How the wait loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChildExit {
    Exited(i32),
    Signaled(i32),
    WaitFailed(Errno),
}

/// Drain both streams and poll the child until it has terminated.
///
/// `waitpid` runs without `WUNTRACED`, so a stopped child reads as still
/// alive and the loop sleeps in `poll` instead of spinning.
pub(crate) fn wait_for_exit(
    child: Pid,
    stdout: &mut OutputDrain,
    stderr: &mut OutputDrain,
) -> ChildExit {
    loop {
        stdout.drain();
        stderr.drain();

        match waitpid(child, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(_, code)) => {
                stdout.drain();
                stderr.drain();
                return ChildExit::Exited(code);
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                stdout.drain();
                stderr.drain();
                return ChildExit::Signaled(signal as i32);
            }
            Ok(_) => await_output(stdout, stderr),
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                warn!(target: "plaunch.forkexec", pid = child.as_raw(), "waitpid failed: {errno}");
                return ChildExit::WaitFailed(errno);
            }
        }
    }
}

fn await_output(stdout: &OutputDrain, stderr: &OutputDrain) {
    let mut fds: Vec<PollFd<'_>> = [stdout, stderr]
        .into_iter()
        .filter_map(OutputDrain::poll_fd)
        .collect();
    if let Err(errno) = poll(&mut fds, PollTimeout::from(POLL_INTERVAL_MS)) {
        trace!(target: "plaunch.forkexec", "poll interrupted: {errno}");
    }
}
