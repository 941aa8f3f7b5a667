// SPDX-License-Identifier: MIT OR Apache-2.0
//! Output pipes shared between parent and child.

use nix::fcntl::{FcntlArg, FdFlag, OFlag, fcntl};
use std::os::fd::{AsRawFd, OwnedFd};

/// One unidirectional pipe. Both ends are close-on-exec and the read end is
/// non-blocking, so the parent can drain it without stalling.
pub(crate) struct Pipe {
    pub(crate) read: OwnedFd,
    pub(crate) write: OwnedFd,
}

impl Pipe {
    pub(crate) fn open() -> nix::Result<Self> {
        let (read, write) = nix::unistd::pipe()?;
        for fd in [&read, &write] {
            fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
        }
        let flags = OFlag::from_bits_truncate(fcntl(read.as_raw_fd(), FcntlArg::F_GETFL)?);
        fcntl(read.as_raw_fd(), FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
        Ok(Self { read, write })
    }
}
