// SPDX-License-Identifier: MIT OR Apache-2.0
//! Child-side setup between `fork` and `execvp`.
//!
//! Runs in the forked copy of a possibly multi-threaded parent: only
//! async-signal-safe calls, no allocation, no logging.

use crate::pipe::Pipe;
use nix::errno::Errno;
use nix::fcntl::{FcntlArg, FdFlag, fcntl};
use nix::libc;
use plaunch_core::diagnostics::{
    API_MARKER, CHDIR_FAILURE_PREFIX, CHDIR_FAILURE_STATUS, EXEC_FAILURE_PREFIX,
    EXEC_FAILURE_STATUS, NO_PROCESS_MESSAGE,
};
use std::ffi::{CString, c_char};
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tracing::warn;

/// Working directory and argv converted for exec, built before the fork.
pub(crate) struct ExecPlan {
    workdir: CString,
    argv: Vec<CString>,
    // NUL-terminated; points into `argv`.
    argv_ptrs: Vec<*const c_char>,
}

impl ExecPlan {
    pub(crate) fn new(workdir: &Path, argv: &[String]) -> Self {
        let workdir = c_string(workdir.as_os_str().as_bytes());
        let argv: Vec<CString> = argv.iter().map(|a| c_string(a.as_bytes())).collect();
        let argv_ptrs = argv
            .iter()
            .map(|a| a.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();
        Self {
            workdir,
            argv,
            argv_ptrs,
        }
    }
}

/// C strings end at the first NUL, so that is what exec would see anyway.
fn c_string(bytes: &[u8]) -> CString {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    if end < bytes.len() {
        warn!(target: "plaunch.forkexec", "argument truncated at interior NUL byte");
    }
    CString::new(&bytes[..end]).unwrap_or_default()
}

/// Redirect output, change directory and exec. Never returns.
pub(crate) fn run_child(plan: &ExecPlan, stdout: Pipe, stderr: Pipe) -> ! {
    let Pipe {
        read: out_read,
        write: out_write,
    } = stdout;
    let Pipe {
        read: err_read,
        write: err_write,
    } = stderr;
    drop(out_read);
    drop(err_read);

    if redirect(out_write, libc::STDOUT_FILENO).is_err()
        || redirect(err_write, libc::STDERR_FILENO).is_err()
    {
        exit(EXEC_FAILURE_STATUS);
    }

    if let Err(errno) = nix::unistd::chdir(plan.workdir.as_c_str()) {
        write_parts(
            libc::STDERR_FILENO,
            &[
                CHDIR_FAILURE_PREFIX.as_bytes(),
                b" ",
                plan.workdir.as_bytes(),
                b": ",
                errno.desc().as_bytes(),
                b"\n",
            ],
        );
        exit(CHDIR_FAILURE_STATUS);
    }

    let Some(program) = plan.argv.first() else {
        write_parts(libc::STDOUT_FILENO, &[API_MARKER.as_bytes()]);
        write_parts(libc::STDERR_FILENO, &[NO_PROCESS_MESSAGE.as_bytes()]);
        exit(EXEC_FAILURE_STATUS);
    };

    // SAFETY: `argv_ptrs` is NUL-terminated and every other entry points at a
    // CString owned by `plan.argv`, which outlives the call.
    unsafe { libc::execvp(program.as_ptr(), plan.argv_ptrs.as_ptr()) };
    let errno = Errno::last();

    write_parts(libc::STDOUT_FILENO, &[API_MARKER.as_bytes()]);
    write_parts(
        libc::STDERR_FILENO,
        &[
            EXEC_FAILURE_PREFIX.as_bytes(),
            b": ",
            errno.desc().as_bytes(),
            b" ",
            program.as_bytes(),
            b"\n",
        ],
    );
    exit(EXEC_FAILURE_STATUS)
}

/// Make `fd` available as `target`, closing the original descriptor.
fn redirect(fd: OwnedFd, target: RawFd) -> nix::Result<()> {
    if fd.as_raw_fd() == target {
        // Already in place: keep it open and drop close-on-exec.
        let raw = fd.into_raw_fd();
        fcntl(raw, FcntlArg::F_SETFD(FdFlag::empty()))?;
        return Ok(());
    }
    nix::unistd::dup2(fd.as_raw_fd(), target)?;
    Ok(())
}

fn write_parts(fd: RawFd, parts: &[&[u8]]) {
    for part in parts {
        let mut rest = *part;
        while !rest.is_empty() {
            // SAFETY: `rest` is a live, initialised buffer of `rest.len()` bytes.
            let n = unsafe { libc::write(fd, rest.as_ptr().cast(), rest.len()) };
            if n < 0 {
                if Errno::last() == Errno::EINTR {
                    continue;
                }
                return;
            }
            if n == 0 {
                return;
            }
            rest = &rest[n as usize..];
        }
    }
}

fn exit(status: i32) -> ! {
    // SAFETY: `_exit` skips atexit handlers and stdio flushing, which belong
    // to the parent's copy of the process image.
    unsafe { libc::_exit(status) }
}
