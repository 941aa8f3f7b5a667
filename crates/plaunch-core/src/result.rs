// SPDX-License-Identifier: MIT OR Apache-2.0
//! Launch outcome types.

use crate::diagnostics;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Classification of launcher-side failures.
///
/// Failures inside the child after it was created (bad working directory,
/// missing executable) are *not* represented here; they arrive as
/// [`LaunchErrorKind::None`] with a non-zero exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchErrorKind {
    /// The child ran and exited normally; `exit_code` is its status.
    #[default]
    None,
    /// An output pipe could not be allocated. No child was created.
    PipeError,
    /// The child process could not be created.
    ForkError,
    /// The child was terminated by a signal; `exit_code` is `128 + signo`.
    Signaled,
    /// Collecting the child's status failed; `exit_code` is the OS errno.
    WaitError,
}

impl fmt::Display for LaunchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::PipeError => "pipe_error",
            Self::ForkError => "fork_error",
            Self::Signaled => "signaled",
            Self::WaitError => "wait_error",
        };
        f.write_str(s)
    }
}

/// Everything a single launch produced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaunchResult {
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
    /// Exit status; only meaningful when `error_kind` is `None`.
    pub exit_code: i32,
    /// Launcher-side failure classification.
    pub error_kind: LaunchErrorKind,
}

impl LaunchResult {
    /// A child that exited normally with `exit_code`.
    pub fn exited(exit_code: i32, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            error_kind: LaunchErrorKind::None,
        }
    }

    /// Pipe allocation failed with OS error `errno`.
    pub fn pipe_failure(errno: i32) -> Self {
        Self {
            exit_code: errno,
            error_kind: LaunchErrorKind::PipeError,
            ..Self::default()
        }
    }

    /// Process creation failed.
    pub fn fork_failure() -> Self {
        Self {
            exit_code: -1,
            error_kind: LaunchErrorKind::ForkError,
            ..Self::default()
        }
    }

    /// The child was killed by `signal`; output up to that point is kept.
    pub fn signaled(signal: i32, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        Self {
            stdout,
            stderr,
            exit_code: 128 + signal,
            error_kind: LaunchErrorKind::Signaled,
        }
    }

    /// Returns `true` if the child exited normally with status 0.
    pub fn success(&self) -> bool {
        self.error_kind == LaunchErrorKind::None && self.exit_code == 0
    }

    /// Returns `true` if stdout carries the launcher's setup-failure marker.
    ///
    /// The marker is written when there was no command to run or the program
    /// could not be exec'd. A working-directory failure (status 254) writes
    /// no marker, so it returns `false` here even though the program never
    /// ran.
    pub fn launcher_failed(&self) -> bool {
        diagnostics::has_marker(&self.stdout)
    }

    /// Stdout decoded as UTF-8, replacing invalid sequences.
    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Stderr decoded as UTF-8, replacing invalid sequences.
    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}
