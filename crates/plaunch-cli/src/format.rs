// SPDX-License-Identifier: MIT OR Apache-2.0
//! Output formatting for the `plaunch` CLI.

use chrono::{DateTime, Utc};
use plaunch_core::{LaunchErrorKind, LaunchResult};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Machine-readable summary of one `plaunch run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchReport {
    /// Config entry or registry key that ran the command.
    pub launcher: String,
    /// Effective command (prefix followed by the user command).
    pub argv: Vec<String>,
    /// Working directory the child was started in.
    pub workdir: String,
    /// When the launch was dispatched.
    pub started_at: DateTime<Utc>,
    /// When the result came back.
    pub finished_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Child exit code, or the launcher-side code described by `error_kind`.
    pub exit_code: i32,
    /// Launcher-side failure classification.
    pub error_kind: LaunchErrorKind,
    /// Captured stdout, decoded lossily.
    pub stdout: String,
    /// Captured stderr, decoded lossily.
    pub stderr: String,
    /// Whether stdout carries the setup-failure marker.
    pub launcher_failed: bool,
    /// Raw captured bytes, kept for replay.
    #[serde(skip)]
    pub raw: LaunchResult,
}

impl LaunchReport {
    /// Build a report from a finished launch.
    pub fn new(
        launcher: String,
        argv: Vec<String>,
        workdir: String,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        duration_ms: u64,
        result: &LaunchResult,
    ) -> Self {
        Self {
            launcher,
            argv,
            workdir,
            started_at,
            finished_at,
            duration_ms,
            exit_code: result.exit_code,
            error_kind: result.error_kind,
            stdout: result.stdout_lossy().into_owned(),
            stderr: result.stderr_lossy().into_owned(),
            launcher_failed: result.launcher_failed(),
            raw: result.clone(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the captured bytes unchanged to `out` and `err`.
    pub fn replay(&self, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
        out.write_all(&self.raw.stdout)?;
        out.flush()?;
        err.write_all(&self.raw.stderr)?;
        err.flush()
    }
}
