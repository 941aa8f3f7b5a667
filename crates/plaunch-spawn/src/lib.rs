// SPDX-License-Identifier: MIT OR Apache-2.0
//! plaunch-spawn
//!
//! A [`LaunchPlugin`] over [`std::process::Command`], for platforms without
//! `fork`. Setup failures are reported the same way the fork/exec launcher
//! reports them from inside its child: a non-zero exit status plus the shared
//! diagnostics.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use plaunch_core::diagnostics::{
    self, API_MARKER, CHDIR_FAILURE_STATUS, EXEC_FAILURE_STATUS, NO_PROCESS_MESSAGE,
};
use plaunch_core::{
    LaunchErrorKind, LaunchOptions, LaunchPlugin, LaunchResult, LauncherConfig, OptionError,
};
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, warn};

/// Registry key of [`SpawnLauncher`].
pub const NAME: &str = "spawn";

/// Launches commands through the standard library's process API.
#[derive(Debug, Clone, Default)]
pub struct SpawnLauncher {
    config: LauncherConfig,
}

impl SpawnLauncher {
    /// A launcher running in `.` with no prefix command.
    pub fn new() -> Self {
        Self::default()
    }

    /// A launcher with the given configuration.
    pub fn with_config(config: LauncherConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    fn setup_failure(status: i32, marker: bool, stderr: String) -> LaunchResult {
        let stdout = if marker {
            API_MARKER.as_bytes().to_vec()
        } else {
            Vec::new()
        };
        LaunchResult::exited(status, stdout, stderr.into_bytes())
    }

    fn spawn_failure(&self, program: &str, err: io::Error) -> LaunchResult {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Self::setup_failure(
                EXEC_FAILURE_STATUS,
                true,
                diagnostics::exec_failure(program, &err.to_string()),
            ),
            _ => {
                warn!(target: "plaunch.spawn", "failed to spawn {program}: {err}");
                LaunchResult {
                    exit_code: err.raw_os_error().unwrap_or(-1),
                    ..LaunchResult::fork_failure()
                }
            }
        }
    }
}

fn check_workdir(workdir: &Path) -> Result<(), String> {
    match std::fs::metadata(workdir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err("Not a directory".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

fn decode_status(status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> LaunchResult {
    if let Some(code) = status.code() {
        return LaunchResult::exited(code, stdout, stderr);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return LaunchResult::signaled(signal, stdout, stderr);
        }
    }
    LaunchResult {
        stdout,
        stderr,
        exit_code: -1,
        error_kind: LaunchErrorKind::WaitError,
    }
}

impl LaunchPlugin for SpawnLauncher {
    fn name(&self) -> &'static str {
        NAME
    }

    fn launch(&self, full_command: &[String]) -> LaunchResult {
        let argv = self.config.effective_command(full_command);
        let workdir = &self.config.workdir;
        debug!(target: "plaunch.spawn", ?argv, workdir = %workdir.display(), "launching");

        // `current_dir` failures are indistinguishable from a missing program
        // once `spawn` runs, so check the directory first.
        if let Err(reason) = check_workdir(workdir) {
            return Self::setup_failure(
                CHDIR_FAILURE_STATUS,
                false,
                diagnostics::chdir_failure(&workdir.display().to_string(), &reason),
            );
        }

        let Some((program, args)) = argv.split_first() else {
            return Self::setup_failure(EXEC_FAILURE_STATUS, true, NO_PROCESS_MESSAGE.to_string());
        };

        let output = Command::new(program)
            .args(args)
            .current_dir(workdir)
            .stdin(Stdio::inherit())
            .output();

        let result = match output {
            Ok(out) => decode_status(out.status, out.stdout, out.stderr),
            Err(err) => self.spawn_failure(program, err),
        };

        debug!(
            target: "plaunch.spawn",
            exit_code = result.exit_code,
            error_kind = %result.error_kind,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "launch finished"
        );
        result
    }

    fn get_options(&self) -> LaunchOptions {
        self.config.to_options()
    }

    fn set_options(&mut self, options: &LaunchOptions) -> Result<(), OptionError> {
        self.config.apply_options(options)
    }

    fn clone_plugin(&self) -> Box<dyn LaunchPlugin> {
        Box::new(self.clone())
    }
}
