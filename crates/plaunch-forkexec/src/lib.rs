// SPDX-License-Identifier: MIT OR Apache-2.0
//! plaunch-forkexec
//!
//! Launch a command with `fork` + `execvp`, capture its stdout and stderr
//! through two pipes, and block until it exits.
//!
//! The child redirects its output, changes into the configured working
//! directory and execs `prefix ++ command`. The parent drains both pipes in
//! turn and checks on the child between passes, so neither stream can fill
//! up and stall the other.
#![cfg(unix)]
#![warn(missing_docs)]

mod child;
mod drain;
mod pipe;

use child::ExecPlan;
use drain::{ChildExit, OutputDrain};
use nix::errno::Errno;
use nix::unistd::{ForkResult, Pid, fork};
use pipe::Pipe;
use plaunch_core::{
    LaunchErrorKind, LaunchOptions, LaunchPlugin, LaunchResult, LauncherConfig, OptionError,
};
use tracing::{debug, warn};

/// Registry key of [`ForkExecLauncher`].
pub const NAME: &str = "forkexec";

/// Launches each command in a forked child and captures its output.
#[derive(Debug, Clone, Default)]
pub struct ForkExecLauncher {
    config: LauncherConfig,
}

impl ForkExecLauncher {
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

    fn collect(&self, child: Pid, stdout: Pipe, stderr: Pipe) -> LaunchResult {
        let Pipe {
            read: out_read,
            write: out_write,
        } = stdout;
        let Pipe {
            read: err_read,
            write: err_write,
        } = stderr;
        drop(out_write);
        drop(err_write);

        let mut out = OutputDrain::new("stdout", out_read);
        let mut err = OutputDrain::new("stderr", err_read);
        let exit = drain::wait_for_exit(child, &mut out, &mut err);
        let (stdout, stderr) = (out.into_bytes(), err.into_bytes());

        match exit {
            ChildExit::Exited(code) => LaunchResult::exited(code, stdout, stderr),
            ChildExit::Signaled(signal) => LaunchResult::signaled(signal, stdout, stderr),
            ChildExit::WaitFailed(errno) => LaunchResult {
                stdout,
                stderr,
                exit_code: errno as i32,
                error_kind: LaunchErrorKind::WaitError,
            },
        }
    }
}

fn pipe_failed(errno: Errno) -> LaunchResult {
    warn!(target: "plaunch.forkexec", "failed to create output pipe: {errno}");
    LaunchResult::pipe_failure(errno as i32)
}

impl LaunchPlugin for ForkExecLauncher {
    fn name(&self) -> &'static str {
        NAME
    }

    fn launch(&self, full_command: &[String]) -> LaunchResult {
        let argv = self.config.effective_command(full_command);
        debug!(
            target: "plaunch.forkexec",
            ?argv,
            workdir = %self.config.workdir.display(),
            "launching"
        );
        let plan = ExecPlan::new(&self.config.workdir, &argv);

        let stdout = match Pipe::open() {
            Ok(p) => p,
            Err(errno) => return pipe_failed(errno),
        };
        let stderr = match Pipe::open() {
            Ok(p) => p,
            Err(errno) => return pipe_failed(errno),
        };

        // SAFETY: the child branch only runs `run_child`, which sticks to
        // async-signal-safe calls and ends in exec or `_exit`.
        let result = match unsafe { fork() } {
            Err(errno) => {
                warn!(target: "plaunch.forkexec", "fork failed: {errno}");
                return LaunchResult::fork_failure();
            }
            Ok(ForkResult::Child) => child::run_child(&plan, stdout, stderr),
            Ok(ForkResult::Parent { child }) => self.collect(child, stdout, stderr),
        };

        debug!(
            target: "plaunch.forkexec",
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
