// SPDX-License-Identifier: MIT OR Apache-2.0
//! plaunch-core
//!
//! The launch contract shared by every launcher: the [`LaunchPlugin`] trait,
//! named [`LaunchOptions`], the per-launcher [`LauncherConfig`], and the
//! [`LaunchResult`] handed back to callers.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod blocking;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod options;
pub mod result;

pub use blocking::launch_blocking;
pub use config::LauncherConfig;
pub use error::{LaunchError, OptionError};
pub use options::{COMMANDS_KEY, LaunchOptions, OptionValue, WORKDIR_KEY};
pub use result::{LaunchErrorKind, LaunchResult};

use std::fmt;

/// A strategy for running one external command to completion.
///
/// Implementations own a [`LauncherConfig`] (working directory and prefix
/// command) that is exposed to configuration systems through
/// [`get_options`](LaunchPlugin::get_options) and
/// [`set_options`](LaunchPlugin::set_options).
pub trait LaunchPlugin: fmt::Debug + Send + Sync {
    /// Stable registry key for this launcher (e.g. `"forkexec"`).
    fn name(&self) -> &'static str;

    /// Run `configured prefix ++ full_command` and block until it exits.
    ///
    /// Setup failures that happen after the child exists (bad working
    /// directory, missing executable, empty command) are reported through a
    /// non-zero exit code and diagnostic output, not through
    /// [`LaunchResult::error_kind`].
    fn launch(&self, full_command: &[String]) -> LaunchResult;

    /// Current configuration as named options.
    fn get_options(&self) -> LaunchOptions;

    /// Apply named options. Absent keys are left unchanged and unknown keys
    /// are ignored; on error the launcher is not modified.
    fn set_options(&mut self, options: &LaunchOptions) -> Result<(), OptionError>;

    /// An independently configurable copy of this launcher.
    fn clone_plugin(&self) -> Box<dyn LaunchPlugin>;
}

impl Clone for Box<dyn LaunchPlugin> {
    fn clone(&self) -> Self {
        self.clone_plugin()
    }
}
