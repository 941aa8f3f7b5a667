// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration carried by every launcher.

use crate::error::OptionError;
use crate::options::{COMMANDS_KEY, LaunchOptions, WORKDIR_KEY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Working directory and prefix command applied to every launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Directory the child changes into before exec.
    pub workdir: PathBuf,
    /// Prefix prepended to every caller-supplied command.
    pub commands: Vec<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            commands: Vec::new(),
        }
    }
}

impl LauncherConfig {
    /// `commands` followed by `full_command`.
    pub fn effective_command(&self, full_command: &[String]) -> Vec<String> {
        self.commands
            .iter()
            .chain(full_command)
            .cloned()
            .collect()
    }

    /// Export as named options.
    pub fn to_options(&self) -> LaunchOptions {
        LaunchOptions::new()
            .with(WORKDIR_KEY, self.workdir.to_string_lossy().into_owned())
            .with(COMMANDS_KEY, self.commands.clone())
    }

    /// Apply named options. Both keys are type-checked before either is
    /// written, so a mismatch leaves `self` unchanged.
    pub fn apply_options(&mut self, options: &LaunchOptions) -> Result<(), OptionError> {
        let workdir = options.get_str(WORKDIR_KEY)?;
        let commands = options.get_list(COMMANDS_KEY)?;

        if let Some(workdir) = workdir {
            self.workdir = PathBuf::from(workdir);
        }
        if let Some(commands) = commands {
            self.commands = commands.to_vec();
        }
        Ok(())
    }
}
