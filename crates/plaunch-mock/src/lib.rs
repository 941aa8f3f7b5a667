// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted launcher used for local testing.
//!
//! [`MockLauncher`] never spawns anything: it returns a canned
//! [`LaunchResult`] and records every effective command it was asked to run.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use plaunch_core::{LaunchOptions, LaunchPlugin, LaunchResult, LauncherConfig, OptionError};
use std::sync::{Arc, Mutex, PoisonError};

/// Registry key of [`MockLauncher`].
pub const NAME: &str = "mock";

/// A launcher that answers every call with the same scripted result.
///
/// Clones get their own configuration but share the call log, so a test can
/// hand a clone to the code under test and inspect the original afterwards.
#[derive(Debug, Clone, Default)]
pub struct MockLauncher {
    config: LauncherConfig,
    response: LaunchResult,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockLauncher {
    /// A mock that reports a clean exit with no output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the scripted result.
    #[must_use]
    pub fn with_response(mut self, response: LaunchResult) -> Self {
        self.response = response;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Effective commands received so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LaunchPlugin for MockLauncher {
    fn name(&self) -> &'static str {
        NAME
    }

    fn launch(&self, full_command: &[String]) -> LaunchResult {
        let argv = self.config.effective_command(full_command);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(argv);
        self.response.clone()
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
