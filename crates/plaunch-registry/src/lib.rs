// SPDX-License-Identifier: MIT OR Apache-2.0
//! Launcher registry: builds launchers by name.
//!
//! The process-wide [`builtin`] registry is populated on first access with
//! every launcher this workspace ships. Applications with their own launchers
//! start from [`LauncherRegistry::with_builtins`] and [`register`] more.
//!
//! [`register`]: LauncherRegistry::register
#![deny(unsafe_code)]
#![warn(missing_docs)]

use plaunch_core::{LaunchOptions, LaunchPlugin};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

/// Constructor for a freshly configured launcher.
pub type LauncherFactory = fn() -> Box<dyn LaunchPlugin>;

/// Errors from registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No launcher is registered under the requested name.
    #[error("unknown launcher '{name}' (available: {})", .available.join(", "))]
    UnknownLauncher {
        /// Requested name.
        name: String,
        /// Registered names, sorted.
        available: Vec<String>,
    },

    /// The launcher rejected the supplied options.
    #[error("launcher '{name}': {source}")]
    Options {
        /// Launcher name.
        name: String,
        /// Underlying option error.
        #[source]
        source: plaunch_core::OptionError,
    },
}

/// A map of launcher names to factories.
#[derive(Debug, Clone, Default)]
pub struct LauncherRegistry {
    factories: BTreeMap<String, LauncherFactory>,
}

static BUILTIN: LazyLock<LauncherRegistry> = LazyLock::new(LauncherRegistry::with_builtins);

/// The process-wide registry of built-in launchers.
pub fn builtin() -> &'static LauncherRegistry {
    &BUILTIN
}

/// Name of the launcher used when none is configured.
pub fn default_launcher_name() -> &'static str {
    #[cfg(unix)]
    {
        plaunch_forkexec::NAME
    }
    #[cfg(not(unix))]
    {
        plaunch_spawn::NAME
    }
}

#[cfg(unix)]
fn new_forkexec() -> Box<dyn LaunchPlugin> {
    Box::new(plaunch_forkexec::ForkExecLauncher::new())
}

fn new_spawn() -> Box<dyn LaunchPlugin> {
    Box::new(plaunch_spawn::SpawnLauncher::new())
}

fn new_mock() -> Box<dyn LaunchPlugin> {
    Box::new(plaunch_mock::MockLauncher::new())
}

impl LauncherRegistry {
    /// A registry holding every launcher shipped with this workspace.
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        #[cfg(unix)]
        registry.register(plaunch_forkexec::NAME, new_forkexec);
        registry.register(plaunch_spawn::NAME, new_spawn);
        registry.register(plaunch_mock::NAME, new_mock);
        registry
    }

    /// Register a factory under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, factory: LauncherFactory) {
        let name = name.into();
        debug!(target: "plaunch.registry", %name, "registering launcher");
        self.factories.insert(name, factory);
    }

    /// Remove a factory, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<LauncherFactory> {
        self.factories.remove(name)
    }

    /// Check whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn list(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build a default-configured launcher.
    pub fn build(&self, name: &str) -> Result<Box<dyn LaunchPlugin>, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::UnknownLauncher {
                name: name.to_string(),
                available: self.list().into_iter().map(str::to_string).collect(),
            })?;
        Ok(factory())
    }

    /// Build a launcher and apply `options` to it.
    pub fn build_with_options(
        &self,
        name: &str,
        options: &LaunchOptions,
    ) -> Result<Box<dyn LaunchPlugin>, RegistryError> {
        let mut launcher = self.build(name)?;
        launcher
            .set_options(options)
            .map_err(|source| RegistryError::Options {
                name: name.to_string(),
                source,
            })?;
        Ok(launcher)
    }
}
