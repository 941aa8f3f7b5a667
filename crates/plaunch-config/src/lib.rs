// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for the process launch
//! backplane.
//!
//! This crate provides [`LaunchConfig`], named launcher entries plus logging
//! settings, together with helpers for loading from TOML files, applying
//! environment overrides, merging overlays, and producing advisory
//! [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use plaunch_core::{COMMANDS_KEY, LaunchOptions, WORKDIR_KEY};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// A launcher's working directory does not exist (yet).
    MissingWorkdir {
        /// Launcher entry name.
        launcher: String,
        /// Configured directory.
        workdir: String,
    },
    /// The first element of a prefix command is not found on `PATH`.
    UnresolvedCommand {
        /// Launcher entry name.
        launcher: String,
        /// The command that could not be resolved.
        command: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::MissingWorkdir { launcher, workdir } => {
                write!(f, "launcher '{launcher}': workdir '{workdir}' does not exist")
            }
            ConfigWarning::UnresolvedCommand { launcher, command } => {
                write!(f, "launcher '{launcher}': command '{command}' not found on PATH")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Launcher entry used when none is named on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_launcher: Option<String>,

    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Named launcher definitions.
    #[serde(default)]
    pub launchers: BTreeMap<String, LauncherEntry>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            default_launcher: None,
            log_level: Some("info".into()),
            launchers: BTreeMap::new(),
        }
    }
}

/// A configured launcher: which plugin to build and how to set it up.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LauncherEntry {
    /// Registry key of the launcher plugin (e.g. `"forkexec"`).
    pub plugin: String,

    /// Working directory for launched commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,

    /// Prefix command prepended to every launch.
    #[serde(default)]
    pub commands: Vec<String>,
}

impl LauncherEntry {
    /// An entry for `plugin` with no overrides.
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            workdir: None,
            commands: Vec::new(),
        }
    }

    /// Options to apply to a freshly built plugin.
    ///
    /// `workdir` is only set when configured, so the plugin default stands
    /// otherwise. `commands` is always set.
    pub fn to_options(&self) -> LaunchOptions {
        let mut options = LaunchOptions::new().with(COMMANDS_KEY, self.commands.clone());
        if let Some(workdir) = &self.workdir {
            options.set(WORKDIR_KEY, workdir.clone());
        }
        options
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`LaunchConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`LaunchConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<LaunchConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => LaunchConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML string into a [`LaunchConfig`].
pub fn parse_toml(content: &str) -> Result<LaunchConfig, ConfigError> {
    toml::from_str::<LaunchConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `PLAUNCH_DEFAULT_LAUNCHER`
/// - `PLAUNCH_LOG_LEVEL`
/// - `PLAUNCH_WORKDIR` (replaces the workdir of every launcher entry)
pub fn apply_env_overrides(config: &mut LaunchConfig) {
    if let Ok(val) = std::env::var("PLAUNCH_DEFAULT_LAUNCHER") {
        config.default_launcher = Some(val);
    }
    if let Ok(val) = std::env::var("PLAUNCH_LOG_LEVEL") {
        config.log_level = Some(val);
    }
    if let Ok(val) = std::env::var("PLAUNCH_WORKDIR") {
        for entry in config.launchers.values_mut() {
            entry.workdir = Some(val.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (empty plugin keys, bad log level, a default naming an
/// undefined entry) are returned as a [`ConfigError::ValidationError`]; soft
/// issues come back as warnings.
pub fn validate_config(config: &LaunchConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    match config.default_launcher {
        Some(ref name) if !config.launchers.contains_key(name) => {
            errors.push(format!("default_launcher '{name}' is not defined"));
        }
        Some(_) => {}
        None => warnings.push(ConfigWarning::MissingOptionalField {
            field: "default_launcher".into(),
            hint: "the platform default launcher will be used".into(),
        }),
    }

    for (name, entry) in &config.launchers {
        if name.is_empty() {
            errors.push("launcher name must not be empty".into());
        }
        if entry.plugin.trim().is_empty() {
            errors.push(format!("launcher '{name}': plugin must not be empty"));
        }
        if let Some(ref workdir) = entry.workdir
            && !Path::new(workdir).is_dir()
        {
            warnings.push(ConfigWarning::MissingWorkdir {
                launcher: name.clone(),
                workdir: workdir.clone(),
            });
        }
        if let Some(first) = entry.commands.first()
            && !plaunch_which::command_exists(first)
        {
            warnings.push(ConfigWarning::UnresolvedCommand {
                launcher: name.clone(),
                command: first.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
///
/// Launcher maps are combined; on name collisions the overlay entry wins.
pub fn merge_configs(base: LaunchConfig, overlay: LaunchConfig) -> LaunchConfig {
    let mut launchers = base.launchers;
    launchers.extend(overlay.launchers);
    LaunchConfig {
        default_launcher: overlay.default_launcher.or(base.default_launcher),
        log_level: overlay.log_level.or(base.log_level),
        launchers,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
