// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared command implementations for the `plaunch` CLI.

use crate::format::LaunchReport;
use anyhow::{Context, Result};
use chrono::Utc;
use plaunch_config::{ConfigError, LaunchConfig, load_config, validate_config};
use plaunch_core::{COMMANDS_KEY, LaunchOptions, LaunchPlugin, WORKDIR_KEY, launch_blocking};
use plaunch_registry::{LauncherRegistry, default_launcher_name};
use schemars::schema_for;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Return the JSON schema of the configuration file.
pub fn schema_json() -> Result<String> {
    let value = serde_json::to_value(schema_for!(LaunchConfig))?;
    serde_json::to_string_pretty(&value).context("serialize schema")
}

/// Registered launcher names, sorted.
pub fn launcher_names(registry: &LauncherRegistry) -> Vec<String> {
    registry.list().into_iter().map(str::to_string).collect()
}

/// Load and validate a configuration file.
///
/// Returns human-readable diagnostic lines, each prefixed with `error:`,
/// `warning:`, or `config: ok`.
pub fn config_check(path: Option<&Path>) -> Result<Vec<String>> {
    Ok(config_diagnostics(&load_config(path)))
}

/// Diagnostic lines for an already loaded configuration.
pub fn config_diagnostics(loaded: &Result<LaunchConfig, ConfigError>) -> Vec<String> {
    let config = match loaded {
        Ok(c) => c,
        Err(e) => return vec![format!("error: {e}")],
    };

    let mut diagnostics = Vec::new();
    match validate_config(config) {
        Ok(warnings) => {
            for w in &warnings {
                diagnostics.push(format!("warning: {w}"));
            }
            diagnostics.push("config: ok".into());
        }
        Err(ConfigError::ValidationError { reasons }) => {
            for r in &reasons {
                diagnostics.push(format!("error: {r}"));
            }
        }
        Err(e) => diagnostics.push(format!("error: {e}")),
    }
    diagnostics
}

/// Everything the `run` subcommand was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Config entry or registry key.
    pub launcher: Option<String>,
    /// Working directory override.
    pub workdir: Option<String>,
    /// Prefix command override; empty keeps the configured prefix.
    pub prefix: Vec<String>,
    /// Command to launch.
    pub command: Vec<String>,
}

/// A launcher resolved and configured, ready to run.
#[derive(Debug)]
pub struct PreparedLaunch {
    /// Config entry or registry key the launcher came from.
    pub name: String,
    /// The configured plugin.
    pub launcher: Box<dyn LaunchPlugin>,
}

/// Pick and configure a launcher.
///
/// `requested` is looked up among the config entries first, then among
/// registry keys. Without a request the config's `default_launcher` is used,
/// then the platform default.
pub fn resolve_launcher(
    config: &LaunchConfig,
    registry: &LauncherRegistry,
    requested: Option<&str>,
) -> Result<PreparedLaunch> {
    let name = requested
        .map(str::to_string)
        .or_else(|| config.default_launcher.clone())
        .unwrap_or_else(|| default_launcher_name().to_string());

    let launcher = match config.launchers.get(&name) {
        Some(entry) => {
            debug!(target: "plaunch.cli", %name, plugin = %entry.plugin, "using configured launcher");
            registry
                .build_with_options(&entry.plugin, &entry.to_options())
                .with_context(|| format!("build launcher '{name}'"))?
        }
        None => registry
            .build(&name)
            .with_context(|| format!("resolve launcher '{name}'"))?,
    };
    Ok(PreparedLaunch { name, launcher })
}

/// Resolve the launcher for `request` and apply its command-line overrides.
pub fn prepare(
    config: &LaunchConfig,
    registry: &LauncherRegistry,
    request: &RunRequest,
) -> Result<PreparedLaunch> {
    let mut prepared = resolve_launcher(config, registry, request.launcher.as_deref())?;

    let mut overrides = LaunchOptions::new();
    if let Some(workdir) = &request.workdir {
        overrides.set(WORKDIR_KEY, workdir.clone());
    }
    if !request.prefix.is_empty() {
        overrides.set(COMMANDS_KEY, request.prefix.clone());
    }
    if !overrides.is_empty() {
        prepared
            .launcher
            .set_options(&overrides)
            .context("apply command-line overrides")?;
    }
    Ok(prepared)
}

/// Prepare the launcher from `config` and run the command.
///
/// An empty effective command is not rejected here; the launcher reports it
/// like any other setup failure.
pub async fn run(
    registry: &LauncherRegistry,
    config: &LaunchConfig,
    request: RunRequest,
) -> Result<LaunchReport> {
    let prepared = prepare(config, registry, &request)?;

    let options = prepared.launcher.get_options();
    let workdir = options.get_str(WORKDIR_KEY)?.unwrap_or(".").to_string();
    let mut argv = options
        .get_list(COMMANDS_KEY)?
        .map(<[String]>::to_vec)
        .unwrap_or_default();
    argv.extend(request.command.iter().cloned());

    info!(target: "plaunch.cli", launcher = %prepared.name, ?argv, %workdir, "launching");
    let started_at = Utc::now();
    let clock = Instant::now();
    let result = launch_blocking(prepared.launcher, request.command).await?;
    let duration_ms = clock.elapsed().as_millis() as u64;
    let finished_at = Utc::now();

    Ok(LaunchReport::new(
        prepared.name,
        argv,
        workdir,
        started_at,
        finished_at,
        duration_ms,
        &result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaunch_config::LauncherEntry;
    use plaunch_registry::builtin;

    fn config_with(name: &str, entry: LauncherEntry) -> LaunchConfig {
        let mut cfg = LaunchConfig::default();
        cfg.launchers.insert(name.into(), entry);
        cfg
    }

    #[test]
    fn schema_is_valid_json() {
        let s = schema_json().unwrap();
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert!(v.get("properties").is_some());
    }

    #[test]
    fn launcher_names_include_mock() {
        assert!(launcher_names(builtin()).iter().any(|n| n == "mock"));
    }

    #[test]
    fn config_check_defaults_ok() {
        let diags = config_check(None).unwrap();
        assert!(diags.iter().any(|d| d == "config: ok"));
    }

    #[test]
    fn config_check_missing_file() {
        let diags = config_check(Some(Path::new("/nonexistent/plaunch.toml"))).unwrap();
        assert!(diags[0].starts_with("error:"));
    }

    #[test]
    fn resolve_without_request_uses_platform_default() {
        let p = resolve_launcher(&LaunchConfig::default(), builtin(), None).unwrap();
        assert_eq!(p.name, default_launcher_name());
        assert_eq!(p.launcher.name(), default_launcher_name());
    }

    #[test]
    fn resolve_prefers_config_entry_over_registry_key() {
        let mut entry = LauncherEntry::new("mock");
        entry.commands = vec!["wrap".into()];
        let cfg = config_with("spawn", entry);
        let p = resolve_launcher(&cfg, builtin(), Some("spawn")).unwrap();
        assert_eq!(p.launcher.name(), "mock");
        assert_eq!(
            p.launcher.get_options().get_list(COMMANDS_KEY).unwrap(),
            Some(&["wrap".to_string()][..])
        );
    }

    #[test]
    fn resolve_uses_config_default() {
        let mut cfg = config_with("quiet", LauncherEntry::new("mock"));
        cfg.default_launcher = Some("quiet".into());
        let p = resolve_launcher(&cfg, builtin(), None).unwrap();
        assert_eq!(p.name, "quiet");
        assert_eq!(p.launcher.name(), "mock");
    }

    #[test]
    fn resolve_unknown_name_fails() {
        let err = resolve_launcher(&LaunchConfig::default(), builtin(), Some("nope")).unwrap_err();
        assert!(format!("{err:#}").contains("unknown launcher 'nope'"));
    }

    #[test]
    fn cli_overrides_replace_config_values() {
        let mut entry = LauncherEntry::new("mock");
        entry.workdir = Some("/etc".into());
        entry.commands = vec!["nice".into()];
        let cfg = config_with("m", entry);
        let request = RunRequest {
            launcher: Some("m".into()),
            workdir: Some("/tmp".into()),
            prefix: vec!["env".into()],
            ..Default::default()
        };
        let p = prepare(&cfg, builtin(), &request).unwrap();
        let opts = p.launcher.get_options();
        assert_eq!(opts.get_str(WORKDIR_KEY).unwrap(), Some("/tmp"));
        assert_eq!(
            opts.get_list(COMMANDS_KEY).unwrap(),
            Some(&["env".to_string()][..])
        );
    }

    #[test]
    fn empty_prefix_keeps_configured_prefix() {
        let mut entry = LauncherEntry::new("mock");
        entry.commands = vec!["nice".into()];
        let cfg = config_with("m", entry);
        let request = RunRequest {
            launcher: Some("m".into()),
            ..Default::default()
        };
        let p = prepare(&cfg, builtin(), &request).unwrap();
        assert_eq!(
            p.launcher.get_options().get_list(COMMANDS_KEY).unwrap(),
            Some(&["nice".to_string()][..])
        );
    }

    #[tokio::test]
    async fn run_with_mock_reports_effective_argv() {
        let request = RunRequest {
            launcher: Some("mock".into()),
            prefix: vec!["time".into()],
            command: vec!["make".into(), "all".into()],
            ..Default::default()
        };
        let report = run(builtin(), &LaunchConfig::default(), request).await.unwrap();
        assert_eq!(report.launcher, "mock");
        assert_eq!(report.argv, vec!["time", "make", "all"]);
        assert_eq!(report.exit_code, 0);
        assert!(!report.launcher_failed);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn config_prefix_alone_is_a_complete_command() {
        let mut entry = LauncherEntry::new("mock");
        entry.commands = vec!["echo".into(), "hello".into()];
        let cfg = config_with("hello", entry);
        let request = RunRequest {
            launcher: Some("hello".into()),
            ..Default::default()
        };
        let report = run(builtin(), &cfg, request).await.unwrap();
        assert_eq!(report.argv, vec!["echo", "hello"]);
        assert_eq!(report.exit_code, 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn configured_prefix_runs_without_extra_arguments() {
        let mut entry = LauncherEntry::new("forkexec");
        entry.commands = vec!["echo".into(), "hello".into()];
        let cfg = config_with("hello", entry);
        let request = RunRequest {
            launcher: Some("hello".into()),
            ..Default::default()
        };
        let report = run(builtin(), &cfg, request).await.unwrap();
        assert_eq!(report.exit_code, 0);
        assert_eq!(report.stdout, "hello\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn empty_effective_command_fails_in_the_launcher() {
        let request = RunRequest {
            launcher: Some("forkexec".into()),
            ..Default::default()
        };
        let report = run(builtin(), &LaunchConfig::default(), request)
            .await
            .unwrap();
        assert_eq!(report.exit_code, 255);
        assert!(report.launcher_failed);
        assert!(report.stderr.contains("no process set"));
    }

    #[test]
    fn diagnostics_report_load_errors() {
        let loaded = plaunch_config::parse_toml("[launchers.x");
        let diags = config_diagnostics(&loaded);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].starts_with("error: failed to parse config"));
    }
}
