// SPDX-License-Identifier: MIT OR Apache-2.0
//! File loading, env override, and launcher-option tests for `plaunch-config`.

use plaunch_config::{
    ConfigError, ConfigWarning, LaunchConfig, LauncherEntry, apply_env_overrides, load_config,
    merge_configs, parse_toml, validate_config,
};
use plaunch_core::{COMMANDS_KEY, LauncherConfig, WORKDIR_KEY};
use serial_test::serial;
use std::io::Write;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct EnvGuard {
    keys: Vec<&'static str>,
}

impl EnvGuard {
    fn new(pairs: &[(&'static str, &str)]) -> Self {
        let keys: Vec<&'static str> = pairs.iter().map(|(k, _)| *k).collect();
        for (k, v) in pairs {
            // SAFETY: these tests run serially (env vars are process-global).
            unsafe { std::env::set_var(k, v) };
        }
        Self { keys }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for k in &self.keys {
            // SAFETY: restoring env to previous state on drop.
            unsafe { std::env::remove_var(k) };
        }
    }
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f
}

const SAMPLE: &str = r#"
default_launcher = "local"
log_level = "warn"

[launchers.local]
plugin = "forkexec"

[launchers.wrapped]
plugin = "spawn"
workdir = "/tmp"
commands = ["nice", "-n", "5"]
"#;

// =========================================================================
// 1. Loading from disk
// =========================================================================

#[test]
#[serial]
fn load_from_file() {
    let f = write_config(SAMPLE);
    let cfg = load_config(Some(f.path())).unwrap();
    assert_eq!(cfg.default_launcher.as_deref(), Some("local"));
    assert_eq!(cfg.log_level.as_deref(), Some("warn"));
    assert_eq!(cfg.launchers.len(), 2);
    assert_eq!(cfg.launchers["wrapped"].commands, vec!["nice", "-n", "5"]);
}

#[test]
#[serial]
fn load_without_path_gives_default() {
    let cfg = load_config(None).unwrap();
    assert_eq!(cfg, LaunchConfig::default());
}

#[test]
#[serial]
fn load_missing_file_is_file_not_found() {
    let err = load_config(Some(std::path::Path::new("/no/such/plaunch.toml"))).unwrap_err();
    match err {
        ConfigError::FileNotFound { path } => assert!(path.contains("plaunch.toml")),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
#[serial]
fn load_garbage_is_parse_error() {
    let f = write_config("[launchers.x\nplugin=");
    assert!(matches!(
        load_config(Some(f.path())),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn entry_without_plugin_fails_to_parse() {
    let err = parse_toml("[launchers.x]\nworkdir = \"/tmp\"\n").unwrap_err();
    assert!(err.to_string().contains("plugin"));
}

// =========================================================================
// 2. Environment overrides
// =========================================================================

#[test]
#[serial]
fn env_override_default_launcher() {
    let _guard = EnvGuard::new(&[("PLAUNCH_DEFAULT_LAUNCHER", "wrapped")]);
    let mut cfg = parse_toml(SAMPLE).unwrap();
    apply_env_overrides(&mut cfg);
    assert_eq!(cfg.default_launcher.as_deref(), Some("wrapped"));
}

#[test]
#[serial]
fn env_override_log_level() {
    let _guard = EnvGuard::new(&[("PLAUNCH_LOG_LEVEL", "trace")]);
    let mut cfg = LaunchConfig::default();
    apply_env_overrides(&mut cfg);
    assert_eq!(cfg.log_level.as_deref(), Some("trace"));
}

#[test]
#[serial]
fn env_override_workdir_applies_to_every_entry() {
    let _guard = EnvGuard::new(&[("PLAUNCH_WORKDIR", "/var/tmp")]);
    let f = write_config(SAMPLE);
    let cfg = load_config(Some(f.path())).unwrap();
    for entry in cfg.launchers.values() {
        assert_eq!(entry.workdir.as_deref(), Some("/var/tmp"));
    }
}

#[test]
#[serial]
fn invalid_env_log_level_is_caught_by_validation() {
    let _guard = EnvGuard::new(&[("PLAUNCH_LOG_LEVEL", "loud")]);
    let cfg = load_config(None).unwrap();
    let err = validate_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("invalid log_level 'loud'"));
}

// =========================================================================
// 3. Validation of a realistic file
// =========================================================================

#[test]
fn sample_config_validates() {
    let cfg = parse_toml(SAMPLE).unwrap();
    let warnings = validate_config(&cfg).unwrap();
    assert!(
        !warnings
            .iter()
            .any(|w| matches!(w, ConfigWarning::MissingOptionalField { .. }))
    );
}

#[test]
fn multiple_errors_are_collected() {
    let toml = r#"
        default_launcher = "ghost"
        log_level = "chatty"

        [launchers.a]
        plugin = ""
    "#;
    match validate_config(&parse_toml(toml).unwrap()).unwrap_err() {
        ConfigError::ValidationError { reasons } => assert_eq!(reasons.len(), 3),
        other => panic!("expected ValidationError, got {other:?}"),
    }
}

#[test]
fn existing_workdir_raises_no_warning() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = LaunchConfig::default();
    let mut entry = LauncherEntry::new("forkexec");
    entry.workdir = Some(dir.path().display().to_string());
    cfg.launchers.insert("x".into(), entry);
    let warnings = validate_config(&cfg).unwrap();
    assert!(
        !warnings
            .iter()
            .any(|w| matches!(w, ConfigWarning::MissingWorkdir { .. }))
    );
}

// =========================================================================
// 4. Entries feed launcher options
// =========================================================================

#[test]
fn entry_options_configure_a_launcher() {
    let cfg = parse_toml(SAMPLE).unwrap();
    let mut launcher = LauncherConfig::default();
    launcher
        .apply_options(&cfg.launchers["wrapped"].to_options())
        .unwrap();
    assert_eq!(launcher.workdir, std::path::PathBuf::from("/tmp"));
    assert_eq!(launcher.commands, vec!["nice", "-n", "5"]);
}

#[test]
fn entry_without_workdir_keeps_launcher_default() {
    let cfg = parse_toml(SAMPLE).unwrap();
    let opts = cfg.launchers["local"].to_options();
    assert!(opts.get(WORKDIR_KEY).is_none());
    assert_eq!(opts.get_list(COMMANDS_KEY).unwrap(), Some(&[][..]));
}

// =========================================================================
// 5. Merge and serialization
// =========================================================================

#[test]
fn merged_file_overlay_wins() {
    let base = parse_toml(SAMPLE).unwrap();
    let overlay = parse_toml(
        r#"
        default_launcher = "wrapped"
        [launchers.wrapped]
        plugin = "forkexec"
        "#,
    )
    .unwrap();
    let merged = merge_configs(base, overlay);
    assert_eq!(merged.default_launcher.as_deref(), Some("wrapped"));
    assert_eq!(merged.launchers["wrapped"].plugin, "forkexec");
    assert!(merged.launchers["wrapped"].commands.is_empty());
    assert!(merged.launchers.contains_key("local"));
}

#[test]
fn toml_roundtrip_preserves_entries() {
    let cfg = parse_toml(SAMPLE).unwrap();
    let text = toml::to_string(&cfg).unwrap();
    assert_eq!(parse_toml(&text).unwrap(), cfg);
}

#[test]
fn config_serializes_to_json() {
    let cfg = parse_toml(SAMPLE).unwrap();
    let json = serde_json::to_value(&cfg).unwrap();
    assert_eq!(json["launchers"]["local"]["plugin"], "forkexec");
    assert!(json["launchers"]["local"].get("workdir").is_none());
}
