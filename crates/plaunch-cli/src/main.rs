// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use plaunch_cli::commands::{self, RunRequest};
use plaunch_config::{ConfigError, LaunchConfig, load_config};
use plaunch_registry::builtin;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "plaunch", version, about = "Process launch backplane CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available launchers.
    Launchers,

    /// Launch a command and capture its output.
    Run {
        /// Configuration file (TOML).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Config entry or launcher name.
        #[arg(long)]
        launcher: Option<String>,

        /// Working directory for the child.
        #[arg(long)]
        workdir: Option<String>,

        /// Prefix command element. Can be repeated; replaces the configured prefix.
        #[arg(long = "prefix", allow_hyphen_values = true)]
        prefix: Vec<String>,

        /// Print a JSON report instead of replaying the output.
        #[arg(long)]
        json: bool,

        /// Command and arguments.
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// Validate a configuration file.
    CheckConfig {
        /// Configuration file (TOML).
        #[arg(long)]
        config: PathBuf,
    },

    /// Print the configuration JSON schema.
    Schema,
}

impl Commands {
    /// Load the config file this subcommand reads, if any.
    fn load_config(&self) -> Option<Result<LaunchConfig, ConfigError>> {
        match self {
            Commands::Run { config, .. } => Some(load_config(config.as_deref())),
            Commands::CheckConfig { config } => Some(load_config(Some(config.as_path()))),
            _ => None,
        }
    }
}

/// Build the log filter. Returns the rejected level alongside the fallback
/// filter when the configured one does not parse.
fn log_filter(debug: bool, config: Option<&LaunchConfig>) -> (EnvFilter, Option<String>) {
    if debug {
        return (EnvFilter::new("plaunch=debug"), None);
    }
    let level = config
        .and_then(|c| c.log_level.clone())
        .unwrap_or_else(|| "info".into());
    match EnvFilter::try_new(format!("plaunch={level}")) {
        Ok(filter) => (filter, None),
        Err(_) => (EnvFilter::new("plaunch=info"), Some(level)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = cli.command.load_config();

    let (filter, rejected) = log_filter(cli.debug, loaded.as_ref().and_then(|r| r.as_ref().ok()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    if let Some(level) = rejected {
        warn!(target: "plaunch.cli", %level, "invalid log_level, using info");
    }

    match cli.command {
        Commands::Launchers => {
            for name in commands::launcher_names(builtin()) {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Run {
            launcher,
            workdir,
            prefix,
            json,
            command,
            ..
        } => {
            let config = loaded.unwrap_or_else(|| Ok(LaunchConfig::default()))?;
            let request = RunRequest {
                launcher,
                workdir,
                prefix,
                command,
            };
            cmd_run(&config, request, json).await
        }
        Commands::CheckConfig { .. } => {
            cmd_check_config(&loaded.unwrap_or_else(|| Ok(LaunchConfig::default())))
        }
        Commands::Schema => {
            println!("{}", commands::schema_json()?);
            Ok(())
        }
    }
}

async fn cmd_run(config: &LaunchConfig, request: RunRequest, json: bool) -> Result<()> {
    let report = commands::run(builtin(), config, request).await?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        report.replay(&mut std::io::stdout(), &mut std::io::stderr())?;
    }
    std::process::exit(report.exit_code);
}

fn cmd_check_config(loaded: &std::result::Result<LaunchConfig, ConfigError>) -> Result<()> {
    let diagnostics = commands::config_diagnostics(loaded);
    for line in &diagnostics {
        println!("{line}");
    }
    if diagnostics.iter().any(|d| d.starts_with("error:")) {
        bail!("configuration is invalid");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_wins_over_config() {
        let cfg = LaunchConfig {
            log_level: Some("error".into()),
            ..Default::default()
        };
        let (filter, rejected) = log_filter(true, Some(&cfg));
        assert_eq!(filter.to_string(), "plaunch=debug");
        assert!(rejected.is_none());
    }

    #[test]
    fn config_level_is_used() {
        let cfg = LaunchConfig {
            log_level: Some("warn".into()),
            ..Default::default()
        };
        let (filter, _) = log_filter(false, Some(&cfg));
        assert_eq!(filter.to_string(), "plaunch=warn");
    }

    #[test]
    fn bad_level_falls_back_and_is_reported() {
        let cfg = LaunchConfig {
            log_level: Some("loud noises".into()),
            ..Default::default()
        };
        let (filter, rejected) = log_filter(false, Some(&cfg));
        assert_eq!(filter.to_string(), "plaunch=info");
        assert_eq!(rejected.as_deref(), Some("loud noises"));
    }
}
