// SPDX-License-Identifier: MIT OR Apache-2.0
//! Running a blocking launch from async code.

use crate::{LaunchError, LaunchPlugin, LaunchResult};
use tracing::debug;

/// Run `launcher.launch(full_command)` on tokio's blocking pool.
///
/// The launcher is moved into the task; clone it first if the caller needs
/// to keep it.
pub async fn launch_blocking(
    launcher: Box<dyn LaunchPlugin>,
    full_command: Vec<String>,
) -> Result<LaunchResult, LaunchError> {
    debug!(target: "plaunch.blocking", launcher = launcher.name(), "dispatching launch");
    tokio::task::spawn_blocking(move || launcher.launch(&full_command))
        .await
        .map_err(|e| LaunchError::Join(e.to_string()))
}
