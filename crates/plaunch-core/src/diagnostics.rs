// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed texts and exit statuses a launcher emits when its own setup fails
//! inside the child.

/// Written to stdout immediately before an exec or no-command diagnostic.
pub const API_MARKER: &str = "external:api=5";

/// Exit status when the child cannot change to the configured directory.
pub const CHDIR_FAILURE_STATUS: i32 = 254;

/// Exit status when the program cannot be executed or none was given.
pub const EXEC_FAILURE_STATUS: i32 = 255;

/// Stderr text for an empty effective command.
pub const NO_PROCESS_MESSAGE: &str = "no process set";

/// Stderr prefix for a failed directory change.
pub const CHDIR_FAILURE_PREFIX: &str = "failed to change to the specified directory";

/// Stderr prefix for a failed exec.
pub const EXEC_FAILURE_PREFIX: &str = "failed to exec process";

/// Returns `true` if captured stdout starts with [`API_MARKER`].
pub fn has_marker(stdout: &[u8]) -> bool {
    stdout.starts_with(API_MARKER.as_bytes())
}

/// Stderr text for a failed directory change.
pub fn chdir_failure(workdir: &str, reason: &str) -> String {
    format!("{CHDIR_FAILURE_PREFIX} {workdir}: {reason}\n")
}

/// Stderr text for a failed exec of `program`.
pub fn exec_failure(program: &str, reason: &str) -> String {
    format!("{EXEC_FAILURE_PREFIX}: {reason} {program}\n")
}
