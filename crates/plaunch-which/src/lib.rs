//! Microcrate for portable executable discovery in `PATH`.
//!
//! Mirrors the lookup `execvp` performs, so configuration checks can warn
//! about a prefix command that would fail to launch.

use std::path::{Path, PathBuf};

/// Locate an executable by name, similarly to shell `which`.
///
/// If `bin` contains path separators, it is treated as a direct path.
pub fn which(bin: &str) -> Option<PathBuf> {
    if bin.is_empty() {
        return None;
    }
    let candidate = Path::new(bin);
    if has_path(candidate) {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| resolve_in_dir(&dir, bin))
}

/// Return `true` when an executable can be resolved from PATH or explicit path.
pub fn command_exists(command: &str) -> bool {
    which(command).is_some()
}

fn has_path(candidate: &Path) -> bool {
    candidate.components().count() > 1
}

fn resolve_in_dir(dir: &Path, command: &str) -> Option<PathBuf> {
    let direct = dir.join(command);
    if is_executable(&direct) {
        return Some(direct);
    }

    if !cfg!(windows) {
        return None;
    }

    [".exe", ".cmd", ".bat", ".com"]
        .into_iter()
        .map(|ext| dir.join(format!("{command}{ext}")))
        .find(|candidate| candidate.is_file())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
