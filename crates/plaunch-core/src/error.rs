// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for option handling and the async adapter.

use thiserror::Error;

/// Errors from reading or applying [`LaunchOptions`](crate::LaunchOptions).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// An option was present with a value of the wrong type.
    #[error("option '{key}' expects a {expected}, got a {found}")]
    TypeMismatch {
        /// Option name.
        key: String,
        /// Type the launcher expects.
        expected: &'static str,
        /// Type that was supplied.
        found: &'static str,
    },
}

/// Errors surfaced around a launch, as opposed to the launch outcome itself.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Options could not be applied to the launcher.
    #[error(transparent)]
    Options(#[from] OptionError),

    /// The blocking launch task panicked or was cancelled.
    #[error("launch task failed: {0}")]
    Join(String),
}
