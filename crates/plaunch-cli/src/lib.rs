// SPDX-License-Identifier: MIT OR Apache-2.0
//! Library half of the `plaunch` binary, split out so commands and report
//! formatting can be tested without spawning the executable.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod commands;
pub mod format;
