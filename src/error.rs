// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types and process exit codes
//!
//! Every failure is fatal for the whole run. Loops in the network exit with
//! [`CYCLE_EXIT_CODE`]; configuration and input failures exit with
//! [`FAILURE_EXIT_CODE`].

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for configuration, input and output failures
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Exit status when the traversal runs into a loop
pub const CYCLE_EXIT_CODE: i32 = 99;

/// Failures raised while walking the network upstream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// The depth ceiling was exceeded, so the network contains a directed loop
    #[error(
        "the network appears to have a loop: depth exceeded {max_depth} at edge {edge} \
         (active path: {})",
        active_path.join(", ")
    )]
    CycleDetected {
        /// The last edge processed
        edge: String,
        /// Edges awaiting completion when the ceiling was hit
        active_path: Vec<String>,
        /// The ceiling that was exceeded
        max_depth: usize,
    },

    /// An edge id that is not in the network was requested
    #[error("unknown edge: {0}")]
    UnknownEdge(String),
}

/// Failures raised while reading the network table
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The table could not be opened
    #[error("failed to open network table {}", path.display())]
    Open {
        /// Path of the table
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the input
    #[error("malformed network table")]
    Csv(#[from] csv::Error),

    /// A record does not carry edge id, from-node, to-node and length
    #[error("record on line {line} has {found} fields, expected at least 4")]
    ShortRecord {
        /// 1-based line number of the record
        line: u64,
        /// Number of fields present
        found: usize,
    },

    /// The table has no header record
    #[error("network table is empty")]
    Empty,
}

/// Failures raised while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {}", path.display())]
    Read {
        /// Path of the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the config schema
    #[error("failed to parse config file {}", path.display())]
    Parse {
        /// Path of the config file
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: toml::de::Error,
    },

    /// No config file was given or found, and no input override was supplied
    #[error("no config file found (looked in: {})", searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    NotFound {
        /// Candidate locations that were checked
        searched: Vec<PathBuf>,
    },

    /// A value is out of range or unknown
    #[error("invalid config value for {key}: {reason}")]
    Invalid {
        /// Dotted key of the offending value
        key: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Exit status for an error that reached `main`
///
/// Looks through the `anyhow` chain for a typed error so that context added by
/// the command layer does not hide a cycle.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    let looped = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<TraceError>(),
            Some(TraceError::CycleDetected { .. })
        )
    });
    if looped {
        CYCLE_EXIT_CODE
    } else {
        FAILURE_EXIT_CODE
    }
}
