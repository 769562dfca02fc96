// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Pipetrace library - upstream tracing for pipe networks
//!
//! This crate loads a directed pipe network from a CSV table, walks every
//! edge upstream once, and reports for each edge the set of edges that lie
//! upstream of it, how many there are, and their summed length.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod error;
pub mod graph;
pub mod report;
pub mod trace;

/// Core data types shared by the graph store, traversal engine and reports
pub mod types {
    use serde::{Deserialize, Serialize};

    /// Depth at which a traversal is considered to be looping
    pub const DEFAULT_MAX_DEPTH: usize = 5000;

    // =========================================================================
    // Pipe Edge
    // =========================================================================

    /// A directed pipe segment
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PipeEdge {
        /// Unique edge name
        pub id: String,
        /// Upstream node label
        pub from_node: String,
        /// Downstream node label
        pub to_node: String,
        /// Physical length
        pub length: f64,
        /// Summed length of every edge upstream of this one.
        /// Only the traversal engine writes to this field.
        #[serde(skip)]
        pub accumulated_length: f64,
    }

    impl PipeEdge {
        /// Create an edge with an empty accumulator
        #[must_use]
        pub fn new(
            id: impl Into<String>,
            from_node: impl Into<String>,
            to_node: impl Into<String>,
            length: f64,
        ) -> Self {
            Self {
                id: id.into(),
                from_node: from_node.into(),
                to_node: to_node.into(),
                length,
                accumulated_length: 0.0,
            }
        }

        /// True if `self` feeds directly into `other` (one hop upstream)
        #[must_use]
        pub fn is_parent_of(&self, other: &PipeEdge) -> bool {
            self.to_node == other.from_node
        }
    }

    // =========================================================================
    // Trace Options
    // =========================================================================

    /// How parent lengths are folded into the edges on the active path
    #[derive(
        Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
    )]
    #[serde(rename_all = "kebab-case")]
    pub enum Accumulation {
        /// Add a length only when the edge is newly added to the target's
        /// upstream set, so the total always matches the set
        #[default]
        Distinct,
        /// Add a length every time the edge is reached, even if the target
        /// already lists it (shared ancestors of a diamond count once per branch)
        PerOccurrence,
    }

    /// Knobs for a full network traversal
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TraceOptions {
        /// Depth ceiling; exceeding it means the network has a loop
        pub max_depth: usize,
        /// Length accumulation mode
        pub accumulation: Accumulation,
        /// Look parents up through a prebuilt `to_node` index instead of a scan
        pub parent_index: bool,
    }

    impl Default for TraceOptions {
        fn default() -> Self {
            Self {
                max_depth: DEFAULT_MAX_DEPTH,
                accumulation: Accumulation::Distinct,
                parent_index: false,
            }
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{ConfigError, NetworkError, TraceError};
    pub use crate::graph::PipeNetwork;
    pub use crate::report::UpstreamReport;
    pub use crate::trace::{trace_network, TraceContext};
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
