// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Graph store for the pipe network
//!
//! Edges are keyed by id. Nodes are never materialized: adjacency is derived by
//! comparing one edge's `to_node` with another edge's `from_node`.

use crate::error::NetworkError;
use crate::types::PipeEdge;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// The pipe network, keyed by edge id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipeNetwork {
    edges: BTreeMap<String, PipeEdge>,
}

impl PipeNetwork {
    /// Create an empty network
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a network from edges; a repeated id replaces the earlier edge
    pub fn from_edges(edges: impl IntoIterator<Item = PipeEdge>) -> Self {
        let mut network = Self::new();
        for edge in edges {
            network.insert(edge);
        }
        network
    }

    /// Load a network from a CSV file
    pub fn load(path: &Path) -> Result<Self, NetworkError> {
        let file = File::open(path).map_err(|source| NetworkError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let network = Self::from_reader(file)?;
        debug!("Loaded {} edges from {}", network.len(), path.display());
        Ok(network)
    }

    /// Read a network table.
    ///
    /// The first record is a header. Each following record is
    /// `edge_id, from_node, to_node, length`; further columns are ignored.
    /// A length that does not parse as a finite number is taken as zero.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, NetworkError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        if csv.headers()?.is_empty() {
            return Err(NetworkError::Empty);
        }

        let mut network = Self::new();
        for record in csv.records() {
            let record = record?;
            let line = record.position().map_or(0, csv::Position::line);
            if record.len() < 4 {
                return Err(NetworkError::ShortRecord {
                    line,
                    found: record.len(),
                });
            }

            let id = &record[0];
            let length = parse_length(&record[3], id, line);
            let edge = PipeEdge::new(id, &record[1], &record[2], length);
            if network.insert(edge).is_some() {
                warn!("Duplicate edge id {} on line {}, keeping the later record", id, line);
            }
        }

        Ok(network)
    }

    /// Insert an edge, returning the edge it replaced
    pub fn insert(&mut self, edge: PipeEdge) -> Option<PipeEdge> {
        self.edges.insert(edge.id.clone(), edge)
    }

    /// Get an edge by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PipeEdge> {
        self.edges.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut PipeEdge> {
        self.edges.get_mut(id)
    }

    /// Check whether an edge id exists
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    /// All edges, ordered by id
    pub fn edges(&self) -> impl Iterator<Item = &PipeEdge> {
        self.edges.values()
    }

    /// All edge ids, ordered
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Number of edges
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if the network has no edges
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges one hop upstream of `id`: every edge whose `to_node` is the
    /// `from_node` of `id`.
    ///
    /// Scans the whole network on each call. Returns an empty list for inlets
    /// and for ids that are not in the network.
    #[must_use]
    pub fn parents_of(&self, id: &str) -> Vec<String> {
        let Some(edge) = self.get(id) else {
            return Vec::new();
        };
        self.edges
            .values()
            .filter(|candidate| candidate.is_parent_of(edge))
            .map(|candidate| candidate.id.clone())
            .collect()
    }

    /// Edges with no downstream edge: their `to_node` is no edge's `from_node`
    #[must_use]
    pub fn outlets(&self) -> Vec<String> {
        self.edges
            .values()
            .filter(|edge| !self.edges.values().any(|other| edge.is_parent_of(other)))
            .map(|edge| edge.id.clone())
            .collect()
    }

    /// Edges with no upstream edge
    #[must_use]
    pub fn inlets(&self) -> Vec<String> {
        let index = ParentIndex::build(self);
        self.edges
            .values()
            .filter(|edge| index.parents_of(self, &edge.id).is_empty())
            .map(|edge| edge.id.clone())
            .collect()
    }

    /// Zero every accumulated length
    pub fn reset_accumulators(&mut self) {
        for edge in self.edges.values_mut() {
            edge.accumulated_length = 0.0;
        }
    }
}

/// Reverse adjacency: node label to the edges that end there.
///
/// Gives the same answers as [`PipeNetwork::parents_of`], in the same order,
/// without scanning. It is a snapshot; rebuild it if edges are inserted.
#[derive(Debug, Clone, Default)]
pub struct ParentIndex {
    by_to_node: HashMap<String, Vec<String>>,
}

impl ParentIndex {
    /// Index every edge of `network` by its `to_node`
    #[must_use]
    pub fn build(network: &PipeNetwork) -> Self {
        let mut by_to_node: HashMap<String, Vec<String>> = HashMap::new();
        for edge in network.edges() {
            by_to_node
                .entry(edge.to_node.clone())
                .or_default()
                .push(edge.id.clone());
        }
        Self { by_to_node }
    }

    /// Edges one hop upstream of `id`
    #[must_use]
    pub fn parents_of(&self, network: &PipeNetwork, id: &str) -> Vec<String> {
        network
            .get(id)
            .and_then(|edge| self.by_to_node.get(&edge.from_node))
            .cloned()
            .unwrap_or_default()
    }
}

fn parse_length(raw: &str, id: &str, line: u64) -> f64 {
    match raw.parse::<f64>() {
        Ok(length) if length.is_finite() && length >= 0.0 => length,
        Ok(length) if length < 0.0 => {
            warn!(
                "Edge {} on line {} has negative length {}, using 0",
                id, line, length
            );
            0.0
        }
        _ => {
            warn!(
                "Edge {} on line {} has unusable length {:?}, using 0",
                id, line, raw
            );
            0.0
        }
    }
}
