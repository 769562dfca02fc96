// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Result tables derived from a finished traversal
//!
//! Nothing is recomputed here; the tables are projections of the upstream sets
//! and accumulated lengths the traversal left behind.

use crate::config::OutputFiles;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header of the first column of the length and count tables
pub const PIPE_ID_HEADER: &str = "Pipe ID";
/// Header of the total upstream length column
pub const TOTAL_LENGTH_HEADER: &str = "Total Upstream Length";
/// Header of the upstream count column
pub const UPSTREAM_COUNT_HEADER: &str = "Count of Upstream Pipes";

/// Upstream edges and upstream length for every edge, ordered by edge id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamReport {
    upstream_edges: BTreeMap<String, Vec<String>>,
    total_length: BTreeMap<String, f64>,
}

/// Everything known about one edge, for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeSummary {
    /// Edge id
    pub id: String,
    /// Upstream edge ids in discovery order
    pub upstream: Vec<String>,
    /// Number of upstream edges
    pub count: usize,
    /// Summed length of the upstream edges
    pub total_length: f64,
}

impl UpstreamReport {
    /// Record the final state of one edge
    pub fn insert(&mut self, id: String, upstream: Vec<String>, total_length: f64) {
        self.total_length.insert(id.clone(), total_length);
        self.upstream_edges.insert(id, upstream);
    }

    /// Number of edges in the report
    #[must_use]
    pub fn len(&self) -> usize {
        self.upstream_edges.len()
    }

    /// Check if the report is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upstream_edges.is_empty()
    }

    /// Edge ids, ordered
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.upstream_edges.keys().map(String::as_str)
    }

    /// Upstream edges of `id`
    #[must_use]
    pub fn upstream_edges(&self, id: &str) -> Option<&[String]> {
        self.upstream_edges.get(id).map(Vec::as_slice)
    }

    /// Number of upstream edges of `id`
    #[must_use]
    pub fn upstream_count(&self, id: &str) -> Option<usize> {
        self.upstream_edges.get(id).map(Vec::len)
    }

    /// Summed upstream length of `id`
    #[must_use]
    pub fn total_length(&self, id: &str) -> Option<f64> {
        self.total_length.get(id).copied()
    }

    /// Summary of one edge
    #[must_use]
    pub fn summary(&self, id: &str) -> Option<EdgeSummary> {
        let upstream = self.upstream_edges.get(id)?.clone();
        Some(EdgeSummary {
            id: id.to_string(),
            count: upstream.len(),
            upstream,
            total_length: self.total_length(id).unwrap_or_default(),
        })
    }

    /// Upstream-edge-list table
    #[must_use]
    pub fn edge_list_table(&self) -> &BTreeMap<String, Vec<String>> {
        &self.upstream_edges
    }

    /// Total-upstream-length table, lengths rendered as decimals
    #[must_use]
    pub fn total_length_table(&self) -> BTreeMap<String, String> {
        self.total_length
            .iter()
            .map(|(id, length)| (id.clone(), format_length(*length)))
            .collect()
    }

    /// Upstream-edge-count table
    #[must_use]
    pub fn count_table(&self) -> BTreeMap<String, String> {
        self.upstream_edges
            .iter()
            .map(|(id, edges)| (id.clone(), edges.len().to_string()))
            .collect()
    }

    /// Write the edge list: one headerless row per edge, the edge id followed
    /// by its upstream edge ids
    pub fn write_edge_list<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        for (id, edges) in &self.upstream_edges {
            csv.write_record(std::iter::once(id).chain(edges))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write the total-upstream-length table
    pub fn write_total_length<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        write_two_column(writer, TOTAL_LENGTH_HEADER, &self.total_length_table())
    }

    /// Write the upstream-edge-count table
    pub fn write_upstream_count<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        write_two_column(writer, UPSTREAM_COUNT_HEADER, &self.count_table())
    }

    /// Write all three tables, returning the paths written
    pub fn save(&self, outputs: &OutputFiles) -> Result<Vec<PathBuf>> {
        let edges = create(&outputs.edges)?;
        self.write_edge_list(edges)
            .with_context(|| format!("Failed to write {}", outputs.edges.display()))?;

        let lengths = create(&outputs.total_length)?;
        self.write_total_length(lengths)
            .with_context(|| format!("Failed to write {}", outputs.total_length.display()))?;

        let counts = create(&outputs.upstream_count)?;
        self.write_upstream_count(counts)
            .with_context(|| format!("Failed to write {}", outputs.upstream_count.display()))?;

        Ok(vec![
            outputs.edges.clone(),
            outputs.total_length.clone(),
            outputs.upstream_count.clone(),
        ])
    }
}

/// Render a length the way the tables store it
#[must_use]
pub fn format_length(length: f64) -> String {
    format!("{length}")
}

fn create(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    File::create(path).with_context(|| format!("Failed to create {}", path.display()))
}

fn write_two_column<W: Write>(
    writer: W,
    value_header: &str,
    rows: &BTreeMap<String, String>,
) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([PIPE_ID_HEADER, value_header])?;
    for (id, value) in rows {
        csv.write_record([id, value])?;
    }
    csv.flush()?;
    Ok(())
}
