// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Upstream traversal engine
//!
//! [`TraceContext::trace`] walks the network upstream from one edge, depth
//! first. Every parent it discovers is credited to all edges on the active
//! path (the starting edge and the edges between it and the parent), so one
//! walk resolves the whole chain at once. Edges whose walk has finished are
//! marked visited; later walks that reach them fold in the stored upstream set
//! instead of walking it again.
//!
//! The walk keeps its own frame stack rather than recursing, so the depth
//! ceiling that detects loops can be large without exhausting the native stack.
//! Depth counts frames exactly as a recursive walk would count calls.

use crate::error::TraceError;
use crate::graph::{ParentIndex, PipeNetwork};
use crate::report::UpstreamReport;
use crate::types::{Accumulation, TraceOptions};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, trace};

/// One edge that is still waiting for its parents to be processed
#[derive(Debug)]
struct Frame {
    edge: String,
    parents: Vec<String>,
    next: usize,
    /// Length of the active path before this frame pushed onto it
    path_mark: usize,
}

/// Traversal state shared by every walk over one network
pub struct TraceContext<'a> {
    network: &'a mut PipeNetwork,
    options: TraceOptions,
    index: Option<ParentIndex>,
    visited: HashMap<String, bool>,
    upstream: HashMap<String, Vec<String>>,
    /// Membership of each upstream list, for constant-time duplicate checks
    members: HashMap<String, HashSet<String>>,
}

impl<'a> TraceContext<'a> {
    /// Prepare a traversal; every edge starts unvisited with an empty
    /// upstream set and a zero accumulator
    pub fn new(network: &'a mut PipeNetwork, options: TraceOptions) -> Self {
        network.reset_accumulators();
        let index = if options.parent_index {
            Some(ParentIndex::build(&*network))
        } else {
            None
        };
        let visited = network.ids().map(|id| (id.to_string(), false)).collect();
        let upstream = network.ids().map(|id| (id.to_string(), Vec::new())).collect();
        let members = network.ids().map(|id| (id.to_string(), HashSet::new())).collect();
        Self {
            network,
            options,
            index,
            visited,
            upstream,
            members,
        }
    }

    /// Whether the upstream computation for `id` is final
    #[must_use]
    pub fn is_visited(&self, id: &str) -> bool {
        self.visited.get(id).copied().unwrap_or(false)
    }

    /// Upstream edges recorded so far for `id`, in discovery order
    #[must_use]
    pub fn upstream_of(&self, id: &str) -> &[String] {
        self.upstream.get(id).map_or(&[], Vec::as_slice)
    }

    /// Fully resolve `start` and every unvisited edge upstream of it.
    ///
    /// `active_path` holds the edges that receive each discovered parent; a
    /// walk started by the driver passes `[start]`. The path is restored to
    /// its original contents when the walk returns. `depth` is the depth of
    /// the caller, zero for the driver.
    ///
    /// On return `start` is visited, its upstream set holds every transitive
    /// parent once, and its accumulated length is final.
    ///
    /// # Errors
    ///
    /// [`TraceError::CycleDetected`] if the walk goes deeper than the ceiling,
    /// and [`TraceError::UnknownEdge`] if `start` is not in the network.
    pub fn trace(
        &mut self,
        start: &str,
        active_path: &mut Vec<String>,
        depth: usize,
    ) -> Result<(), TraceError> {
        if !self.network.contains(start) {
            return Err(TraceError::UnknownEdge(start.to_string()));
        }

        let mut stack: Vec<Frame> = Vec::new();
        self.enter(start, active_path, &mut stack, depth)?;

        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.parents.len() {
                let parent = frame.parents[frame.next].clone();
                frame.next += 1;

                self.credit_parent(&parent, active_path);
                if !self.is_visited(&parent) {
                    let depth = depth + stack.len();
                    self.enter(&parent, active_path, &mut stack, depth)?;
                }
            } else if let Some(done) = stack.pop() {
                active_path.truncate(done.path_mark);
                trace!(
                    "Finished {} ({} upstream)",
                    done.edge,
                    self.upstream_of(&done.edge).len()
                );
                self.visited.insert(done.edge, true);
            }
        }

        Ok(())
    }

    /// Start processing `edge` one level below `depth`.
    ///
    /// Inlets are finished immediately. Anything else joins the active path
    /// (unless already on it) and gets a frame.
    fn enter(
        &mut self,
        edge: &str,
        active_path: &mut Vec<String>,
        stack: &mut Vec<Frame>,
        depth: usize,
    ) -> Result<(), TraceError> {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            return Err(TraceError::CycleDetected {
                edge: edge.to_string(),
                active_path: active_path.clone(),
                max_depth: self.options.max_depth,
            });
        }

        let parents = self.parents_of(edge);
        if parents.is_empty() {
            self.visited.insert(edge.to_string(), true);
            return Ok(());
        }

        let path_mark = active_path.len();
        if !active_path.iter().any(|e| e == edge) {
            active_path.push(edge.to_string());
        }
        stack.push(Frame {
            edge: edge.to_string(),
            parents,
            next: 0,
            path_mark,
        });
        Ok(())
    }

    /// Credit `parent`, and if it is already resolved its whole upstream set,
    /// to every edge on the active path
    fn credit_parent(&mut self, parent: &str, active_path: &[String]) {
        let parent_length = self.length_of(parent);
        let inherited: Vec<(String, f64)> = if self.is_visited(parent) {
            self.upstream_of(parent)
                .iter()
                .map(|id| (id.clone(), self.length_of(id)))
                .collect()
        } else {
            Vec::new()
        };

        for target in active_path {
            self.credit(target, parent, parent_length);
            for (ancestor, length) in &inherited {
                self.credit(target, ancestor, *length);
            }
        }
    }

    /// Add `source` to the upstream set of `target` and its length to the
    /// accumulator, as the accumulation mode dictates
    fn credit(&mut self, target: &str, source: &str, length: f64) {
        // Allocate only when the set grows.
        let inserted = match self.members.get_mut(target) {
            Some(set) if set.contains(source) => false,
            Some(set) => set.insert(source.to_string()),
            None => false,
        };
        if inserted {
            if let Some(list) = self.upstream.get_mut(target) {
                list.push(source.to_string());
            }
        }

        let add = match self.options.accumulation {
            Accumulation::Distinct => inserted,
            Accumulation::PerOccurrence => true,
        };
        if add {
            if let Some(edge) = self.network.get_mut(target) {
                edge.accumulated_length += length;
            }
        }
    }

    fn parents_of(&self, edge: &str) -> Vec<String> {
        match &self.index {
            Some(index) => index.parents_of(&*self.network, edge),
            None => self.network.parents_of(edge),
        }
    }

    fn length_of(&self, id: &str) -> f64 {
        self.network.get(id).map_or(0.0, |edge| edge.length)
    }

    /// Project the traversal state into the result tables
    #[must_use]
    pub fn into_report(self) -> UpstreamReport {
        let network = self.network;
        let mut upstream = self.upstream;
        let mut report = UpstreamReport::default();
        for edge in network.edges() {
            let edges = upstream.remove(&edge.id).unwrap_or_default();
            report.insert(edge.id.clone(), edges, edge.accumulated_length);
        }
        report
    }
}

/// Trace every edge of the network and return the result tables.
///
/// Each edge is handed to [`TraceContext::trace`] only if no earlier walk has
/// already resolved it, so the network is covered in a single pass.
///
/// # Errors
///
/// [`TraceError::CycleDetected`] if the network contains a loop.
pub fn trace_network(
    network: &mut PipeNetwork,
    options: TraceOptions,
) -> Result<UpstreamReport, TraceError> {
    let total = network.len();
    let ids: Vec<String> = network.ids().map(String::from).collect();
    let mut ctx = TraceContext::new(network, options);
    let started = Instant::now();

    info!(
        "Tracing {} edges (max depth {}, {:?} accumulation)",
        total, options.max_depth, options.accumulation
    );

    for (i, id) in ids.iter().enumerate() {
        let n = i + 1;
        log_progress(n, total, started);

        if !ctx.is_visited(id) {
            let mut active_path = vec![id.clone()];
            ctx.trace(id, &mut active_path, 0)?;
        }
    }

    info!(
        "Traced {} edges in {:.2}s",
        total,
        started.elapsed().as_secs_f64()
    );
    Ok(ctx.into_report())
}

#[allow(clippy::cast_precision_loss)]
fn log_progress(n: usize, total: usize, started: Instant) {
    let pct = n as f64 / total as f64 * 100.0;
    let elapsed = started.elapsed().as_secs_f64();
    if (n % 100 == 0 && total >= 100) || n == 1 || n == total {
        info!("{} of {} ({:.2}%) {:.2}s", n, total, pct, elapsed);
    } else if total < 100 {
        debug!("{} of {} ({:.2}%) {:.2}s", n, total, pct, elapsed);
    }
}
