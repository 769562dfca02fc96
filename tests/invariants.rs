// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Invariant tests for the upstream traversal
//!
//! These tests verify, for whole networks:
//! 1. Upstream sets are exactly the edges that can reach an edge
//! 2. Sets hold no duplicates and never the edge itself
//! 3. Totals equal the summed length of the set
//! 4. Runs are repeatable and independent of how parents are looked up

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use pipetrace::prelude::*;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

// =============================================================================
// Test Helpers
// =============================================================================

fn make_network(edges: &[(&str, &str, &str, f64)]) -> PipeNetwork {
    PipeNetwork::from_edges(
        edges
            .iter()
            .map(|&(id, from, to, length)| PipeEdge::new(id, from, to, length)),
    )
}

fn trace(network: &PipeNetwork, options: TraceOptions) -> UpstreamReport {
    let mut network = network.clone();
    trace_network(&mut network, options).expect("network is acyclic")
}

fn as_set(ids: &[String]) -> HashSet<String> {
    ids.iter().cloned().collect()
}

fn ids(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| (*s).to_string()).collect()
}

/// Upstream sets computed independently: P is upstream of E when the node P
/// drains into can reach the node E starts from.
fn reachability_oracle(network: &PipeNetwork) -> HashMap<String, HashSet<String>> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
    let mut node = |graph: &mut DiGraph<String, ()>, label: &str| -> NodeIndex {
        *nodes
            .entry(label.to_string())
            .or_insert_with(|| graph.add_node(label.to_string()))
    };

    let mut ends = HashMap::new();
    for edge in network.edges() {
        let from = node(&mut graph, &edge.from_node);
        let to = node(&mut graph, &edge.to_node);
        graph.add_edge(from, to, ());
        ends.insert(edge.id.clone(), (from, to));
    }

    network
        .edges()
        .map(|edge| {
            let (start, _) = ends[&edge.id];
            let upstream = network
                .edges()
                .filter(|candidate| {
                    let (_, drains_to) = ends[&candidate.id];
                    has_path_connecting(&graph, drains_to, start, None)
                })
                .map(|candidate| candidate.id.clone())
                .collect();
            (edge.id.clone(), upstream)
        })
        .collect()
}

/// Random acyclic network: every edge runs from a lower node number to a
/// higher one, lengths are whole numbers so sums are exact.
fn arb_dag() -> impl Strategy<Value = PipeNetwork> {
    prop::collection::vec((0usize..12, 1usize..5, 1u32..100), 1..40).prop_map(|specs| {
        PipeNetwork::from_edges(specs.into_iter().enumerate().map(|(i, (from, hop, length))| {
            PipeEdge::new(
                format!("P{i:03}"),
                format!("n{from}"),
                format!("n{}", from + hop),
                f64::from(length),
            )
        }))
    })
}

// =============================================================================
// Fixed Scenarios
// =============================================================================

#[test]
fn test_chain_of_four() {
    let network = make_network(&[
        ("A", "n0", "n1", 3.0),
        ("B", "n1", "n2", 5.0),
        ("C", "n2", "n3", 7.0),
        ("D", "n3", "n4", 11.0),
    ]);
    let report = trace(&network, TraceOptions::default());

    assert_eq!(as_set(report.upstream_edges("D").unwrap()), ids(&["A", "B", "C"]));
    assert_eq!(report.upstream_count("D"), Some(3));
    assert_eq!(report.total_length("D"), Some(15.0));
}

#[test]
fn test_diamond_counts_each_ancestor_once() {
    let network = make_network(&[
        ("A", "n0", "n1", 2.0),
        ("X", "n1", "n2", 3.0),
        ("Y", "n1", "n2", 4.0),
        ("Z", "n2", "n3", 5.0),
    ]);
    let report = trace(&network, TraceOptions::default());

    assert_eq!(as_set(report.upstream_edges("Z").unwrap()), ids(&["A", "X", "Y"]));
    assert_eq!(report.upstream_count("Z"), Some(3));
    assert_eq!(report.total_length("Z"), Some(9.0));
}

#[test]
fn test_diamond_per_occurrence_repeats_shared_ancestor() {
    let network = make_network(&[
        ("A", "n0", "n1", 2.0),
        ("X", "n1", "n2", 3.0),
        ("Y", "n1", "n2", 4.0),
        ("Z", "n2", "n3", 5.0),
    ]);
    let options = TraceOptions {
        accumulation: Accumulation::PerOccurrence,
        ..TraceOptions::default()
    };
    let report = trace(&network, options);

    assert_eq!(report.upstream_count("Z"), Some(3));
    assert_eq!(report.total_length("Z"), Some(11.0));
}

#[test]
fn test_isolated_edge_in_every_table() {
    let network = make_network(&[("A", "n0", "n1", 1.0), ("solo", "x", "y", 9.0)]);
    let report = trace(&network, TraceOptions::default());

    assert_eq!(report.edge_list_table()["solo"], Vec::<String>::new());
    assert_eq!(report.count_table()["solo"], "0");
    assert_eq!(report.total_length_table()["solo"], "0");
}

#[test]
fn test_ring_of_fifty_is_a_cycle() {
    let edges: Vec<PipeEdge> = (0..50)
        .map(|i| PipeEdge::new(format!("R{i:02}"), format!("n{i}"), format!("n{}", (i + 1) % 50), 1.0))
        .collect();
    let mut network = PipeNetwork::from_edges(edges);

    match trace_network(&mut network, TraceOptions::default()) {
        Err(TraceError::CycleDetected { active_path, max_depth, .. }) => {
            assert_eq!(max_depth, DEFAULT_MAX_DEPTH);
            assert_eq!(active_path.len(), 50);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn test_ceiling_just_above_default_still_trips() {
    let network = make_network(&[("A", "n0", "n1", 1.0), ("B", "n1", "n0", 1.0)]);
    for max_depth in [DEFAULT_MAX_DEPTH, DEFAULT_MAX_DEPTH + 1] {
        let mut network = network.clone();
        let options = TraceOptions { max_depth, ..TraceOptions::default() };
        let err = trace_network(&mut network, options).unwrap_err();
        assert!(matches!(err, TraceError::CycleDetected { .. }), "max_depth {max_depth}");
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_upstream_sets_match_reachability(network in arb_dag()) {
        let oracle = reachability_oracle(&network);
        for accumulation in [Accumulation::Distinct, Accumulation::PerOccurrence] {
            let options = TraceOptions { accumulation, ..TraceOptions::default() };
            let report = trace(&network, options);
            for id in network.ids() {
                prop_assert_eq!(&as_set(report.upstream_edges(id).unwrap()), &oracle[id], "edge {}", id);
            }
        }
    }

    #[test]
    fn prop_sets_have_no_duplicates_or_self(network in arb_dag()) {
        let report = trace(&network, TraceOptions::default());
        for id in network.ids() {
            let upstream = report.upstream_edges(id).unwrap();
            prop_assert_eq!(as_set(upstream).len(), upstream.len());
            prop_assert!(!upstream.iter().any(|e| e == id));
        }
    }

    #[test]
    fn prop_total_is_sum_of_set(network in arb_dag()) {
        let report = trace(&network, TraceOptions::default());
        for id in network.ids() {
            let expected: f64 = report
                .upstream_edges(id)
                .unwrap()
                .iter()
                .map(|e| network.get(e).unwrap().length)
                .sum();
            prop_assert_eq!(report.total_length(id), Some(expected), "edge {}", id);
        }
    }

    #[test]
    fn prop_per_occurrence_never_undercounts(network in arb_dag()) {
        let distinct = trace(&network, TraceOptions::default());
        let literal = trace(&network, TraceOptions {
            accumulation: Accumulation::PerOccurrence,
            ..TraceOptions::default()
        });
        for id in network.ids() {
            prop_assert!(literal.total_length(id).unwrap() >= distinct.total_length(id).unwrap());
        }
    }

    #[test]
    fn prop_inlets_are_empty(network in arb_dag()) {
        let report = trace(&network, TraceOptions::default());
        for id in network.inlets() {
            prop_assert_eq!(report.upstream_count(&id), Some(0));
            prop_assert_eq!(report.total_length(&id), Some(0.0));
        }
    }

    #[test]
    fn prop_repeatable_and_lookup_independent(network in arb_dag()) {
        let first = trace(&network, TraceOptions::default());
        let second = trace(&network, TraceOptions::default());
        let indexed = trace(&network, TraceOptions { parent_index: true, ..TraceOptions::default() });
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &indexed);
    }
}
