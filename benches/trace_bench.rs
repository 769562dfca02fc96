// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Traversal benchmarks: long chains and braided lattices, scan vs index
#![allow(clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pipetrace::graph::PipeNetwork;
use pipetrace::trace::trace_network;
use pipetrace::types::{PipeEdge, TraceOptions};

fn chain(len: usize) -> PipeNetwork {
    PipeNetwork::from_edges((0..len).map(|i| {
        PipeEdge::new(format!("C{i}"), format!("n{i}"), format!("n{}", i + 1), 1.0)
    }))
}

/// `rows` layers of `width` nodes; every node drains into the node below it
/// and the one below and to the right, so most edges share ancestors
fn lattice(rows: usize, width: usize) -> PipeNetwork {
    let mut edges = Vec::new();
    for r in 0..rows {
        for c in 0..width {
            let from = format!("r{r}c{c}");
            edges.push(PipeEdge::new(format!("D{r}_{c}"), &from, format!("r{}c{c}", r + 1), 2.0));
            edges.push(PipeEdge::new(
                format!("S{r}_{c}"),
                &from,
                format!("r{}c{}", r + 1, (c + 1) % width),
                3.0,
            ));
        }
    }
    PipeNetwork::from_edges(edges)
}

fn bench_trace(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace_network");

    for (name, network) in [
        ("chain_500", chain(500)),
        ("lattice_20x10", lattice(20, 10)),
    ] {
        for parent_index in [false, true] {
            let options = TraceOptions {
                parent_index,
                ..TraceOptions::default()
            };
            let id = BenchmarkId::new(name, if parent_index { "index" } else { "scan" });
            group.bench_function(id, |b| {
                b.iter(|| {
                    let mut network = network.clone();
                    trace_network(&mut network, options).expect("acyclic");
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_trace);
criterion_main!(benches);
