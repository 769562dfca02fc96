// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Run command - traces every edge and writes the three result tables

use crate::trace::trace_network;
use crate::types::Accumulation;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line overrides for a run
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Network table instead of the configured one
    pub input: Option<PathBuf>,
    /// Output directory instead of the configured one
    pub output_dir: Option<PathBuf>,
    /// Depth ceiling instead of the configured one
    pub max_depth: Option<usize>,
    /// Accumulation mode instead of the configured one
    pub accumulation: Option<Accumulation>,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    edges: usize,
    inlets: usize,
    max_upstream: usize,
    outputs: &'a [PathBuf],
}

/// Run the full pipeline
pub fn run(config_path: Option<&Path>, args: RunArgs, json: bool) -> Result<()> {
    let (mut config, mut network) = super::load_network(config_path, args.input)?;

    if let Some(dir) = args.output_dir {
        config.override_output_dir(dir);
    }
    if let Some(depth) = args.max_depth {
        config.trace.max_depth = depth;
    }
    if let Some(accumulation) = args.accumulation {
        config.trace.accumulation = accumulation;
    }
    config.validate()?;

    let report = trace_network(&mut network, config.trace_options())
        .context("Failed to trace network")?;

    let outputs = config.outputs();
    let written = report.save(&outputs)?;
    for path in &written {
        info!("Wrote {}", path.display());
    }

    let summary = RunSummary {
        edges: report.len(),
        inlets: report
            .ids()
            .filter(|id| report.upstream_count(id) == Some(0))
            .count(),
        max_upstream: report
            .ids()
            .filter_map(|id| report.upstream_count(id))
            .max()
            .unwrap_or(0),
        outputs: &written,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Traced {} edges ({} inlets)", summary.edges, summary.inlets);
        println!("Largest upstream set: {} edges", summary.max_upstream);
        for path in &written {
            println!("  {}", path.display());
        }
    }

    Ok(())
}
