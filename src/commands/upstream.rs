// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Upstream command - traces the network and prints what lies above one edge

use crate::trace::trace_network;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Run the upstream command
pub fn run(
    config_path: Option<&Path>,
    input: Option<PathBuf>,
    edge_id: &str,
    json: bool,
) -> Result<()> {
    let (config, mut network) = super::load_network(config_path, input)?;
    if !network.contains(edge_id) {
        anyhow::bail!("Unknown edge: {}", edge_id);
    }

    info!("Tracing network for {}", edge_id);
    let report = trace_network(&mut network, config.trace_options())
        .context("Failed to trace network")?;
    let summary = report
        .summary(edge_id)
        .ok_or_else(|| anyhow::anyhow!("Edge missing from report: {}", edge_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Edge: {}", summary.id);
        println!("Upstream edges: {}", summary.count);
        println!(
            "Total upstream length: {}",
            crate::report::format_length(summary.total_length)
        );
        for id in &summary.upstream {
            println!("  {}", id);
        }
    }

    Ok(())
}
