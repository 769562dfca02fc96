// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod outlets;
pub mod run;
pub mod upstream;

use crate::config::{self, Config};
use crate::graph::PipeNetwork;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolve the configuration and load the network it points at
pub(crate) fn load_network(
    config_path: Option<&Path>,
    input: Option<PathBuf>,
) -> Result<(Config, PipeNetwork)> {
    let mut config =
        config::load(config_path, input.is_some()).context("Failed to load configuration")?;
    if let Some(input) = input {
        config.override_network_csv(input);
    }
    if let Some(title) = &config.title {
        info!("Network: {}", title);
    }

    let path = config.network_csv()?;
    info!("Reading {}", path.display());
    let network = PipeNetwork::load(&path)
        .with_context(|| format!("Failed to load network from {}", path.display()))?;

    if network.is_empty() {
        eprintln!("Warning: {} contains no edges", path.display());
    }

    Ok((config, network))
}
