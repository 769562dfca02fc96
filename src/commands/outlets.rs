// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Outlets command - lists edges that have no downstream edge

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Run the outlets command
pub fn run(config_path: Option<&Path>, input: Option<PathBuf>, json: bool) -> Result<()> {
    let (_, network) = super::load_network(config_path, input)?;
    let outlets = network.outlets();

    if json {
        println!("{}", serde_json::to_string_pretty(&outlets)?);
    } else {
        println!("{} outlets in {} edges:", outlets.len(), network.len());
        for id in &outlets {
            println!("  {}", id);
        }
    }

    Ok(())
}
