// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Shell completion scripts

use anyhow::Result;
use clap_complete::Shell;

/// Print a completion script for `cmd` to stdout
pub fn run(shell: Shell, cmd: &mut clap::Command) -> Result<()> {
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, cmd, name, &mut std::io::stdout());
    Ok(())
}
