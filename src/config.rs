// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! A run is described by a TOML file:
//!
//! ```toml
//! title = "Example network"
//!
//! [files]
//! network_csv = "network.csv"
//!
//! [trace]
//! max_depth = 5000
//! accumulation = "distinct"
//! ```
//!
//! Relative paths in the file are resolved against the directory holding it.

use crate::error::ConfigError;
use crate::types::{Accumulation, TraceOptions, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked for when no config path is given
pub const DEFAULT_CONFIG_FILE: &str = "pipetrace.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Free-form name of the network, only logged
    #[serde(default)]
    pub title: Option<String>,
    /// Input and output locations
    #[serde(default)]
    pub files: FilesConfig,
    /// Traversal settings
    #[serde(default)]
    pub trace: TraceConfig,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// `[files]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Network table to read
    pub network_csv: Option<PathBuf>,
    /// Directory for the output tables; defaults to the config directory
    pub output_dir: Option<PathBuf>,
    /// Upstream edge list file name
    pub edges_csv: PathBuf,
    /// Total upstream length file name
    pub total_length_csv: PathBuf,
    /// Upstream edge count file name
    pub upstream_count_csv: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            network_csv: None,
            output_dir: None,
            edges_csv: PathBuf::from("edges.csv"),
            total_length_csv: PathBuf::from("total_length.csv"),
            upstream_count_csv: PathBuf::from("upstream_pipe_count.csv"),
        }
    }
}

/// `[trace]` table
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Depth ceiling for loop detection
    pub max_depth: usize,
    /// Length accumulation mode
    pub accumulation: Accumulation,
    /// Build a reverse parent index before tracing
    pub parent_index: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            accumulation: Accumulation::default(),
            parent_index: false,
        }
    }
}

/// Resolved locations of the three output tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    /// Upstream edge list
    pub edges: PathBuf,
    /// Total upstream length
    pub total_length: PathBuf,
    /// Upstream edge count
    pub upstream_count: PathBuf,
}

impl OutputFiles {
    /// Default file names inside `dir`
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        let files = FilesConfig::default();
        Self {
            edges: dir.join(files.edges_csv),
            total_length: dir.join(files.total_length_csv),
            upstream_count: dir.join(files.upstream_count_csv),
        }
    }
}

impl Config {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trace.max_depth == 0 {
            return Err(ConfigError::Invalid {
                key: "trace.max_depth".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Resolved path of the network table
    pub fn network_csv(&self) -> Result<PathBuf, ConfigError> {
        self.files
            .network_csv
            .as_deref()
            .map(|p| self.resolve(p))
            .ok_or_else(|| ConfigError::Invalid {
                key: "files.network_csv".into(),
                reason: "no network table configured".into(),
            })
    }

    /// Resolved paths of the output tables
    #[must_use]
    pub fn outputs(&self) -> OutputFiles {
        let dir = self
            .files
            .output_dir
            .as_deref()
            .map_or_else(|| self.base_dir.clone(), |d| self.resolve(d));
        OutputFiles {
            edges: dir.join(&self.files.edges_csv),
            total_length: dir.join(&self.files.total_length_csv),
            upstream_count: dir.join(&self.files.upstream_count_csv),
        }
    }

    /// Traversal options for the engine
    #[must_use]
    pub fn trace_options(&self) -> TraceOptions {
        TraceOptions {
            max_depth: self.trace.max_depth,
            accumulation: self.trace.accumulation,
            parent_index: self.trace.parent_index,
        }
    }

    /// Replace the network table with a path given on the command line
    pub fn override_network_csv(&mut self, path: PathBuf) {
        self.files.network_csv = Some(from_cwd(path));
    }

    /// Replace the output directory with a path given on the command line
    pub fn override_output_dir(&mut self, path: PathBuf) {
        self.files.output_dir = Some(from_cwd(path));
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Candidate config locations, in lookup order
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
    if let Some(dirs) = directories::ProjectDirs::from("com", "hyperpolymath", "pipetrace") {
        paths.push(dirs.config_dir().join(DEFAULT_CONFIG_FILE));
    }
    paths
}

/// Load configuration.
///
/// An explicit path must exist. Otherwise the [`search_paths`] are tried in
/// order. With no file at all, defaults are used when `input_given` is set
/// (the network table comes from the command line); if not, that is an error.
pub fn load(explicit: Option<&Path>, input_given: bool) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return Config::load(path);
    }

    let searched = search_paths();
    if let Some(path) = searched.iter().find(|p| p.is_file()) {
        return Config::load(path);
    }

    if input_given {
        Ok(Config::default())
    } else {
        Err(ConfigError::NotFound { searched })
    }
}

fn from_cwd(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&path))
        .unwrap_or(path)
}
