//! TOML configuration for the CLI.
//!
//! ```toml
//! structure = "bvh"
//! threads = 8
//!
//! [build]
//! min_primitives_for_threading = 10000
//! min_workers_for_data_parallel = 2
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lumen_raytrace::{BuildSettings, StructureKind};
use serde::{Deserialize, Serialize};

/// Settings read from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Acceleration structure to build.
    pub structure: StructureKind,
    /// Worker threads; all CPUs when unset.
    pub threads: Option<usize>,
    /// Build tuning.
    pub build: BuildSettings,
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.build.validate()?;
        Ok(config)
    }
}
