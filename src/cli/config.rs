//! TOML configuration file support.
//!
//! Parser tuning can be kept in a config file instead of CLI flags:
//!
//! ```toml
//! # ciftext.toml
//! [parser]
//! chunk_size = 250000
//! progress_interval_ms = 100
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use ciftext::ParserConfig;

/// Root configuration structure for ciftext.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Parser settings.
    #[serde(default)]
    pub parser: ParserSection,
}

/// The `[parser]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserSection {
    /// Loop values read between progress/cancellation checks.
    pub chunk_size: Option<usize>,

    /// Minimum time between progress reports, in milliseconds.
    pub progress_interval_ms: Option<u64>,
}

impl ParserSection {
    /// Override the values of `base` that this section sets.
    pub fn apply(&self, mut base: ParserConfig) -> ParserConfig {
        if let Some(chunk_size) = self.chunk_size {
            base = base.with_chunk_size(chunk_size);
        }
        if let Some(ms) = self.progress_interval_ms {
            base = base.with_progress_interval(Duration::from_millis(ms));
        }
        base
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
