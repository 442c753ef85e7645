//! memoview configuration file handling
//!
//! `memoview.toml` is optional. Every section and field falls back to a
//! default, so an empty file is a valid configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use memoview_tree::SchedulerConfig;

pub const CONFIG_FILE: &str = "memoview.toml";

/// Contents of `memoview.toml`
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MemoviewConfig {
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub demo: DemoSection,
}

/// `[scheduler]` section
#[derive(Debug, Deserialize, Serialize)]
pub struct SchedulerSection {
    /// Upper bound on passes run by a single flush
    #[serde(default = "default_max_passes")]
    pub max_passes_per_flush: usize,
}

fn default_max_passes() -> usize {
    16
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            max_passes_per_flush: default_max_passes(),
        }
    }
}

/// `[demo]` section
#[derive(Debug, Deserialize, Serialize)]
pub struct DemoSection {
    /// Number of scripted interactions after the initial pass
    #[serde(default = "default_steps")]
    pub steps: usize,
    /// Reproduce the pitfall instead of the fix
    #[serde(default)]
    pub naive: bool,
}

fn default_steps() -> usize {
    3
}

impl Default for DemoSection {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            naive: false,
        }
    }
}

impl MemoviewConfig {
    /// Load an explicit config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: MemoviewConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Load `memoview.toml` from a directory, or defaults if it has none
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(CONFIG_FILE);
        if config_path.exists() {
            return Self::load(&config_path);
        }

        tracing::debug!("No {} in {}, using defaults", CONFIG_FILE, path.display());
        Ok(Self::default())
    }

    /// Scheduler settings for a demo run
    pub fn scheduler(&self, label: &str) -> SchedulerConfig {
        SchedulerConfig::new()
            .label(label)
            .max_passes_per_flush(self.scheduler.max_passes_per_flush)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
