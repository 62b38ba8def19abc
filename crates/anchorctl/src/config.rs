//! TOML configuration for `anchorctl`.
//!
//! Every field is optional. Command-line flags override file values, and a
//! missing seed is drawn at random (and logged) so the run can be repeated.

use std::path::Path;

use anchor_ring::random_seed;
use serde::Deserialize;
use tracing::info;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring parameters.
    pub ring: RingSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ring]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Bucket capacity. Defaults to 10% above the resource count.
    pub capacity: Option<usize>,
    /// Hash seed shared by every ring built in this run.
    pub seed: Option<u32>,
    /// Initial resources for `route`.
    pub resources: Vec<String>,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Effective seed: the CLI flag, then the config file, then a fresh one.
    pub fn seed(&self, flag: Option<u32>) -> u32 {
        if let Some(seed) = flag.or(self.ring.seed) {
            return seed;
        }
        let seed = random_seed();
        info!(seed, "no seed configured, generated one");
        seed
    }
}
