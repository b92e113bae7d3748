//! Configuration file support
//!
//! An optional TOML file can provide the sampler values:
//!
//! ```toml
//! [sampler]
//! plugin = "test_sampler"
//! producer = "${HOSTNAME}_${PORT}"
//! interval = "1000000"
//! offset = "0"
//! ```
//!
//! Command line flags win over the file, and the file wins over built-in
//! defaults.

use anyhow::{Context, Result};
use ls2sampler_core::SamplerSettings;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub sampler: SamplerSettings,
}

/// Sampler values taken from command line flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub plugin: Option<String>,
    pub producer: Option<String>,
    pub interval: Option<String>,
    pub offset: Option<String>,
}

impl FileConfig {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Apply command line overrides on top of the file values
    pub fn resolve(self, overrides: SettingsOverrides) -> SamplerSettings {
        let mut settings = self.sampler;
        if let Some(plugin) = overrides.plugin {
            settings.plugin = plugin;
        }
        if let Some(producer) = overrides.producer {
            settings.producer = producer;
        }
        if let Some(interval) = overrides.interval {
            settings.interval = interval;
        }
        if let Some(offset) = overrides.offset {
            settings.offset = offset;
        }
        settings
    }
}
