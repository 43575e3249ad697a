//! Config store for loading siteshift.toml.

use std::path::{Path, PathBuf};

use super::{SiteshiftConfig, parser};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
    explicit: bool,
}

impl ConfigStore {
    /// Store at the default per-user location. A missing file is not an error.
    pub fn from_default_location() -> anyhow::Result<Self> {
        let config_path = super::paths::default_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(Self {
            config_path,
            explicit: false,
        })
    }

    /// Store at a path the user asked for. The file must exist.
    pub fn from_path(config_path: PathBuf) -> Self {
        Self {
            config_path,
            explicit: true,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> anyhow::Result<SiteshiftConfig> {
        if !self.config_path.exists() {
            if self.explicit {
                anyhow::bail!("Config file not found: {}", self.config_path.display());
            }
            return Ok(SiteshiftConfig::default());
        }
        parser::parse_config_toml(&self.config_path)
    }
}
