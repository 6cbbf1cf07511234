//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a [`BattleConfig`] from a TOML file.
    ///
    /// Missing keys keep their defaults, so an empty file is valid.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse TOML text into a config and check the grid size.
    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.width < 1 || config.height < 1 {
            anyhow::bail!(
                "Invalid field size {}x{}: both sides must be at least 1",
                config.width,
                config.height
            );
        }

        Ok(config)
    }
}
