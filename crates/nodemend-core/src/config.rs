use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Optional operator-provided overrides. Every field falls back to a built-in
/// default when absent; an absent file means all defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    pub app_metadata_url: Option<String>,
    pub release_index_url: Option<String>,
    pub dist_base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub runtime_install_dir: Option<PathBuf>,
    pub global_bin_dir: Option<PathBuf>,
    pub global_cache_dir: Option<PathBuf>,
}

impl ToolConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("failed to parse nodemend config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed parsing config: {}", path.display()))
    }
}
