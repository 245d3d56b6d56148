use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nodemend_core::ToolConfig;

mod backup;
mod env_store;
mod installer;
mod path_repair;
mod uninstall;

pub use backup::{
    current_unix_timestamp, export_data_dir, import_data_archive, snapshot_archive_path,
    snapshot_data_dir,
};
pub use env_store::{system_environment_store, EnvironmentStore, MemoryEnvironmentStore, PathScope};
pub use installer::{
    build_app_install_command, build_msi_install_command, build_version_probe_command,
    install_app_package, install_runtime_msi, installed_runtime_version, validate_runtime_commands,
};
pub use path_repair::{converge_environment, converge_path, remove_scope_entries, ConvergeOutcome};
pub use uninstall::{
    default_uninstall_runner, quiet_uninstall_invocation, run_uninstall_entries, UninstallAttempt,
    UninstallEntry, RUNTIME_DISPLAY_NAME,
};

#[cfg(windows)]
pub use env_store::RegistryEnvironmentStore;
#[cfg(windows)]
pub use uninstall::scrape_runtime_uninstall_entries;

/// Directory map for everything the tool touches on the host. All defaults
/// can be overridden from [`ToolConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLayout {
    data_dir: PathBuf,
    backup_dir: PathBuf,
    runtime_install_dir: PathBuf,
    global_bin_dir: PathBuf,
    global_cache_dir: PathBuf,
}

impl HostLayout {
    pub fn from_config(config: &ToolConfig) -> Result<Self> {
        let home = user_home_dir()?;
        Ok(Self {
            data_dir: config
                .data_dir
                .clone()
                .unwrap_or_else(|| home.join(".n8n")),
            backup_dir: config
                .backup_dir
                .clone()
                .unwrap_or_else(|| home.join("n8n-backups")),
            runtime_install_dir: config
                .runtime_install_dir
                .clone()
                .unwrap_or_else(default_runtime_install_dir),
            global_bin_dir: config
                .global_bin_dir
                .clone()
                .unwrap_or_else(|| default_global_bin_dir(&home)),
            global_cache_dir: config
                .global_cache_dir
                .clone()
                .unwrap_or_else(|| default_global_cache_dir(&home)),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn runtime_install_dir(&self) -> &Path {
        &self.runtime_install_dir
    }

    pub fn global_bin_dir(&self) -> &Path {
        &self.global_bin_dir
    }

    pub fn global_cache_dir(&self) -> &Path {
        &self.global_cache_dir
    }

    /// Creates the package manager's global directories. A pre-existing
    /// directory is not an error.
    pub fn ensure_global_dirs(&self) -> Result<()> {
        for dir in [&self.global_bin_dir, &self.global_cache_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

fn user_home_dir() -> Result<PathBuf> {
    if cfg!(windows) {
        let profile = std::env::var("USERPROFILE")
            .context("USERPROFILE is not set; cannot resolve user directories")?;
        return Ok(PathBuf::from(profile));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve user directories")?;
    Ok(PathBuf::from(home))
}

fn default_runtime_install_dir() -> PathBuf {
    if cfg!(windows) {
        let programs =
            std::env::var("ProgramFiles").unwrap_or_else(|_| "C:\\Program Files".to_string());
        return PathBuf::from(programs).join("nodejs");
    }
    PathBuf::from("/usr/local/lib/nodejs")
}

fn default_global_bin_dir(home: &Path) -> PathBuf {
    if cfg!(windows) {
        return match std::env::var("APPDATA") {
            Ok(app_data) => PathBuf::from(app_data).join("npm"),
            Err(_) => home.join("AppData").join("Roaming").join("npm"),
        };
    }
    home.join(".npm-global").join("bin")
}

fn default_global_cache_dir(home: &Path) -> PathBuf {
    if cfg!(windows) {
        return match std::env::var("LOCALAPPDATA") {
            Ok(local) => PathBuf::from(local).join("npm-cache"),
            Err(_) => home.join("AppData").join("Local").join("npm-cache"),
        };
    }
    home.join(".npm")
}
