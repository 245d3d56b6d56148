use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use nodemend_core::{ReleaseDescriptor, WINDOWS_X64_MSI};
use nodemend_dist::{verify_file_sha256, AppMetadata, DistClient};
use nodemend_host::{EnvironmentStore, HostLayout};
use nodemend_resolver::{resolve_install_decision, InstallDecision};

use crate::render::{download_progress, OutputStyle};

/// Named stages of the converge-and-install flow, used to attribute failures
/// in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlowStage {
    Resolving,
    Installing,
    ConvergingPath,
    Validating,
}

impl FlowStage {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::Installing => "installing",
            Self::ConvergingPath => "converging-path",
            Self::Validating => "validating",
        }
    }
}

#[derive(Debug)]
pub(crate) enum FlowOutcome {
    Done {
        decision: InstallDecision,
        installed: bool,
        app_version: String,
    },
    Failed {
        stage: FlowStage,
        error: anyhow::Error,
    },
}

/// Collaborator seam for the flow. The real implementation talks to the
/// network, the installer, and the registry; tests substitute fakes.
pub(crate) trait FlowActions {
    fn fetch_app_metadata(&mut self) -> Result<AppMetadata>;
    fn fetch_release_index(&mut self) -> Result<Vec<ReleaseDescriptor>>;
    fn installed_runtime_version(&mut self) -> Option<String>;
    fn snapshot_data_dir(&mut self) -> Result<()>;
    fn install_runtime(&mut self, version: &str) -> Result<()>;
    fn converge_environment(&mut self) -> Result<()>;
    fn validate_commands(&mut self) -> Result<()>;
}

/// Drives resolve → maybe-install → converge-path → validate to completion.
/// PATH convergence runs whether or not an install happened; the data
/// snapshot always precedes the installer.
pub(crate) fn run_maintenance_flow(actions: &mut dyn FlowActions) -> FlowOutcome {
    let (app_version, decision) = match resolve_stage(actions) {
        Ok(resolved) => resolved,
        Err(error) => {
            return FlowOutcome::Failed {
                stage: FlowStage::Resolving,
                error,
            }
        }
    };

    let mut installed = false;
    if decision.action_required {
        if let Err(error) = install_stage(actions, &decision.target_version) {
            return FlowOutcome::Failed {
                stage: FlowStage::Installing,
                error,
            };
        }
        installed = true;
    }

    if let Err(error) = actions.converge_environment() {
        return FlowOutcome::Failed {
            stage: FlowStage::ConvergingPath,
            error,
        };
    }

    if let Err(error) = actions.validate_commands() {
        return FlowOutcome::Failed {
            stage: FlowStage::Validating,
            error,
        };
    }

    FlowOutcome::Done {
        decision,
        installed,
        app_version,
    }
}

fn resolve_stage(actions: &mut dyn FlowActions) -> Result<(String, InstallDecision)> {
    let metadata = actions.fetch_app_metadata()?;
    let releases = actions.fetch_release_index()?;
    let installed = actions.installed_runtime_version();
    let decision = resolve_install_decision(
        &releases,
        metadata.runtime_constraint(),
        WINDOWS_X64_MSI,
        installed.as_deref(),
    )?;
    Ok((metadata.version, decision))
}

fn install_stage(actions: &mut dyn FlowActions, version: &str) -> Result<()> {
    actions.snapshot_data_dir()?;
    actions.install_runtime(version)
}

/// The real collaborators: dist client for fetches and downloads, host layout
/// for directories, environment store for PATH scopes.
pub(crate) struct HostFlowActions<'a> {
    client: &'a DistClient,
    layout: &'a HostLayout,
    store: &'a mut dyn EnvironmentStore,
    download_dir: PathBuf,
    style: OutputStyle,
}

impl<'a> HostFlowActions<'a> {
    pub(crate) fn new(
        client: &'a DistClient,
        layout: &'a HostLayout,
        store: &'a mut dyn EnvironmentStore,
        style: OutputStyle,
    ) -> Self {
        Self {
            client,
            layout,
            store,
            download_dir: std::env::temp_dir().join("nodemend-downloads"),
            style,
        }
    }
}

impl FlowActions for HostFlowActions<'_> {
    fn fetch_app_metadata(&mut self) -> Result<AppMetadata> {
        self.client.fetch_app_metadata()
    }

    fn fetch_release_index(&mut self) -> Result<Vec<ReleaseDescriptor>> {
        self.client.fetch_release_index()
    }

    fn installed_runtime_version(&mut self) -> Option<String> {
        nodemend_host::installed_runtime_version()
    }

    fn snapshot_data_dir(&mut self) -> Result<()> {
        nodemend_host::snapshot_data_dir(self.layout.data_dir(), self.layout.backup_dir())?;
        Ok(())
    }

    fn install_runtime(&mut self, version: &str) -> Result<()> {
        let file_name = DistClient::installer_file_name(version);
        let dest = self.download_dir.join(&file_name);

        let bar = download_progress(self.style);
        let downloaded = self.client.download_installer(version, &dest, |done, total| {
            if let Some(bar) = &bar {
                if let Some(total) = total {
                    bar.set_length(total);
                }
                bar.set_position(done);
            }
        });
        if let Some(bar) = &bar {
            bar.finish_and_clear();
        }
        downloaded?;

        let digests = self.client.fetch_shasums(version)?;
        let expected = digests
            .get(&file_name)
            .ok_or_else(|| anyhow!("no published checksum for {file_name}"))?;
        verify_file_sha256(&dest, expected)?;

        nodemend_host::install_runtime_msi(&dest)
            .with_context(|| format!("failed installing runtime {version}"))
    }

    fn converge_environment(&mut self) -> Result<()> {
        nodemend_host::converge_environment(self.layout, self.store)?;
        Ok(())
    }

    fn validate_commands(&mut self) -> Result<()> {
        nodemend_host::validate_runtime_commands()
    }
}
