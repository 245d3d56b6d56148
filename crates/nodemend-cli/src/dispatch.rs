use anyhow::Result;
use nodemend_core::{ToolConfig, WINDOWS_X64_MSI};
use nodemend_dist::DistClient;
use nodemend_host::{
    converge_environment, export_data_dir, import_data_archive, install_app_package,
    snapshot_data_dir, system_environment_store, ConvergeOutcome, HostLayout,
};
use nodemend_resolver::{resolve_install_decision, InstallDecision};

use crate::completion;
use crate::flow::{run_maintenance_flow, FlowOutcome, HostFlowActions};
use crate::render::{output_style, print_status, OutputStyle};
use crate::{Cli, Commands};

const APP_PACKAGE: &str = "n8n";

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ToolConfig::load(path)?,
        None => ToolConfig::default(),
    };
    let style = output_style(cli.plain);
    let layout = HostLayout::from_config(&config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_full_flow(&config, &layout, style),
        Commands::Resolve => report_resolution(&config, style),
        Commands::RepairPath => repair_path(&layout, style),
        Commands::Backup => backup_data(&layout, style),
        Commands::Export { out } => {
            let archive = export_data_dir(layout.data_dir(), &out)?;
            print_status(style, "ok", &format!("data exported to {}", archive.display()));
            Ok(())
        }
        Commands::Import { archive } => {
            import_data_archive(&archive, layout.data_dir())?;
            print_status(
                style,
                "ok",
                &format!("archive restored into {}", layout.data_dir().display()),
            );
            Ok(())
        }
        Commands::UninstallRuntime { keep_path } => uninstall_runtime(&layout, style, keep_path),
        Commands::Doctor => {
            for line in format_doctor_lines(&config, &layout) {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            completion::write_completions_script(shell, &mut std::io::stdout())
        }
    }
}

fn run_full_flow(config: &ToolConfig, layout: &HostLayout, style: OutputStyle) -> Result<()> {
    let client = DistClient::new(config)?;
    let mut store = system_environment_store()?;
    let mut actions = HostFlowActions::new(&client, layout, store.as_mut(), style);

    match run_maintenance_flow(&mut actions) {
        FlowOutcome::Done {
            decision,
            installed,
            app_version,
        } => {
            if installed {
                print_status(
                    style,
                    "ok",
                    &format!("runtime {} installed", decision.target_version),
                );
            } else {
                print_status(
                    style,
                    "ok",
                    &format!("runtime {} already current", decision.target_version),
                );
            }
            print_status(style, "ok", "PATH converged and commands validated");

            install_app_package(APP_PACKAGE, &app_version)?;
            print_status(
                style,
                "done",
                &format!("{APP_PACKAGE} {app_version} is in place"),
            );
            Ok(())
        }
        FlowOutcome::Failed { stage, error } => {
            Err(error.context(format!("maintenance flow failed while {}", stage.as_str())))
        }
    }
}

fn report_resolution(config: &ToolConfig, style: OutputStyle) -> Result<()> {
    let client = DistClient::new(config)?;
    let metadata = client.fetch_app_metadata()?;
    let releases = client.fetch_release_index()?;
    let installed = nodemend_host::installed_runtime_version();
    let decision = resolve_install_decision(
        &releases,
        metadata.runtime_constraint(),
        WINDOWS_X64_MSI,
        installed.as_deref(),
    )?;
    for line in format_decision_lines(metadata.runtime_constraint(), installed.as_deref(), &decision)
    {
        print_status(style, "info", &line);
    }
    Ok(())
}

fn repair_path(layout: &HostLayout, style: OutputStyle) -> Result<()> {
    let mut store = system_environment_store()?;
    let outcome = converge_environment(layout, store.as_mut())?;
    print_status(style, "ok", &format_converge_summary(&outcome));
    Ok(())
}

fn backup_data(layout: &HostLayout, style: OutputStyle) -> Result<()> {
    match snapshot_data_dir(layout.data_dir(), layout.backup_dir())? {
        Some(archive) => print_status(
            style,
            "ok",
            &format!("data archived to {}", archive.display()),
        ),
        None => print_status(
            style,
            "warn",
            &format!(
                "no data directory at {}; nothing to back up",
                layout.data_dir().display()
            ),
        ),
    }
    Ok(())
}

fn uninstall_runtime(layout: &HostLayout, style: OutputStyle, keep_path: bool) -> Result<()> {
    match snapshot_data_dir(layout.data_dir(), layout.backup_dir())? {
        Some(archive) => print_status(
            style,
            "ok",
            &format!("data archived to {}", archive.display()),
        ),
        None => print_status(style, "warn", "no data directory; continuing without a backup"),
    }

    #[cfg(windows)]
    {
        let entries = nodemend_host::scrape_runtime_uninstall_entries()?;
        if entries.is_empty() {
            print_status(style, "ok", "no installed runtime copies found");
        }
        let attempts = nodemend_host::run_uninstall_entries(
            &entries,
            nodemend_host::default_uninstall_runner,
        );
        for attempt in &attempts {
            if attempt.succeeded {
                print_status(style, "ok", &format!("removed {}", attempt.display_name));
            } else {
                let detail = attempt.detail.as_deref().unwrap_or("unknown failure");
                print_status(
                    style,
                    "warn",
                    &format!("could not remove {}: {detail}", attempt.display_name),
                );
            }
        }

        if !keep_path {
            let mut store = system_environment_store()?;
            let runtime_dir = layout.runtime_install_dir().display().to_string();
            let global_bin = layout.global_bin_dir().display().to_string();
            for scope in [
                nodemend_host::PathScope::User,
                nodemend_host::PathScope::Machine,
            ] {
                nodemend_host::remove_scope_entries(
                    store.as_mut(),
                    scope,
                    &[runtime_dir.as_str(), global_bin.as_str()],
                )?;
            }
            print_status(style, "ok", "runtime entries removed from persisted PATH scopes");
        }
        Ok(())
    }

    #[cfg(not(windows))]
    {
        let _ = keep_path;
        Err(anyhow::anyhow!(
            "runtime uninstall requires the Windows installed-software registry"
        ))
    }
}

pub(crate) fn format_decision_lines(
    constraint: &str,
    installed: Option<&str>,
    decision: &InstallDecision,
) -> Vec<String> {
    let shown = if constraint.is_empty() { "(any)" } else { constraint };
    vec![
        format!("required runtime: {shown}"),
        format!("installed runtime: {}", installed.unwrap_or("(none)")),
        format!("target runtime: {}", decision.target_version),
        format!(
            "install needed: {}",
            if decision.action_required { "yes" } else { "no" }
        ),
    ]
}

pub(crate) fn format_converge_summary(outcome: &ConvergeOutcome) -> String {
    match (outcome.user_changed, outcome.machine_changed) {
        (false, false) => "PATH already converged; nothing rewritten".to_string(),
        (true, false) => "user PATH updated".to_string(),
        (false, true) => "machine PATH updated".to_string(),
        (true, true) => "user and machine PATH updated".to_string(),
    }
}

pub(crate) fn format_doctor_lines(config: &ToolConfig, layout: &HostLayout) -> Vec<String> {
    vec![
        format!(
            "app metadata url: {}",
            config
                .app_metadata_url
                .as_deref()
                .unwrap_or(nodemend_dist::DEFAULT_APP_METADATA_URL)
        ),
        format!(
            "release index url: {}",
            config
                .release_index_url
                .as_deref()
                .unwrap_or(nodemend_dist::DEFAULT_RELEASE_INDEX_URL)
        ),
        format!(
            "dist base url: {}",
            config
                .dist_base_url
                .as_deref()
                .unwrap_or(nodemend_dist::DEFAULT_DIST_BASE_URL)
        ),
        format!("data dir: {}", layout.data_dir().display()),
        format!("backup dir: {}", layout.backup_dir().display()),
        format!("runtime install dir: {}", layout.runtime_install_dir().display()),
        format!("global bin dir: {}", layout.global_bin_dir().display()),
        format!("global cache dir: {}", layout.global_cache_dir().display()),
    ]
}
