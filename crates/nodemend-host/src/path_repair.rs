use anyhow::Result;

use crate::env_store::{EnvironmentStore, PathScope};
use crate::HostLayout;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvergeOutcome {
    pub user_changed: bool,
    pub machine_changed: bool,
}

/// Repairs the three PATH scopes so the package manager's global-bin
/// directory and the runtime installation directory resolve. Idempotent: a
/// second call with identical inputs rewrites nothing in the persisted
/// scopes.
///
/// Entry matching is exact-string and case-sensitive on purpose: the
/// uninstall flow removes the same exact strings this routine appends.
pub fn converge_path(
    store: &mut dyn EnvironmentStore,
    runtime_dir: &str,
    global_bin_dir: &str,
) -> Result<ConvergeOutcome> {
    let (user_changed, user_entries) =
        ensure_scope_entry(store, PathScope::User, global_bin_dir)?;
    let (machine_changed, machine_entries) =
        ensure_scope_entry(store, PathScope::Machine, runtime_dir)?;

    // Global-bin leads so package-manager shims win over any same-named
    // binary elsewhere on the system.
    let mut process_entries: Vec<String> =
        Vec::with_capacity(1 + user_entries.len() + machine_entries.len());
    process_entries.push(global_bin_dir.to_string());
    for entry in user_entries.iter().chain(machine_entries.iter()) {
        if !process_entries.iter().any(|existing| existing == entry) {
            process_entries.push(entry.clone());
        }
    }
    store.set_path_entries(PathScope::Process, &process_entries)?;

    Ok(ConvergeOutcome {
        user_changed,
        machine_changed,
    })
}

/// Directory creation plus PATH convergence, in that order.
pub fn converge_environment(
    layout: &HostLayout,
    store: &mut dyn EnvironmentStore,
) -> Result<ConvergeOutcome> {
    layout.ensure_global_dirs()?;
    converge_path(
        store,
        &layout.runtime_install_dir().display().to_string(),
        &layout.global_bin_dir().display().to_string(),
    )
}

/// Exact-string removal of entries from one persisted scope; used by the
/// clean-slate uninstall flow. Returns whether the scope was rewritten.
pub fn remove_scope_entries(
    store: &mut dyn EnvironmentStore,
    scope: PathScope,
    targets: &[&str],
) -> Result<bool> {
    let entries = store.path_entries(scope)?;
    let kept: Vec<String> = entries
        .iter()
        .filter(|entry| !targets.iter().any(|target| *target == entry.as_str()))
        .cloned()
        .collect();
    if kept.len() == entries.len() {
        return Ok(false);
    }
    store.set_path_entries(scope, &kept)?;
    Ok(true)
}

fn ensure_scope_entry(
    store: &mut dyn EnvironmentStore,
    scope: PathScope,
    required: &str,
) -> Result<(bool, Vec<String>)> {
    let mut entries: Vec<String> = store
        .path_entries(scope)?
        .into_iter()
        .filter(|entry| !entry.is_empty())
        .collect();
    if entries.iter().any(|entry| entry == required) {
        return Ok((false, entries));
    }
    entries.push(required.to_string());
    store.set_path_entries(scope, &entries)?;
    Ok((true, entries))
}
