use anyhow::{anyhow, Result};
use nodemend_core::{parse_version, ReleaseDescriptor};
use semver::Version;

use crate::constraint::parse_constraint;
use crate::select::select_release;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDecision {
    pub action_required: bool,
    pub target_version: String,
}

/// Action is required unless the currently-installed version parses and is
/// exactly the target tuple. Absent or unparseable installed versions fail
/// toward reinstalling, never toward skipping.
pub fn plan_install(installed: Option<&str>, target: &Version) -> InstallDecision {
    let action_required = match installed {
        Some(raw) => match parse_version(raw) {
            Ok(current) => current != *target,
            Err(_) => true,
        },
        None => true,
    };
    InstallDecision {
        action_required,
        target_version: target.to_string(),
    }
}

/// Full selector pipeline: parse the constraint, pick the best release,
/// compare against the installed version.
pub fn resolve_install_decision(
    releases: &[ReleaseDescriptor],
    constraint: &str,
    artifact: &str,
    installed: Option<&str>,
) -> Result<InstallDecision> {
    let range = parse_constraint(constraint);
    let chosen = select_release(releases, &range, artifact).ok_or_else(|| {
        anyhow!(
            "no installable runtime release satisfies constraint '{constraint}' for artifact '{artifact}'"
        )
    })?;
    let target = parse_version(&chosen.version)?;
    Ok(plan_install(installed, &target))
}
