use std::process::Command;

use anyhow::Result;

use crate::installer::run_command;

/// Display-name marker for runtime copies in the installed-software registry.
pub const RUNTIME_DISPLAY_NAME: &str = "Node.js";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallEntry {
    pub display_name: String,
    pub uninstall_command: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallAttempt {
    pub display_name: String,
    pub succeeded: bool,
    pub detail: Option<String>,
}

/// Derives a silent uninstall invocation from a registry `UninstallString`.
/// msiexec-shaped strings become `msiexec /x {product-code} /qn /norestart`;
/// anything else keeps its own program and gets a quiet flag appended.
/// `None` when the string cannot be parsed into a program at all.
pub fn quiet_uninstall_invocation(raw: &str) -> Option<(String, Vec<String>)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(product_code) = msi_product_code(trimmed) {
        return Some((
            "msiexec".to_string(),
            vec![
                "/x".to_string(),
                product_code,
                "/qn".to_string(),
                "/norestart".to_string(),
            ],
        ));
    }

    let (program, mut args) = split_command_line(trimmed)?;
    args.push("/S".to_string());
    Some((program, args))
}

/// Runs each uninstall entry best-effort: an individual failure is recorded,
/// never propagated. The run function is injectable for tests.
pub fn run_uninstall_entries<RunCommand>(
    entries: &[UninstallEntry],
    mut run: RunCommand,
) -> Vec<UninstallAttempt>
where
    RunCommand: FnMut(&mut Command) -> Result<()>,
{
    let mut attempts = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some((program, args)) = quiet_uninstall_invocation(&entry.uninstall_command) else {
            attempts.push(UninstallAttempt {
                display_name: entry.display_name.clone(),
                succeeded: false,
                detail: Some(format!(
                    "unparseable uninstall string: '{}'",
                    entry.uninstall_command
                )),
            });
            continue;
        };

        let mut command = Command::new(program);
        command.args(args);
        match run(&mut command) {
            Ok(()) => attempts.push(UninstallAttempt {
                display_name: entry.display_name.clone(),
                succeeded: true,
                detail: None,
            }),
            Err(err) => attempts.push(UninstallAttempt {
                display_name: entry.display_name.clone(),
                succeeded: false,
                detail: Some(err.to_string()),
            }),
        }
    }
    attempts
}

pub fn default_uninstall_runner(command: &mut Command) -> Result<()> {
    run_command(command, "uninstall command failed")
}

fn msi_product_code(raw: &str) -> Option<String> {
    if !raw.to_ascii_lowercase().contains("msiexec") {
        return None;
    }
    let start = raw.find('{')?;
    let end = raw[start..].find('}')? + start;
    Some(raw[start..=end].to_string())
}

fn split_command_line(raw: &str) -> Option<(String, Vec<String>)> {
    if let Some(rest) = raw.strip_prefix('"') {
        let (program, tail) = rest.split_once('"')?;
        if program.is_empty() {
            return None;
        }
        let args = tail.split_whitespace().map(str::to_string).collect();
        return Some((program.to_string(), args));
    }

    let mut parts = raw.split_whitespace();
    let program = parts.next()?.to_string();
    let args = parts.map(str::to_string).collect();
    Some((program, args))
}

#[cfg(windows)]
pub use windows_scrape::scrape_runtime_uninstall_entries;

#[cfg(windows)]
mod windows_scrape {
    use anyhow::Result;
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};
    use winreg::RegKey;

    use super::{UninstallEntry, RUNTIME_DISPLAY_NAME};

    const UNINSTALL_VIEWS: [(winreg::HKEY, &str); 3] = [
        (
            HKEY_LOCAL_MACHINE,
            "SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Uninstall",
        ),
        (
            HKEY_LOCAL_MACHINE,
            "SOFTWARE\\WOW6432Node\\Microsoft\\Windows\\CurrentVersion\\Uninstall",
        ),
        (
            HKEY_CURRENT_USER,
            "SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Uninstall",
        ),
    ];

    /// Enumerates every uninstall view and collects entries whose display
    /// name marks a runtime copy. Unreadable views and entries are skipped;
    /// the scrape itself never fails on them.
    pub fn scrape_runtime_uninstall_entries() -> Result<Vec<UninstallEntry>> {
        let mut entries = Vec::new();
        for (hive, subkey) in UNINSTALL_VIEWS {
            let root = RegKey::predef(hive);
            let Ok(view) = root.open_subkey(subkey) else {
                continue;
            };
            for child_name in view.enum_keys().flatten() {
                let Ok(child) = view.open_subkey(&child_name) else {
                    continue;
                };
                let Ok(display_name) = child.get_value::<String, _>("DisplayName") else {
                    continue;
                };
                if !display_name.contains(RUNTIME_DISPLAY_NAME) {
                    continue;
                }
                let uninstall_command = child
                    .get_value::<String, _>("QuietUninstallString")
                    .or_else(|_| child.get_value::<String, _>("UninstallString"));
                let Ok(uninstall_command) = uninstall_command else {
                    continue;
                };
                entries.push(UninstallEntry {
                    display_name,
                    uninstall_command,
                });
            }
        }
        Ok(entries)
    }
}
