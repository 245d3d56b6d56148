use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};

const OUTPUT_TAIL_LINES: usize = 12;

pub fn build_msi_install_command(installer_path: &Path) -> Command {
    let mut command = Command::new("msiexec");
    command
        .arg("/i")
        .arg(installer_path)
        .arg("/qn")
        .arg("/norestart");
    command
}

/// Global install/upgrade of the application through the package manager.
pub fn build_app_install_command(package: &str, version: &str) -> Command {
    let spec = format!("{package}@{version}");
    if cfg!(windows) {
        // npm is a .cmd shim on Windows; CreateProcess will not resolve it
        // without the shell.
        let mut command = Command::new("cmd");
        command.args(["/C", "npm", "install", "-g", &spec]);
        return command;
    }
    let mut command = Command::new("npm");
    command.args(["install", "-g", &spec]);
    command
}

pub fn build_version_probe_command(program: &str) -> Command {
    if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.args(["/C", program, "--version"]);
        return command;
    }
    let mut command = Command::new(program);
    command.arg("--version");
    command
}

pub fn install_app_package(package: &str, version: &str) -> Result<()> {
    run_command(
        &mut build_app_install_command(package, version),
        &format!("failed installing {package}@{version}"),
    )
}

pub fn install_runtime_msi(installer_path: &Path) -> Result<()> {
    run_command(
        &mut build_msi_install_command(installer_path),
        "runtime installer failed",
    )
}

/// Version of the runtime currently on PATH, or `None` when the runtime is
/// not installed or not queryable. Callers treat `None` as "reinstall".
pub fn installed_runtime_version() -> Option<String> {
    let output = build_version_probe_command("node").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

/// Post-repair check: the runtime and the package manager must both resolve
/// through the converged PATH. Failure here is fatal to the flow; there is no
/// further remediation.
pub fn validate_runtime_commands() -> Result<()> {
    for program in ["node", "npm"] {
        run_command(
            &mut build_version_probe_command(program),
            &format!("'{program}' is not resolvable after PATH repair"),
        )?;
    }
    Ok(())
}

pub(crate) fn run_command(command: &mut Command, context_message: &str) -> Result<()> {
    let output = command
        .output()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if output.status.success() {
        return Ok(());
    }

    Err(anyhow!(
        "{context_message}: status={} output='{}'",
        output.status,
        output_tail(&output.stdout, &output.stderr)
    ))
}

pub(crate) fn output_tail(stdout: &[u8], stderr: &[u8]) -> String {
    let combined = format!(
        "{}\n{}",
        String::from_utf8_lossy(stdout),
        String::from_utf8_lossy(stderr)
    );
    let lines: Vec<&str> = combined
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    lines[start..].join(" | ")
}
