use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};

use crate::installer::run_command;

pub fn current_unix_timestamp() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?
        .as_secs())
}

pub fn snapshot_archive_path(backup_dir: &Path, timestamp_unix: u64) -> PathBuf {
    backup_dir.join(format!("n8n-data-{timestamp_unix}.zip"))
}

/// Timestamped archive of the data directory into the backup location. Must
/// run before any destructive action. `None` when there is no data directory
/// yet (fresh host), which is not an error.
pub fn snapshot_data_dir(data_dir: &Path, backup_dir: &Path) -> Result<Option<PathBuf>> {
    snapshot_data_dir_with_runner(data_dir, backup_dir, default_archive_runner)
}

pub(crate) fn snapshot_data_dir_with_runner<RunCommand>(
    data_dir: &Path,
    backup_dir: &Path,
    mut run: RunCommand,
) -> Result<Option<PathBuf>>
where
    RunCommand: FnMut(&mut Command) -> Result<()>,
{
    if !data_dir.exists() {
        return Ok(None);
    }
    fs::create_dir_all(backup_dir)
        .with_context(|| format!("failed to create backup dir: {}", backup_dir.display()))?;

    let archive_path = snapshot_archive_path(backup_dir, current_unix_timestamp()?);
    run(&mut build_archive_command(data_dir, &archive_path))
        .with_context(|| format!("failed to archive data dir: {}", data_dir.display()))?;
    Ok(Some(archive_path))
}

pub fn export_data_dir(data_dir: &Path, dest: &Path) -> Result<PathBuf> {
    export_data_dir_with_runner(data_dir, dest, default_archive_runner)
}

pub(crate) fn export_data_dir_with_runner<RunCommand>(
    data_dir: &Path,
    dest: &Path,
    mut run: RunCommand,
) -> Result<PathBuf>
where
    RunCommand: FnMut(&mut Command) -> Result<()>,
{
    if !data_dir.exists() {
        return Err(anyhow!(
            "data directory does not exist: {}",
            data_dir.display()
        ));
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create export dir: {}", parent.display()))?;
    }
    run(&mut build_archive_command(data_dir, dest))
        .with_context(|| format!("failed to export data dir: {}", data_dir.display()))?;
    Ok(dest.to_path_buf())
}

pub fn import_data_archive(archive: &Path, data_dir: &Path) -> Result<()> {
    import_data_archive_with_runner(archive, data_dir, default_archive_runner)
}

pub(crate) fn import_data_archive_with_runner<RunCommand>(
    archive: &Path,
    data_dir: &Path,
    mut run: RunCommand,
) -> Result<()>
where
    RunCommand: FnMut(&mut Command) -> Result<()>,
{
    if !archive.exists() {
        return Err(anyhow!("archive does not exist: {}", archive.display()));
    }
    fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data dir: {}", data_dir.display()))?;
    run(&mut build_extract_command(archive, data_dir))
        .with_context(|| format!("failed to import archive: {}", archive.display()))
}

pub(crate) fn build_archive_command(source_dir: &Path, archive_path: &Path) -> Command {
    if cfg!(windows) {
        let mut command = Command::new("powershell");
        command.arg("-NoProfile").arg("-Command").arg(format!(
            "Compress-Archive -Path '{}\\*' -DestinationPath '{}' -Force",
            escape_ps_single_quote_path(source_dir),
            escape_ps_single_quote_path(archive_path)
        ));
        return command;
    }

    let mut command = Command::new("tar");
    command
        .arg("-acf")
        .arg(archive_path)
        .arg("-C")
        .arg(source_dir)
        .arg(".");
    command
}

pub(crate) fn build_extract_command(archive_path: &Path, dest_dir: &Path) -> Command {
    if cfg!(windows) {
        let mut command = Command::new("powershell");
        command.arg("-NoProfile").arg("-Command").arg(format!(
            "Expand-Archive -Path '{}' -DestinationPath '{}' -Force",
            escape_ps_single_quote_path(archive_path),
            escape_ps_single_quote_path(dest_dir)
        ));
        return command;
    }

    let mut command = Command::new("tar");
    command.arg("-xf").arg(archive_path).arg("-C").arg(dest_dir);
    command
}

fn default_archive_runner(command: &mut Command) -> Result<()> {
    run_command(command, "archive command failed")
}

fn escape_ps_single_quote_path(path: &Path) -> String {
    let mut os = OsString::new();
    os.push(path.as_os_str());
    os.to_string_lossy().replace('\'', "''")
}
