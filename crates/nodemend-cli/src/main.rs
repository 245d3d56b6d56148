use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

mod completion;
mod dispatch;
mod flow;
mod render;


#[derive(Parser, Debug)]
#[command(name = "nodemend", version)]
#[command(about = "Keeps a local n8n installation and its Node.js runtime compatible")]
struct Cli {
    /// Path to a TOML config file with URL and directory overrides.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output and progress bars.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full maintenance flow: resolve, install, repair PATH, validate.
    /// This is the default when no subcommand is given.
    Run,
    /// Report the runtime the app requires and whether an install is needed.
    Resolve,
    /// Converge the PATH scopes without touching the runtime install.
    RepairPath,
    /// Archive the app data directory into the backup directory.
    Backup,
    /// Archive the app data directory to an explicit destination.
    Export {
        #[arg(long)]
        out: PathBuf,
    },
    /// Restore an exported archive into the app data directory.
    Import {
        #[arg(long)]
        archive: PathBuf,
    },
    /// Remove every installed copy of the runtime, after taking a backup.
    UninstallRuntime {
        /// Leave the persistent PATH scopes untouched.
        #[arg(long)]
        keep_path: bool,
    },
    /// Print the directories and URLs the tool would operate on.
    Doctor,
    /// Emit a shell completion script on stdout.
    Completions { shell: Shell },
}

fn main() -> Result<()> {
    dispatch::run_cli(Cli::parse())
}
