use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};

use zipkeep::backup::PendingArchive;
use zipkeep::cli::{handle_request, BackupRequest, GlobalFlags};

#[derive(Parser)]
#[command(
    name = "zipkeep",
    version,
    about = "Archive files and directories into dated zip backups",
    long_about = "zipkeep builds dated zip backups gated by per-target config \
                  files. The first run for a target writes a config snapshot \
                  under {destination}/cache/ and skips compression; later runs \
                  archive the target with the persisted allow/deny filters and \
                  prune superseded backups from past months."
)]
struct Cli {
    /// Destination directory for archives (created if missing)
    save: PathBuf,

    /// Fast request: archive PATH under its own name (repeatable)
    #[arg(short = 'f', value_name = "PATH", action = ArgAction::Append)]
    fast: Vec<PathBuf>,

    /// Named request: archive PATH as NAME (repeatable)
    #[arg(
        short = 'n',
        num_args = 2,
        value_names = ["PATH", "NAME"],
        action = ArgAction::Append
    )]
    named: Vec<String>,

    /// Build archives without the config gate or auto-clean
    #[arg(long)]
    force: bool,

    /// Name archives without a date prefix
    #[arg(long)]
    dateless: bool,

    /// Display what would be archived without writing anything
    #[arg(long)]
    preview: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let flags = GlobalFlags {
        force: cli.force,
        dateless: cli.dateless,
        preview: cli.preview,
    };

    // On SIGINT, delete the in-flight temp archive so nothing half-written
    // survives under the destination
    let pending = PendingArchive::new();
    let handler = pending.clone();
    ctrlc::set_handler(move || {
        if let Some(path) = handler.remove_pending() {
            eprintln!("\nremoved temp file {}", path.display());
        }
        std::process::exit(130);
    })?;

    let mut requests: Vec<BackupRequest> = cli
        .fast
        .into_iter()
        .map(|target| BackupRequest { target, name: None })
        .collect();
    for pair in cli.named.chunks(2) {
        requests.push(BackupRequest {
            target: PathBuf::from(&pair[0]),
            name: Some(pair[1].clone()),
        });
    }

    for request in &requests {
        handle_request(request, &cli.save, flags, pending.clone())?;
    }

    Ok(())
}
