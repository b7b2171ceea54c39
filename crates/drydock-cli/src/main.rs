use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::completion::CliCompletionShell;

mod completion;
mod dispatch;
mod render;

#[derive(Parser, Debug)]
#[command(name = "drydock")]
#[command(about = "Guarded self-update orchestrator for the catalog site", long_about = None)]
struct Cli {
    #[arg(long)]
    site_root: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Status,
    Check {
        #[arg(long)]
        repo_url: Option<String>,
        #[arg(long)]
        branch: Option<String>,
    },
    Log {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    Backups {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    Run,
    CleanStale,
    Completions {
        #[arg(value_enum)]
        shell: Option<CliCompletionShell>,
    },
}

fn main() -> Result<()> {
    dispatch::run_cli(Cli::parse())
}

#[cfg(test)]
mod tests;
