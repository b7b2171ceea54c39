use std::path::PathBuf;

use anyhow::{Context, Result};

use drydock_core::{UpdateConfig, UpdateOutcome};
use drydock_state::{clean_stale_locks, page_backups, page_run_entries};
use drydock_updater::{collect_status, run_update};
use drydock_vcs::check_remote;

use crate::completion::print_completions;
use crate::render::{
    format_backup_lines, format_check_lines, format_log_lines, format_run_report_lines,
    format_status_lines, TerminalRenderer,
};
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let renderer = TerminalRenderer::current();
    let site_root = resolve_site_root(cli.site_root)?;
    let config = UpdateConfig::load(&site_root)?;
    let layout = config.resolve_layout(&site_root);

    match cli.command {
        Commands::Status => {
            let status = collect_status(&layout, &config);
            renderer.print_lines(&format_status_lines(&status));
        }
        Commands::Check { repo_url, branch } => {
            let repo_url = match repo_url {
                Some(repo_url) => repo_url,
                None => config.require_repo_url()?.to_string(),
            };
            let branch = branch.unwrap_or_else(|| config.branch.clone());

            let spinner = renderer.start_spinner("check");
            let diff = check_remote(layout.site_root(), &repo_url, &branch);
            renderer.finish_spinner(spinner);
            renderer.print_lines(&format_check_lines(&diff?));
        }
        Commands::Log { page, limit } => {
            layout.ensure_base_dirs()?;
            let entries = page_run_entries(&layout, page, limit)?;
            renderer.print_lines(&format_log_lines(&entries));
        }
        Commands::Backups { page, limit } => {
            layout.ensure_base_dirs()?;
            let backups = page_backups(&layout, page, limit)?;
            renderer.print_lines(&format_backup_lines(&backups));
        }
        Commands::Run => {
            renderer.print_status("run", "starting guarded update");
            let spinner = renderer.start_spinner("update");
            let result = run_update(&layout, &config);
            renderer.finish_spinner(spinner);

            let report = result?;
            renderer.print_lines(&format_run_report_lines(&report));
            if report.outcome != UpdateOutcome::Succeeded {
                anyhow::bail!(
                    "update run {} finished {}",
                    report.run_id,
                    report.outcome.as_str()
                );
            }
        }
        Commands::CleanStale => {
            layout.ensure_base_dirs()?;
            let removed = clean_stale_locks(&layout, config.lock_ttl_secs)?;
            renderer.print_status(
                "clean-stale",
                &format!("removed {removed} stale lock(s)"),
            );
        }
        Commands::Completions { shell } => {
            print_completions(shell)?;
        }
    }

    Ok(())
}

fn resolve_site_root(site_root: Option<PathBuf>) -> Result<PathBuf> {
    match site_root {
        Some(site_root) => Ok(site_root),
        None => std::env::current_dir().context("failed to resolve current directory"),
    }
}
