use std::io::IsTerminal;
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};

use drydock_core::{
    BackupListing, RemoteDiff, RunReport, UpdateLogEntry, UpdateOutcome,
};
use drydock_updater::StatusReport;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn current() -> Self {
        Self {
            style: current_output_style(),
        }
    }

    pub(crate) fn print_status(self, status: &str, message: &str) {
        println!("{}", render_status_line(self.style, status, message));
    }

    pub(crate) fn print_lines(self, lines: &[String]) {
        for line in lines {
            println!("{line}");
        }
    }

    pub(crate) fn start_spinner(self, label: &str) -> Option<ProgressBar> {
        if self.style != OutputStyle::Rich {
            return None;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg} {elapsed_precise}") {
            spinner.set_style(style.tick_chars(spinner_tick_chars(label)));
        }
        spinner.set_message(label.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        Some(spinner)
    }

    pub(crate) fn finish_spinner(self, spinner: Option<ProgressBar>) {
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
    }
}

pub(crate) fn current_output_style() -> OutputStyle {
    if std::env::var_os("NO_COLOR").is_some() || !std::io::stdout().is_terminal() {
        OutputStyle::Plain
    } else {
        OutputStyle::Rich
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => format!("[{status}] {message}"),
        OutputStyle::Rich => format!("{} {message}", colorize(status_style(), &format!("[{status}]"))),
    }
}

fn spinner_tick_chars(label: &str) -> &'static str {
    match label {
        "update" => "<^>v ",
        "check" => ".oO@* ",
        _ => "|/-\\ ",
    }
}

fn status_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, value: &str) -> String {
    format!("{style}{value}{}", style.render_reset())
}

pub(crate) fn format_status_lines(status: &StatusReport) -> Vec<String> {
    let mut lines = Vec::new();
    match &status.version {
        Some(version) => {
            let label = version
                .semantic
                .as_ref()
                .map(|semantic| format!(" (v{semantic})"))
                .unwrap_or_default();
            lines.push(format!(
                "version: {}{} on {} at {}",
                version.short_commit(),
                label,
                version.branch,
                version.commit_date
            ));
        }
        None => lines.push("version: unknown".to_string()),
    }
    match status.uptime_secs {
        Some(uptime_secs) => lines.push(format!("uptime: {}", format_duration_secs(uptime_secs))),
        None => lines.push("uptime: unknown".to_string()),
    }
    lines.push(format!(
        "update lock: {}",
        if status.lock_held { "held" } else { "free" }
    ));
    lines.push(format!(
        "prerequisites: git={} work-tree={} supervisor={} db-dump={}",
        present(status.prereqs.git_available),
        present(status.prereqs.inside_work_tree),
        present(status.prereqs.supervisor_available),
        present(status.prereqs.db_dump_tool_available)
    ));
    match &status.last_run {
        Some(entry) => lines.extend(format_log_entry_lines(entry, "last run: ")),
        None => lines.push("last run: none".to_string()),
    }
    lines
}

pub(crate) fn format_check_lines(diff: &RemoteDiff) -> Vec<String> {
    let mut lines = Vec::new();
    if diff.ahead == 0 {
        lines.push(format!(
            "up to date with remote tip {}",
            &diff.latest_remote_hash[..12.min(diff.latest_remote_hash.len())]
        ));
        return lines;
    }

    lines.push(format!(
        "{} commit(s) behind remote tip {}",
        diff.ahead,
        &diff.latest_remote_hash[..12.min(diff.latest_remote_hash.len())]
    ));
    for commit in &diff.commits {
        lines.push(format!(
            "- {} {} ({}, {})",
            &commit.hash[..12.min(commit.hash.len())],
            commit.subject,
            commit.author,
            commit.date
        ));
    }
    lines
}

pub(crate) fn format_log_lines(entries: &[UpdateLogEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["no update runs recorded".to_string()];
    }

    let mut lines = Vec::new();
    for entry in entries {
        lines.extend(format_log_entry_lines(entry, ""));
    }
    lines
}

fn format_log_entry_lines(entry: &UpdateLogEntry, prefix: &str) -> Vec<String> {
    let mut line = format!(
        "{prefix}{} {} started_at={}",
        entry.run_id,
        entry.outcome.as_str(),
        entry.started_at_unix
    );
    if let Some(finished_at_unix) = entry.finished_at_unix {
        line.push_str(&format!(" finished_at={finished_at_unix}"));
    }
    if entry.no_op {
        line.push_str(" (already up to date)");
    }
    if let Some(version_after) = &entry.version_after {
        if !entry.no_op {
            line.push_str(&format!(
                " {} -> {}",
                short_hash(&entry.version_before),
                short_hash(version_after)
            ));
        }
    }
    if let Some(failed_step) = entry.failed_step {
        line.push_str(&format!(" failed_step={}", failed_step.as_str()));
    }

    let mut lines = vec![line];
    if let Some(error) = &entry.error {
        lines.push(format!("  error: {}", error.replace('\n', " / ")));
    }
    lines
}

pub(crate) fn format_backup_lines(backups: &[BackupListing]) -> Vec<String> {
    if backups.is_empty() {
        return vec!["no backups recorded".to_string()];
    }

    let mut lines = Vec::new();
    for listing in backups {
        lines.push(format!(
            "{} created_at={} commit={} size={} files={} db-dump={}",
            listing.record.backup_id,
            listing.record.created_at_unix,
            short_hash(&listing.record.commit),
            HumanBytes(listing.record.size_bytes),
            artifact_presence(true, listing.files_present),
            artifact_presence(listing.record.db_dump_path.is_some(), listing.db_dump_present)
        ));
    }
    lines
}

pub(crate) fn format_run_report_lines(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    let headline = match report.outcome {
        UpdateOutcome::Succeeded if report.no_op => "already up to date".to_string(),
        UpdateOutcome::Succeeded => format!(
            "update succeeded: {} -> {}",
            short_hash(&report.version_before),
            report
                .version_after
                .as_deref()
                .map(short_hash)
                .unwrap_or("unknown")
        ),
        UpdateOutcome::RolledBack => format!(
            "update failed at {} and was rolled back",
            report
                .failed_step
                .map(|step| step.as_str())
                .unwrap_or("unknown step")
        ),
        UpdateOutcome::Failed | UpdateOutcome::Running => format!(
            "update failed at {}",
            report
                .failed_step
                .map(|step| step.as_str())
                .unwrap_or("unknown step")
        ),
    };
    lines.push(format!("{} ({})", headline, report.run_id));

    if let Some(backup_id) = &report.backup_id {
        lines.push(format!("backup: {backup_id}"));
    }
    lines.push(format!("restore: {}", report.restore.as_str()));
    if let Some(error) = &report.error {
        lines.push(format!("error: {}", error.replace('\n', " / ")));
    }
    lines
}

pub(crate) fn format_duration_secs(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours:02}h {minutes:02}m")
    } else if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else {
        format!("{minutes}m {:02}s", total_secs % 60)
    }
}

fn present(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn short_hash(hash: &str) -> &str {
    &hash[..12.min(hash.len())]
}

fn artifact_presence(recorded: bool, present: bool) -> &'static str {
    match (recorded, present) {
        (false, _) => "skipped",
        (true, true) => "present",
        (true, false) => "missing",
    }
}
