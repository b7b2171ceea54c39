use clap::Parser;

use drydock_core::{
    BackupListing, BackupRecord, CommitSummary, PrereqReport, RemoteDiff, RestoreDisposition,
    RunReport, UpdateLogEntry, UpdateOutcome, UpdateStep,
};
use drydock_updater::StatusReport;

use crate::completion::{detect_shell_from_env, resolve_completions_shell, CliCompletionShell};
use crate::render::{
    format_backup_lines, format_check_lines, format_duration_secs, format_log_lines,
    format_run_report_lines, format_status_lines, render_status_line, OutputStyle,
};
use crate::{Cli, Commands};

#[test]
fn cli_parses_check_with_overrides() {
    let cli = Cli::try_parse_from([
        "drydock",
        "check",
        "--repo-url",
        "https://example.com/site.git",
        "--branch",
        "release",
    ])
    .expect("must parse");
    match cli.command {
        Commands::Check { repo_url, branch } => {
            assert_eq!(repo_url.as_deref(), Some("https://example.com/site.git"));
            assert_eq!(branch.as_deref(), Some("release"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn cli_parses_log_pagination_defaults() {
    let cli = Cli::try_parse_from(["drydock", "log"]).expect("must parse");
    match cli.command {
        Commands::Log { page, limit } => {
            assert_eq!(page, 1);
            assert_eq!(limit, 20);
        }
        other => panic!("unexpected command: {other:?}"),
    }

    let cli = Cli::try_parse_from(["drydock", "backups", "--page", "3", "--limit", "5"])
        .expect("must parse");
    match cli.command {
        Commands::Backups { page, limit } => {
            assert_eq!(page, 3);
            assert_eq!(limit, 5);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn cli_parses_site_root_and_run() {
    let cli = Cli::try_parse_from(["drydock", "--site-root", "/srv/site", "run"])
        .expect("must parse");
    assert_eq!(
        cli.site_root.as_deref(),
        Some(std::path::Path::new("/srv/site"))
    );
    assert!(matches!(cli.command, Commands::Run));
}

#[test]
fn completions_shell_resolution_prefers_explicit_then_env() {
    assert_eq!(
        resolve_completions_shell(Some(CliCompletionShell::Fish), Some("/bin/zsh"), false),
        CliCompletionShell::Fish
    );
    assert_eq!(
        resolve_completions_shell(None, Some("/usr/bin/zsh"), false),
        CliCompletionShell::Zsh
    );
    assert_eq!(
        resolve_completions_shell(None, None, false),
        CliCompletionShell::Bash
    );
    assert_eq!(
        resolve_completions_shell(None, None, true),
        CliCompletionShell::Powershell
    );
    assert_eq!(
        detect_shell_from_env(Some("/opt/weird/shell")),
        None
    );
    assert_eq!(
        detect_shell_from_env(Some("pwsh")),
        Some(CliCompletionShell::Powershell)
    );
}

#[test]
fn duration_formatting_scales_units() {
    assert_eq!(format_duration_secs(59), "0m 59s");
    assert_eq!(format_duration_secs(3_660), "1h 01m");
    assert_eq!(format_duration_secs(90_061), "1d 01h 01m");
}

#[test]
fn check_lines_render_ahead_and_up_to_date() {
    let diff = RemoteDiff {
        ahead: 0,
        commits: Vec::new(),
        latest_remote_hash: "0123456789abcdef0123456789abcdef01234567".to_string(),
    };
    let lines = format_check_lines(&diff);
    assert_eq!(lines, vec!["up to date with remote tip 0123456789ab"]);

    let diff = RemoteDiff {
        ahead: 2,
        commits: vec![
            CommitSummary {
                hash: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string(),
                author: "Avery".to_string(),
                date: "2026-08-01T10:00:00+02:00".to_string(),
                subject: "fix quote totals".to_string(),
            },
            CommitSummary {
                hash: "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb".to_string(),
                author: "Sam".to_string(),
                date: "2026-07-31T09:00:00+02:00".to_string(),
                subject: "add category sort".to_string(),
            },
        ],
        latest_remote_hash: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string(),
    };
    let lines = format_check_lines(&diff);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("2 commit(s) behind remote tip aaaaaaaaaaaa"));
    assert!(lines[1].contains("fix quote totals"));
    assert!(lines[2].contains("add category sort"));
}

#[test]
fn log_lines_carry_outcome_step_and_error() {
    assert_eq!(format_log_lines(&[]), vec!["no update runs recorded"]);

    let entry = UpdateLogEntry {
        run_id: "run-100-1".to_string(),
        started_at_unix: 100,
        finished_at_unix: Some(160),
        outcome: UpdateOutcome::RolledBack,
        version_before: "aaaaaaaaaaaaaaaaaaaa".to_string(),
        version_after: None,
        failed_step: Some(UpdateStep::Migrate),
        error: Some("migration-failed: exit 1\nsee output".to_string()),
        no_op: false,
    };
    let lines = format_log_lines(&[entry]);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("run-100-1 rolled_back"));
    assert!(lines[0].contains("failed_step=migrate"));
    assert!(lines[1].contains("migration-failed"));
    assert!(!lines[1].contains('\n'));
}

#[test]
fn backup_lines_distinguish_missing_and_skipped_artifacts() {
    let record = BackupRecord {
        backup_id: "bak-100-1".to_string(),
        created_at_unix: 100,
        files_path: "/data/backups/bak-100-1/files".to_string(),
        db_dump_path: Some("/data/backups/bak-100-1/db.sql".to_string()),
        db_dump_sha256: Some("deadbeef".to_string()),
        size_bytes: 2_048,
        commit: "aaaaaaaaaaaaaaaaaaaa".to_string(),
        run_id: "run-100-1".to_string(),
    };

    let lines = format_backup_lines(&[BackupListing {
        record: record.clone(),
        files_present: true,
        db_dump_present: false,
    }]);
    assert!(lines[0].contains("files=present"));
    assert!(lines[0].contains("db-dump=missing"));

    let mut skipped = record;
    skipped.db_dump_path = None;
    let lines = format_backup_lines(&[BackupListing {
        record: skipped,
        files_present: false,
        db_dump_present: false,
    }]);
    assert!(lines[0].contains("files=missing"));
    assert!(lines[0].contains("db-dump=skipped"));

    assert_eq!(format_backup_lines(&[]), vec!["no backups recorded"]);
}

#[test]
fn run_report_lines_cover_success_rollback_and_no_op() {
    let mut report = RunReport {
        run_id: "run-100-1".to_string(),
        outcome: UpdateOutcome::Succeeded,
        failed_step: None,
        error: None,
        version_before: "aaaaaaaaaaaaaaaaaaaa".to_string(),
        version_after: Some("bbbbbbbbbbbbbbbbbbbb".to_string()),
        backup_id: Some("bak-100-1".to_string()),
        restore: RestoreDisposition::NotAttempted,
        no_op: false,
    };
    let lines = format_run_report_lines(&report);
    assert!(lines[0].contains("update succeeded"));
    assert!(lines.iter().any(|line| line.contains("backup: bak-100-1")));

    report.no_op = true;
    let lines = format_run_report_lines(&report);
    assert!(lines[0].contains("already up to date"));

    report.no_op = false;
    report.outcome = UpdateOutcome::RolledBack;
    report.failed_step = Some(UpdateStep::Migrate);
    report.error = Some("migration-failed: exit 1".to_string());
    report.restore = RestoreDisposition::Restored;
    let lines = format_run_report_lines(&report);
    assert!(lines[0].contains("rolled back"));
    assert!(lines[0].contains("migrate"));
    assert!(lines.iter().any(|line| line.contains("restore: restored")));
    assert!(lines.iter().any(|line| line.contains("migration-failed")));
}

#[test]
fn status_lines_degrade_field_by_field() {
    let status = StatusReport {
        version: None,
        uptime_secs: None,
        lock_held: true,
        prereqs: PrereqReport {
            git_available: true,
            inside_work_tree: false,
            supervisor_available: true,
            db_dump_tool_available: false,
        },
        last_run: None,
    };
    let lines = format_status_lines(&status);
    assert_eq!(lines[0], "version: unknown");
    assert_eq!(lines[1], "uptime: unknown");
    assert_eq!(lines[2], "update lock: held");
    assert!(lines[3].contains("git=yes"));
    assert!(lines[3].contains("work-tree=no"));
    assert!(lines[3].contains("db-dump=no"));
    assert_eq!(lines[4], "last run: none");
}

#[test]
fn plain_status_lines_have_no_escape_codes() {
    let line = render_status_line(OutputStyle::Plain, "run", "starting guarded update");
    assert_eq!(line, "[run] starting guarded update");
}
