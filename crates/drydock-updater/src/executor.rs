use anyhow::Result;

use drydock_backup::{create_backup, restore_backup};
use drydock_core::{
    current_unix_timestamp, mint_run_id, BackupRecord, RestoreDisposition, RestoreOutcome,
    RunReport, SiteLayout, UpdateConfig, UpdateLogEntry, UpdateOutcome, UpdateStep,
};
use drydock_state::{acquire_lock, release_lock, write_run_entry};
use drydock_vcs::{check_remote, current_version_info, fast_forward};

use crate::external::run_step_command;
use crate::prereqs::collect_prereqs;

pub fn run_update(layout: &SiteLayout, config: &UpdateConfig) -> Result<RunReport> {
    config.require_repo_url()?;
    layout.ensure_base_dirs()?;

    let started_at_unix = current_unix_timestamp();
    let run_id = mint_run_id(started_at_unix);
    let lock = acquire_lock(layout, &run_id, config.lock_ttl_secs)?;

    let version_before = current_version_info(layout.site_root())
        .map(|version| version.commit)
        .unwrap_or_else(|_| "unknown".to_string());

    let mut entry = UpdateLogEntry {
        run_id: run_id.clone(),
        started_at_unix,
        finished_at_unix: None,
        outcome: UpdateOutcome::Running,
        version_before: version_before.clone(),
        version_after: None,
        failed_step: None,
        error: None,
        no_op: false,
    };
    if let Err(err) = write_run_entry(layout, &entry) {
        let _ = release_lock(layout, &lock);
        return Err(err);
    }

    let steps = execute_steps(layout, config, &run_id, &version_before);

    entry.finished_at_unix = Some(current_unix_timestamp());
    entry.outcome = steps.outcome;
    entry.version_after = steps.version_after.clone();
    entry.failed_step = steps.failed_step;
    entry.error = steps.error.clone();
    entry.no_op = steps.no_op;

    let log_result = write_run_entry(layout, &entry);
    let release_result = release_lock(layout, &lock);
    log_result?;
    release_result?;

    Ok(RunReport {
        run_id,
        outcome: steps.outcome,
        failed_step: steps.failed_step,
        error: steps.error,
        version_before,
        version_after: steps.version_after,
        backup_id: steps.backup_id,
        restore: steps.restore,
        no_op: steps.no_op,
    })
}

struct StepsOutcome {
    outcome: UpdateOutcome,
    failed_step: Option<UpdateStep>,
    error: Option<String>,
    version_after: Option<String>,
    backup_id: Option<String>,
    restore: RestoreDisposition,
    no_op: bool,
}

fn execute_steps(
    layout: &SiteLayout,
    config: &UpdateConfig,
    run_id: &str,
    version_before: &str,
) -> StepsOutcome {
    let prereqs = collect_prereqs(layout, config);
    let missing = prereqs.hard_failures();
    if !missing.is_empty() {
        return failure(
            layout,
            config,
            None,
            UpdateStep::Prereqs,
            format!("prereq-missing: {}", missing.join(", ")),
        );
    }

    let backup = match create_backup(
        layout,
        config,
        run_id,
        version_before,
        prereqs.db_dump_tool_available,
    ) {
        Ok(backup) => backup,
        Err(err) => {
            return failure(layout, config, None, UpdateStep::Backup, format!("{err:#}"));
        }
    };
    let backup_id = Some(backup.backup_id.clone());

    let diff = match check_remote(layout.site_root(), &config.repo_url, &config.branch) {
        Ok(diff) => diff,
        Err(err) => {
            return failure(
                layout,
                config,
                Some(&backup),
                UpdateStep::Pull,
                format!("{err:#}"),
            );
        }
    };

    if diff.ahead == 0 {
        return StepsOutcome {
            outcome: UpdateOutcome::Succeeded,
            failed_step: None,
            error: None,
            version_after: Some(version_before.to_string()),
            backup_id,
            restore: RestoreDisposition::NotAttempted,
            no_op: true,
        };
    }

    if let Err(err) = fast_forward(layout.site_root(), &diff.latest_remote_hash) {
        return failure(
            layout,
            config,
            Some(&backup),
            UpdateStep::Pull,
            format!("{err:#}"),
        );
    }

    if let Err(err) = run_step_command(&config.migrate_command_line(), layout.site_root()) {
        return failure(
            layout,
            config,
            Some(&backup),
            UpdateStep::Migrate,
            format!("migration-failed: {err:#}"),
        );
    }

    if let Err(err) = run_step_command(&config.restart_command_line(), layout.site_root()) {
        return failure(
            layout,
            config,
            Some(&backup),
            UpdateStep::Restart,
            format!("restart-failed: {err:#}"),
        );
    }

    let version_after = current_version_info(layout.site_root())
        .map(|version| version.commit)
        .unwrap_or_else(|_| diff.latest_remote_hash.clone());

    StepsOutcome {
        outcome: UpdateOutcome::Succeeded,
        failed_step: None,
        error: None,
        version_after: Some(version_after),
        backup_id,
        restore: RestoreDisposition::NotAttempted,
        no_op: false,
    }
}

fn failure(
    layout: &SiteLayout,
    config: &UpdateConfig,
    backup: Option<&BackupRecord>,
    step: UpdateStep,
    error: String,
) -> StepsOutcome {
    let backup_id = backup.map(|record| record.backup_id.clone());

    let (outcome, restore, error) = match backup {
        Some(record) if step.rolls_back_on_failure() => {
            let (outcome, restore, restore_error) =
                outcome_after_restore(restore_backup(layout, config, record));
            let error = match restore_error {
                Some(restore_error) => format!("{error}; {restore_error}"),
                None => error,
            };
            (outcome, restore, error)
        }
        _ => (UpdateOutcome::Failed, RestoreDisposition::NotAttempted, error),
    };

    StepsOutcome {
        outcome,
        failed_step: Some(step),
        error: Some(error),
        version_after: None,
        backup_id,
        restore,
        no_op: false,
    }
}

pub(crate) fn outcome_after_restore(
    result: Result<RestoreOutcome>,
) -> (UpdateOutcome, RestoreDisposition, Option<String>) {
    match result {
        Ok(RestoreOutcome::Full) => (UpdateOutcome::RolledBack, RestoreDisposition::Restored, None),
        Ok(RestoreOutcome::Partial { db_error }) => (
            UpdateOutcome::Failed,
            RestoreDisposition::Partial,
            Some(db_error),
        ),
        Err(err) => (
            UpdateOutcome::Failed,
            RestoreDisposition::Failed,
            Some(format!("restore-failed: {err:#}")),
        ),
    }
}
