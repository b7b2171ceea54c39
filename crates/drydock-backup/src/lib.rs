use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use drydock_core::{
    current_unix_timestamp, unique_suffix, BackupRecord, RestoreOutcome, SiteLayout, UpdateConfig,
};
use drydock_state::write_backup_record;

mod db;
mod fs_snapshot;

pub use db::{sha256_hex, sha256_hex_file};

use db::{dump_database_to, restore_database_from};
use fs_snapshot::{copy_tree, copy_tree_excluding, tree_size_bytes};

#[derive(Debug, Serialize, Deserialize)]
struct BackupMetaFile {
    version: u32,
    backup_id: String,
    created_at_unix: u64,
    commit: String,
    run_id: String,
    status: String,
}

pub fn create_backup(
    layout: &SiteLayout,
    config: &UpdateConfig,
    run_id: &str,
    commit: &str,
    with_db_dump: bool,
) -> Result<BackupRecord> {
    let created_at_unix = current_unix_timestamp();
    let backup_id = format!("bak-{created_at_unix}-{}", unique_suffix());
    let artifact_dir = layout.backup_artifact_dir(&backup_id);
    let files_dir = layout.backup_files_dir(&backup_id);

    if let Err(err) = copy_tree_excluding(layout.site_root(), &files_dir, &[layout.data_root()])
        .with_context(|| {
            format!(
                "backup-failed(files): could not snapshot {}",
                layout.site_root().display()
            )
        })
    {
        let _ = fs::remove_dir_all(&artifact_dir);
        return Err(err);
    }

    let mut db_dump_path = None;
    let mut db_dump_sha256 = None;
    if with_db_dump {
        let dump_path = layout.backup_db_dump_path(&backup_id);
        let dump_result = dump_database_to(&config.dump_command(), &dump_path)
            .and_then(|_| sha256_hex_file(&dump_path))
            .context("backup-failed(db-dump): could not dump database");
        match dump_result {
            Ok(digest) => {
                db_dump_path = Some(dump_path.display().to_string());
                db_dump_sha256 = Some(digest);
            }
            Err(err) => {
                let _ = fs::remove_dir_all(&artifact_dir);
                return Err(err);
            }
        }
    }

    let size_bytes = tree_size_bytes(&artifact_dir).unwrap_or(0);
    let record = BackupRecord {
        backup_id: backup_id.clone(),
        created_at_unix,
        files_path: files_dir.display().to_string(),
        db_dump_path,
        db_dump_sha256,
        size_bytes,
        commit: commit.to_string(),
        run_id: run_id.to_string(),
    };

    let finalize_result = write_backup_meta(layout, &record)
        .and_then(|_| write_backup_record(layout, &record).map(|_| ()))
        .context("backup-failed(record): could not persist backup record");
    if let Err(err) = finalize_result {
        let _ = fs::remove_dir_all(&artifact_dir);
        return Err(err);
    }

    Ok(record)
}

pub fn restore_backup(
    layout: &SiteLayout,
    config: &UpdateConfig,
    record: &BackupRecord,
) -> Result<RestoreOutcome> {
    restore_file_tree(layout, record)?;

    let Some(dump_path) = record.db_dump_path.as_deref() else {
        return Ok(RestoreOutcome::Full);
    };

    let dump_path = Path::new(dump_path);
    if !dump_path.exists() {
        return Ok(RestoreOutcome::Partial {
            db_error: format!(
                "partial-restore: database dump is missing: {}",
                dump_path.display()
            ),
        });
    }

    if let Some(expected) = record.db_dump_sha256.as_deref() {
        match sha256_hex_file(dump_path) {
            Ok(actual) if actual.eq_ignore_ascii_case(expected) => {}
            Ok(actual) => {
                return Ok(RestoreOutcome::Partial {
                    db_error: format!(
                        "partial-restore: database dump checksum mismatch: expected {expected}, got {actual}"
                    ),
                });
            }
            Err(err) => {
                return Ok(RestoreOutcome::Partial {
                    db_error: format!("partial-restore: could not hash database dump: {err:#}"),
                });
            }
        }
    }

    match restore_database_from(&config.restore_command(), dump_path) {
        Ok(()) => Ok(RestoreOutcome::Full),
        Err(err) => Ok(RestoreOutcome::Partial {
            db_error: format!("partial-restore: database reload failed: {err:#}"),
        }),
    }
}

fn restore_file_tree(layout: &SiteLayout, record: &BackupRecord) -> Result<()> {
    let backup_files = Path::new(&record.files_path);
    if !backup_files.is_dir() {
        anyhow::bail!(
            "restore-failed(files): backup files are missing: {}",
            backup_files.display()
        );
    }

    let staging = layout.staging_dir();
    fs::create_dir_all(&staging)
        .with_context(|| format!("failed to create {}", staging.display()))?;
    let displaced = staging.join(format!("displaced-{}-{}", record.backup_id, unique_suffix()));

    let site_root = layout.site_root();
    let had_existing = site_root.exists();
    if had_existing {
        fs::rename(site_root, &displaced).with_context(|| {
            format!(
                "restore-failed(files): could not set aside current tree {}",
                site_root.display()
            )
        })?;
    }

    if let Err(err) = copy_tree(backup_files, site_root).with_context(|| {
        format!(
            "restore-failed(files): could not reinstate backup tree {}",
            backup_files.display()
        )
    }) {
        let _ = fs::remove_dir_all(site_root);
        if had_existing {
            if let Err(revert_err) = fs::rename(&displaced, site_root) {
                return Err(err.context(format!(
                    "restore-failed(files): could not put back displaced tree {}: {revert_err}",
                    displaced.display()
                )));
            }
        }
        return Err(err);
    }

    if had_existing {
        let _ = fs::remove_dir_all(&displaced);
    }
    Ok(())
}

fn write_backup_meta(layout: &SiteLayout, record: &BackupRecord) -> Result<()> {
    let meta_path = layout.backup_meta_path(&record.backup_id);
    let meta = BackupMetaFile {
        version: 1,
        backup_id: record.backup_id.clone(),
        created_at_unix: record.created_at_unix,
        commit: record.commit.clone(),
        run_id: record.run_id.clone(),
        status: "ready".to_string(),
    };
    let content = serde_json::to_string_pretty(&meta)
        .with_context(|| format!("failed serializing backup meta: {}", meta_path.display()))?;
    fs::write(&meta_path, content)
        .with_context(|| format!("failed writing backup meta: {}", meta_path.display()))
}
