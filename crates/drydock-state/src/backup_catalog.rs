use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use drydock_core::{BackupListing, BackupRecord, SiteLayout};

use crate::page_slice;

pub fn write_backup_record(layout: &SiteLayout, record: &BackupRecord) -> Result<PathBuf> {
    let path = layout.backup_record_path(&record.backup_id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    fs::write(&path, serialize_backup_record(record))
        .with_context(|| format!("failed to write backup record: {}", path.display()))?;
    Ok(path)
}

pub fn read_backup_record(layout: &SiteLayout, backup_id: &str) -> Result<Option<BackupRecord>> {
    let path = layout.backup_record_path(backup_id);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read backup record: {}", path.display()));
        }
    };

    let record = parse_backup_record(&raw)
        .with_context(|| format!("failed to parse backup record: {}", path.display()))?;
    Ok(Some(record))
}

pub fn list_backups(layout: &SiteLayout) -> Result<Vec<BackupListing>> {
    let dir = layout.backup_records_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut listed = Vec::new();
    for dir_entry in fs::read_dir(&dir)
        .with_context(|| format!("failed to read backup catalog: {}", dir.display()))?
    {
        let dir_entry = dir_entry?;
        if !dir_entry.file_type()?.is_file() {
            continue;
        }

        let path = dir_entry.path();
        if path.extension().and_then(|v| v.to_str()) != Some("backup") {
            continue;
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read backup record: {}", path.display()))?;
        let record = parse_backup_record(&raw)
            .with_context(|| format!("failed to parse backup record: {}", path.display()))?;

        let files_present = path_is_present(Path::new(&record.files_path));
        let db_dump_present = record
            .db_dump_path
            .as_deref()
            .map(|dump| path_is_present(Path::new(dump)))
            .unwrap_or(false);
        listed.push(BackupListing {
            record,
            files_present,
            db_dump_present,
        });
    }

    listed.sort_by(|a, b| {
        b.record
            .created_at_unix
            .cmp(&a.record.created_at_unix)
            .then_with(|| b.record.backup_id.cmp(&a.record.backup_id))
    });
    Ok(listed)
}

pub fn page_backups(layout: &SiteLayout, page: usize, limit: usize) -> Result<Vec<BackupListing>> {
    Ok(page_slice(list_backups(layout)?, page, limit))
}

fn path_is_present(path: &Path) -> bool {
    path.exists()
}

fn serialize_backup_record(record: &BackupRecord) -> String {
    let mut payload = String::new();
    payload.push_str(&format!("backup_id={}\n", record.backup_id));
    payload.push_str(&format!("created_at_unix={}\n", record.created_at_unix));
    payload.push_str(&format!("files_path={}\n", record.files_path));
    if let Some(db_dump_path) = &record.db_dump_path {
        payload.push_str(&format!("db_dump_path={db_dump_path}\n"));
    }
    if let Some(db_dump_sha256) = &record.db_dump_sha256 {
        payload.push_str(&format!("db_dump_sha256={db_dump_sha256}\n"));
    }
    payload.push_str(&format!("size_bytes={}\n", record.size_bytes));
    payload.push_str(&format!("commit={}\n", record.commit));
    payload.push_str(&format!("run_id={}\n", record.run_id));
    payload
}

fn parse_backup_record(raw: &str) -> Result<BackupRecord> {
    let mut backup_id = None;
    let mut created_at_unix = None;
    let mut files_path = None;
    let mut db_dump_path = None;
    let mut db_dump_sha256 = None;
    let mut size_bytes = None;
    let mut commit = None;
    let mut run_id = None;

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        match k {
            "backup_id" => backup_id = Some(v.to_string()),
            "created_at_unix" => {
                created_at_unix = Some(v.parse().context("created_at_unix must be u64")?)
            }
            "files_path" => files_path = Some(v.to_string()),
            "db_dump_path" => db_dump_path = Some(v.to_string()),
            "db_dump_sha256" => db_dump_sha256 = Some(v.to_string()),
            "size_bytes" => size_bytes = Some(v.parse().context("size_bytes must be u64")?),
            "commit" => commit = Some(v.to_string()),
            "run_id" => run_id = Some(v.to_string()),
            _ => {}
        }
    }

    Ok(BackupRecord {
        backup_id: backup_id.context("missing backup_id")?,
        created_at_unix: created_at_unix.context("missing created_at_unix")?,
        files_path: files_path.context("missing files_path")?,
        db_dump_path,
        db_dump_sha256,
        size_bytes: size_bytes.context("missing size_bytes")?,
        commit: commit.context("missing commit")?,
        run_id: run_id.context("missing run_id")?,
    })
}
