use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use drydock_core::{current_unix_timestamp, SiteLayout, UpdateLock, UpdateOutcome};

use crate::run_log::{running_run_entries, write_run_entry};

pub fn acquire_lock(layout: &SiteLayout, run_id: &str, ttl_secs: u64) -> Result<UpdateLock> {
    clean_stale_locks(layout, ttl_secs)?;

    let path = layout.lock_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let lock = UpdateLock {
        run_id: run_id.to_string(),
        acquired_at_unix: current_unix_timestamp(),
        ttl_secs,
    };

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            let holder = read_lock(layout)
                .ok()
                .flatten()
                .map(|existing| format!(" (held by {})", existing.run_id))
                .unwrap_or_default();
            return Err(anyhow!("update-in-progress: update lock exists{holder}"));
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to claim update lock: {}", path.display()));
        }
    };

    file.write_all(serialize_lock(&lock).as_bytes())
        .with_context(|| format!("failed to write update lock: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("failed to flush update lock: {}", path.display()))?;

    Ok(lock)
}

pub fn release_lock(layout: &SiteLayout, lock: &UpdateLock) -> Result<()> {
    let path = layout.lock_path();
    let current = read_lock(layout).ok().flatten();

    let Some(current) = current else {
        remove_lock_file(&path)?;
        return Ok(());
    };

    if current.run_id != lock.run_id {
        return Ok(());
    }

    remove_lock_file(&path)?;
    Ok(())
}

pub fn lock_is_held(layout: &SiteLayout) -> bool {
    layout.lock_path().exists()
}

pub fn read_lock(layout: &SiteLayout) -> Result<Option<UpdateLock>> {
    let path = layout.lock_path();
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read update lock: {}", path.display()));
        }
    };

    let lock = parse_lock(&raw)
        .with_context(|| format!("failed to parse update lock: {}", path.display()))?;
    Ok(Some(lock))
}

pub fn clean_stale_locks(layout: &SiteLayout, ttl_secs: u64) -> Result<usize> {
    let path = layout.lock_path();
    let now = current_unix_timestamp();
    let mut removed = 0_usize;

    match read_lock(layout) {
        Ok(Some(lock)) => {
            let age = now.saturating_sub(lock.acquired_at_unix);
            if age > ttl_secs && remove_lock_file(&path)? {
                removed += 1;
            }
        }
        Ok(None) => {}
        Err(_) => {
            if remove_lock_file(&path)? {
                removed += 1;
            }
        }
    }

    if !path.exists() {
        finalize_abandoned_runs(layout, now)?;
    }

    Ok(removed)
}

fn finalize_abandoned_runs(layout: &SiteLayout, now: u64) -> Result<()> {
    for mut entry in running_run_entries(layout)? {
        entry.outcome = UpdateOutcome::Failed;
        entry.finished_at_unix = Some(now);
        entry.error = Some("stale-lock-reclaimed: run abandoned by its holder".to_string());
        write_run_entry(layout, &entry)?;
    }
    Ok(())
}

fn remove_lock_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => {
            Err(err).with_context(|| format!("failed to remove update lock: {}", path.display()))
        }
    }
}

fn serialize_lock(lock: &UpdateLock) -> String {
    let mut payload = String::new();
    payload.push_str(&format!("run_id={}\n", lock.run_id));
    payload.push_str(&format!("acquired_at_unix={}\n", lock.acquired_at_unix));
    payload.push_str(&format!("ttl_secs={}\n", lock.ttl_secs));
    payload
}

fn parse_lock(raw: &str) -> Result<UpdateLock> {
    let mut run_id = None;
    let mut acquired_at_unix = None;
    let mut ttl_secs = None;

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        match k {
            "run_id" => run_id = Some(v.to_string()),
            "acquired_at_unix" => {
                acquired_at_unix = Some(v.parse().context("acquired_at_unix must be u64")?)
            }
            "ttl_secs" => ttl_secs = Some(v.parse().context("ttl_secs must be u64")?),
            _ => {}
        }
    }

    Ok(UpdateLock {
        run_id: run_id.context("missing run_id")?,
        acquired_at_unix: acquired_at_unix.context("missing acquired_at_unix")?,
        ttl_secs: ttl_secs.context("missing ttl_secs")?,
    })
}
