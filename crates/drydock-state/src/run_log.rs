use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use drydock_core::{SiteLayout, UpdateLogEntry, UpdateOutcome, UpdateStep};

use crate::page_slice;

pub fn write_run_entry(layout: &SiteLayout, entry: &UpdateLogEntry) -> Result<PathBuf> {
    let path = layout.run_path(&entry.run_id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    fs::write(&path, serialize_run_entry(entry))
        .with_context(|| format!("failed to write run entry: {}", path.display()))?;
    Ok(path)
}

pub fn read_run_entry(layout: &SiteLayout, run_id: &str) -> Result<Option<UpdateLogEntry>> {
    let path = layout.run_path(run_id);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read run entry: {}", path.display()));
        }
    };

    let entry = parse_run_entry(&raw)
        .with_context(|| format!("failed to parse run entry: {}", path.display()))?;
    Ok(Some(entry))
}

pub fn list_run_entries(layout: &SiteLayout) -> Result<Vec<UpdateLogEntry>> {
    let dir = layout.runs_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(&dir)
        .with_context(|| format!("failed to read run log directory: {}", dir.display()))?
    {
        let dir_entry = dir_entry?;
        if !dir_entry.file_type()?.is_file() {
            continue;
        }

        let path = dir_entry.path();
        if path.extension().and_then(|v| v.to_str()) != Some("run") {
            continue;
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read run entry: {}", path.display()))?;
        let entry = parse_run_entry(&raw)
            .with_context(|| format!("failed to parse run entry: {}", path.display()))?;
        entries.push(entry);
    }

    entries.sort_by(|a, b| {
        b.started_at_unix
            .cmp(&a.started_at_unix)
            .then_with(|| b.run_id.cmp(&a.run_id))
    });
    Ok(entries)
}

pub fn page_run_entries(
    layout: &SiteLayout,
    page: usize,
    limit: usize,
) -> Result<Vec<UpdateLogEntry>> {
    Ok(page_slice(list_run_entries(layout)?, page, limit))
}

pub fn latest_run_entry(layout: &SiteLayout) -> Result<Option<UpdateLogEntry>> {
    Ok(list_run_entries(layout)?.into_iter().next())
}

pub fn running_run_entries(layout: &SiteLayout) -> Result<Vec<UpdateLogEntry>> {
    Ok(list_run_entries(layout)?
        .into_iter()
        .filter(|entry| entry.outcome == UpdateOutcome::Running)
        .collect())
}

fn serialize_run_entry(entry: &UpdateLogEntry) -> String {
    let mut payload = String::new();
    payload.push_str(&format!("run_id={}\n", entry.run_id));
    payload.push_str(&format!("started_at_unix={}\n", entry.started_at_unix));
    if let Some(finished_at_unix) = entry.finished_at_unix {
        payload.push_str(&format!("finished_at_unix={finished_at_unix}\n"));
    }
    payload.push_str(&format!("outcome={}\n", entry.outcome.as_str()));
    payload.push_str(&format!("version_before={}\n", entry.version_before));
    if let Some(version_after) = &entry.version_after {
        payload.push_str(&format!("version_after={version_after}\n"));
    }
    if let Some(failed_step) = entry.failed_step {
        payload.push_str(&format!("failed_step={}\n", failed_step.as_str()));
    }
    if let Some(error) = &entry.error {
        payload.push_str(&format!("error={}\n", escape_value(error)));
    }
    if entry.no_op {
        payload.push_str("no_op=true\n");
    }
    payload
}

fn parse_run_entry(raw: &str) -> Result<UpdateLogEntry> {
    let mut run_id = None;
    let mut started_at_unix = None;
    let mut finished_at_unix = None;
    let mut outcome = None;
    let mut version_before = None;
    let mut version_after = None;
    let mut failed_step = None;
    let mut error = None;
    let mut no_op = false;

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        match k {
            "run_id" => run_id = Some(v.to_string()),
            "started_at_unix" => {
                started_at_unix = Some(v.parse().context("started_at_unix must be u64")?)
            }
            "finished_at_unix" => {
                finished_at_unix = Some(v.parse().context("finished_at_unix must be u64")?)
            }
            "outcome" => outcome = Some(UpdateOutcome::parse(v)?),
            "version_before" => version_before = Some(v.to_string()),
            "version_after" => version_after = Some(v.to_string()),
            "failed_step" => failed_step = Some(UpdateStep::parse(v)?),
            "error" => error = Some(unescape_value(v)),
            "no_op" => no_op = v == "true",
            _ => {}
        }
    }

    Ok(UpdateLogEntry {
        run_id: run_id.context("missing run_id")?,
        started_at_unix: started_at_unix.context("missing started_at_unix")?,
        finished_at_unix,
        outcome: outcome.context("missing outcome")?,
        version_before: version_before.context("missing version_before")?,
        version_after,
        failed_step,
        error,
        no_op,
    })
}

fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}

fn unescape_value(value: &str) -> String {
    let mut out = String::new();
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
