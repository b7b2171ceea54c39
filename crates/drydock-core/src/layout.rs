use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    site_root: PathBuf,
    data_root: PathBuf,
}

impl SiteLayout {
    pub fn new(site_root: impl Into<PathBuf>, data_root: impl Into<PathBuf>) -> Self {
        Self {
            site_root: site_root.into(),
            data_root: data_root.into(),
        }
    }

    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn state_dir(&self) -> PathBuf {
        self.data_root.join("state")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.state_dir().join("lock")
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.state_dir().join("runs")
    }

    pub fn run_path(&self, run_id: &str) -> PathBuf {
        self.runs_dir().join(format!("{run_id}.run"))
    }

    pub fn backup_records_dir(&self) -> PathBuf {
        self.state_dir().join("backups")
    }

    pub fn backup_record_path(&self, backup_id: &str) -> PathBuf {
        self.backup_records_dir().join(format!("{backup_id}.backup"))
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.data_root.join("backups")
    }

    pub fn backup_artifact_dir(&self, backup_id: &str) -> PathBuf {
        self.backups_dir().join(backup_id)
    }

    pub fn backup_files_dir(&self, backup_id: &str) -> PathBuf {
        self.backup_artifact_dir(backup_id).join("files")
    }

    pub fn backup_db_dump_path(&self, backup_id: &str) -> PathBuf {
        self.backup_artifact_dir(backup_id).join("db.sql")
    }

    pub fn backup_meta_path(&self, backup_id: &str) -> PathBuf {
        self.backup_artifact_dir(backup_id).join("meta.json")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.data_root.join("tmp")
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        for dir in [
            self.state_dir(),
            self.runs_dir(),
            self.backup_records_dir(),
            self.backups_dir(),
            self.staging_dir(),
        ] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

pub fn default_data_root(site_root: &Path) -> PathBuf {
    match site_root.parent() {
        Some(parent) => parent.join("drydock"),
        None => site_root.join(".drydock"),
    }
}
