use anyhow::{anyhow, Result};
use semver::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Running,
    Succeeded,
    Failed,
    RolledBack,
}

impl UpdateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::RolledBack => "rolled_back",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "running" => Ok(Self::Running),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "rolled_back" => Ok(Self::RolledBack),
            _ => Err(anyhow!("invalid outcome: {value}")),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStep {
    Prereqs,
    Backup,
    Pull,
    Migrate,
    Restart,
}

impl UpdateStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prereqs => "prereqs",
            Self::Backup => "backup",
            Self::Pull => "pull",
            Self::Migrate => "migrate",
            Self::Restart => "restart",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "prereqs" => Ok(Self::Prereqs),
            "backup" => Ok(Self::Backup),
            "pull" => Ok(Self::Pull),
            "migrate" => Ok(Self::Migrate),
            "restart" => Ok(Self::Restart),
            _ => Err(anyhow!("invalid step: {value}")),
        }
    }

    pub fn rolls_back_on_failure(&self) -> bool {
        matches!(self, Self::Pull | Self::Migrate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateLock {
    pub run_id: String,
    pub acquired_at_unix: u64,
    pub ttl_secs: u64,
}

impl UpdateLock {
    pub fn is_stale(&self, now_unix: u64) -> bool {
        now_unix.saturating_sub(self.acquired_at_unix) > self.ttl_secs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateLogEntry {
    pub run_id: String,
    pub started_at_unix: u64,
    pub finished_at_unix: Option<u64>,
    pub outcome: UpdateOutcome,
    pub version_before: String,
    pub version_after: Option<String>,
    pub failed_step: Option<UpdateStep>,
    pub error: Option<String>,
    pub no_op: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub backup_id: String,
    pub created_at_unix: u64,
    pub files_path: String,
    pub db_dump_path: Option<String>,
    pub db_dump_sha256: Option<String>,
    pub size_bytes: u64,
    pub commit: String,
    pub run_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupListing {
    pub record: BackupRecord,
    pub files_present: bool,
    pub db_dump_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub hash: String,
    pub author: String,
    pub date: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDiff {
    pub ahead: u64,
    pub commits: Vec<CommitSummary>,
    pub latest_remote_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub commit: String,
    pub commit_date: String,
    pub branch: String,
    pub semantic: Option<Version>,
}

impl VersionInfo {
    pub fn short_commit(&self) -> &str {
        let end = self.commit.len().min(12);
        &self.commit[..end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrereqReport {
    pub git_available: bool,
    pub inside_work_tree: bool,
    pub supervisor_available: bool,
    pub db_dump_tool_available: bool,
}

impl PrereqReport {
    pub fn hard_failures(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.git_available {
            missing.push("git");
        }
        if !self.inside_work_tree {
            missing.push("work-tree");
        }
        if !self.supervisor_available {
            missing.push("supervisor");
        }
        missing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreDisposition {
    NotAttempted,
    Restored,
    Partial,
    Failed,
}

impl RestoreDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAttempted => "not_attempted",
            Self::Restored => "restored",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Full,
    Partial { db_error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: String,
    pub outcome: UpdateOutcome,
    pub failed_step: Option<UpdateStep>,
    pub error: Option<String>,
    pub version_before: String,
    pub version_after: Option<String>,
    pub backup_id: Option<String>,
    pub restore: RestoreDisposition,
    pub no_op: bool,
}
