mod config;
mod layout;
mod records;
mod time;

pub use config::UpdateConfig;
pub use layout::{default_data_root, SiteLayout};
pub use records::{
    BackupListing, BackupRecord, CommitSummary, PrereqReport, RemoteDiff, RestoreDisposition,
    RestoreOutcome, RunReport, UpdateLock, UpdateLogEntry, UpdateOutcome, UpdateStep, VersionInfo,
};
pub use time::{current_unix_timestamp, mint_run_id, unique_suffix};

#[cfg(test)]
mod tests;
