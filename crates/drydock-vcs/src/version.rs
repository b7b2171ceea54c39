use std::path::Path;

use anyhow::Result;
use drydock_core::VersionInfo;
use semver::Version;

use crate::git::{git_stdout, validate_commit_hash};

pub fn current_version_info(repo_root: &Path) -> Result<VersionInfo> {
    let commit = validate_commit_hash(&git_stdout(repo_root, &["rev-parse", "HEAD"])?)?;
    let commit_date = git_stdout(repo_root, &["log", "-1", "--format=%cI"])?;
    let branch = git_stdout(repo_root, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    let semantic = git_stdout(repo_root, &["describe", "--tags", "--abbrev=0"])
        .ok()
        .and_then(|tag| parse_version_tag(&tag));

    Ok(VersionInfo {
        commit,
        commit_date,
        branch,
        semantic,
    })
}

pub(crate) fn parse_version_tag(tag: &str) -> Option<Version> {
    Version::parse(tag.trim().trim_start_matches('v')).ok()
}
