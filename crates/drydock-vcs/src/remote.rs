use std::path::Path;

use anyhow::{Context, Result};
use drydock_core::{CommitSummary, RemoteDiff};

use crate::git::{base_git_command, git_stdout, validate_commit_hash};

const LOG_FIELD_SEPARATOR: char = '\u{1f}';

pub fn check_remote(repo_root: &Path, repo_url: &str, branch: &str) -> Result<RemoteDiff> {
    fetch_remote_ref(repo_root, repo_url, branch)?;

    let ahead = git_stdout(repo_root, &["rev-list", "--count", "HEAD..FETCH_HEAD"])
        .context("failed counting commits behind remote")?
        .parse::<u64>()
        .context("git rev-list --count produced a non-numeric value")?;

    let latest_remote_hash = validate_commit_hash(
        &git_stdout(repo_root, &["rev-parse", "FETCH_HEAD"])
            .context("failed resolving fetched remote tip")?,
    )?;

    let commits = if ahead == 0 {
        Vec::new()
    } else {
        let raw = git_stdout(
            repo_root,
            &[
                "log",
                "--format=%H\u{1f}%an\u{1f}%cI\u{1f}%s",
                "HEAD..FETCH_HEAD",
            ],
        )
        .context("failed listing fetched remote commits")?;
        parse_commit_log(&raw)?
    };

    Ok(RemoteDiff {
        ahead,
        commits,
        latest_remote_hash,
    })
}

pub(crate) fn fetch_remote_ref(repo_root: &Path, repo_url: &str, branch: &str) -> Result<()> {
    let output = base_git_command()
        .arg("fetch")
        .arg("--")
        .arg(repo_url)
        .arg(branch)
        .current_dir(repo_root)
        .output()
        .with_context(|| format!("remote-unreachable: failed launching git fetch for {repo_url}"))?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if branch_is_missing(stderr) {
        anyhow::bail!("invalid-ref: branch '{branch}' does not exist at {repo_url}: {stderr}");
    }
    anyhow::bail!("remote-unreachable: git fetch from {repo_url} failed: {stderr}");
}

pub(crate) fn parse_commit_log(raw: &str) -> Result<Vec<CommitSummary>> {
    let mut commits = Vec::new();
    for line in raw.lines().filter(|line| !line.trim().is_empty()) {
        let fields: Vec<&str> = line.splitn(4, LOG_FIELD_SEPARATOR).collect();
        if fields.len() != 4 {
            anyhow::bail!("unexpected git log line: '{line}'");
        }
        commits.push(CommitSummary {
            hash: validate_commit_hash(fields[0])?,
            author: fields[1].to_string(),
            date: fields[2].to_string(),
            subject: fields[3].to_string(),
        });
    }
    Ok(commits)
}

pub(crate) fn branch_is_missing(stderr: &str) -> bool {
    let lowered = stderr.to_ascii_lowercase();
    lowered.contains("couldn't find remote ref")
        || lowered.contains("could not find remote ref")
        || lowered.contains("remote branch") && lowered.contains("not found")
}
