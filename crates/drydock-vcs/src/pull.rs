use std::path::Path;

use anyhow::{Context, Result};

use crate::git::{run_git, validate_commit_hash};

pub fn fast_forward(repo_root: &Path, commit_hash: &str) -> Result<()> {
    let commit_hash = validate_commit_hash(commit_hash)?;
    run_git(repo_root, &["merge", "--ff-only", &commit_hash])
        .with_context(|| format!("pull-failed: could not fast-forward to {commit_hash}"))
}
