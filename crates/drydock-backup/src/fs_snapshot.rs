use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub(crate) fn copy_tree(source_root: &Path, destination_root: &Path) -> Result<()> {
    copy_tree_excluding(source_root, destination_root, &[])
}

pub(crate) fn copy_tree_excluding(
    source_root: &Path,
    destination_root: &Path,
    excluded: &[&Path],
) -> Result<()> {
    if !source_root.is_dir() {
        anyhow::bail!(
            "source location is not a directory: {}",
            source_root.display()
        );
    }

    if destination_root.exists() {
        fs::remove_dir_all(destination_root).with_context(|| {
            format!(
                "failed clearing destination directory {}",
                destination_root.display()
            )
        })?;
    }
    fs::create_dir_all(destination_root).with_context(|| {
        format!(
            "failed creating destination directory {}",
            destination_root.display()
        )
    })?;

    let mut queue: VecDeque<(PathBuf, PathBuf)> = VecDeque::new();
    queue.push_back((source_root.to_path_buf(), destination_root.to_path_buf()));

    while let Some((from_dir, to_dir)) = queue.pop_front() {
        for entry in fs::read_dir(&from_dir)
            .with_context(|| format!("failed reading source directory {}", from_dir.display()))?
        {
            let entry = entry?;
            let from_path = entry.path();
            if excluded.iter().any(|skip| from_path.starts_with(skip)) {
                continue;
            }

            let to_path = to_dir.join(entry.file_name());
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                fs::create_dir_all(&to_path)
                    .with_context(|| format!("failed creating directory {}", to_path.display()))?;
                queue.push_back((from_path, to_path));
            } else if file_type.is_file() {
                fs::copy(&from_path, &to_path).with_context(|| {
                    format!(
                        "failed copying file from {} to {}",
                        from_path.display(),
                        to_path.display()
                    )
                })?;
            } else if file_type.is_symlink() {
                copy_symlink(&from_path, &to_path)?;
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from_path: &Path, to_path: &Path) -> Result<()> {
    let target = fs::read_link(from_path)
        .with_context(|| format!("failed to read symlink {}", from_path.display()))?;
    std::os::unix::fs::symlink(&target, to_path).with_context(|| {
        format!(
            "failed to create symlink {} -> {}",
            to_path.display(),
            target.display()
        )
    })
}

#[cfg(not(unix))]
fn copy_symlink(from_path: &Path, _to_path: &Path) -> Result<()> {
    anyhow::bail!("cannot copy symlink {}", from_path.display())
}

pub(crate) fn tree_size_bytes(root: &Path) -> Result<u64> {
    let mut total = 0_u64;
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(dir) = queue.pop_front() {
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("failed reading directory {}", dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            let metadata = fs::symlink_metadata(&path)
                .with_context(|| format!("failed to stat {}", path.display()))?;
            if metadata.is_dir() {
                queue.push_back(path);
            } else if metadata.is_file() {
                total += metadata.len();
            }
        }
    }

    Ok(total)
}
