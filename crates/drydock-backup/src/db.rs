use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn sha256_hex_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("failed to open {} for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed hashing {}", path.display()))?;
    Ok(hex::encode(hasher.finalize()))
}

pub(crate) fn dump_database_to(command_line: &[String], dump_path: &Path) -> Result<()> {
    let (program, args) = split_command_line(command_line)?;
    let dump_file = fs::File::create(dump_path)
        .with_context(|| format!("failed creating database dump file: {}", dump_path.display()))?;

    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::from(dump_file))
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed launching database dump tool '{program}'"))?;
    if !output.status.success() {
        anyhow::bail!(
            "database dump '{program}' failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

pub(crate) fn restore_database_from(command_line: &[String], dump_path: &Path) -> Result<()> {
    let (program, args) = split_command_line(command_line)?;
    let dump_file = fs::File::open(dump_path)
        .with_context(|| format!("failed opening database dump file: {}", dump_path.display()))?;

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::from(dump_file))
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed launching database restore tool '{program}'"))?;
    if !output.status.success() {
        anyhow::bail!(
            "database restore '{program}' failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

pub(crate) fn split_command_line(command_line: &[String]) -> Result<(&String, &[String])> {
    let Some((program, args)) = command_line.split_first() else {
        return Err(anyhow!("empty command line"));
    };
    Ok((program, args))
}
