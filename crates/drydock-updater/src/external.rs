use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};

pub(crate) fn run_step_command(command_line: &[String], cwd: &Path) -> Result<()> {
    let Some((program, args)) = command_line.split_first() else {
        return Err(anyhow!("empty command line"));
    };

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .with_context(|| format!("failed launching '{program}'"))?;
    if output.status.success() {
        return Ok(());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(anyhow!(
        "'{}' failed: status={} stdout='{}' stderr='{}'",
        command_line.join(" "),
        output.status,
        stdout.trim(),
        stderr.trim()
    ))
}
