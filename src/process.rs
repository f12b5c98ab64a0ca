//! Blocking child process helpers with file-backed stdio.

use std::{
    fs::{self, File},
    io::Write,
    path::Path,
    process::{Command, ExitStatus, Stdio},
};

use anyhow::{Context, Result};
use tracing::debug;

/// Runs `command` to completion with stdin read from `input` and stdout/stderr
/// written to freshly truncated `output` and `error` files.
pub fn run_redirected(
    command: &mut Command,
    input: &Path,
    output: &Path,
    error: &Path,
) -> Result<ExitStatus> {
    let stdin = File::open(input)
        .with_context(|| format!("failed to open input {}", input.display()))?;
    let stdout = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let stderr = File::create(error)
        .with_context(|| format!("failed to create {}", error.display()))?;

    command
        .stdin(Stdio::from(stdin))
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));

    debug!(program = ?command.get_program(), "spawning redirected child");
    let status = command
        .status()
        .with_context(|| format!("failed to run {}", describe(command)))?;
    debug!(exit_code = ?status.code(), "child finished");
    Ok(status)
}

/// Runs `command` sharing this process's stdio.
pub fn run_inherited(command: &mut Command) -> Result<ExitStatus> {
    debug!(program = ?command.get_program(), "spawning child");
    let status = command
        .status()
        .with_context(|| format!("failed to run {}", describe(command)))?;
    debug!(exit_code = ?status.code(), "child finished");
    Ok(status)
}

/// Copies every line of `path` to `out` with trailing whitespace removed.
pub fn echo_lines<W: Write>(path: &Path, out: &mut W) -> Result<Vec<String>> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let content = String::from_utf8_lossy(&bytes);
    let mut lines = Vec::new();
    for line in content.lines() {
        let line = line.trim_end();
        writeln!(out, "{line}")?;
        lines.push(line.to_string());
    }
    out.flush()?;
    Ok(lines)
}

/// Exit code to hand back to our own caller for a child's status.
///
/// Signal deaths map to `128 + signal` like a shell does.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Program and arguments joined for messages.
pub fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
