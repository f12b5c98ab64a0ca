//! Throwaway contest workspaces for driving `single-run` end to end.
//!
//! Layout mirrors a real contest checkout:
//!
//! ```text
//! <tmp>/
//!   target/release/<contest>   <- produced by the stub build
//!   <contest>/                 <- the runner's workspace
//!     Cargo.toml  build.sh  solution.sh  tester  vis  pahcer/in/0000.txt
//! ```

use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};
use tempfile::TempDir;

const BUILD_SCRIPT: &str = r#"#!/bin/sh
set -e
if [ -f build_fail ]; then
    echo "error: could not compile" >&2
    exit 101
fi
mkdir -p ../target/release
cp solution.sh ../target/release/__CONTEST__
chmod +x ../target/release/__CONTEST__
"#;

pub struct Sandbox {
    _root: TempDir,
    workspace: PathBuf,
    contest: String,
}

impl Sandbox {
    /// Workspace whose stub build copies `solution.sh` into the release dir.
    pub fn new(contest: &str) -> Result<Self> {
        let root = tempfile::tempdir().context("failed to create sandbox root")?;
        let workspace = root.path().join(contest);
        fs::create_dir_all(workspace.join("pahcer").join("in"))?;

        let sandbox = Self {
            _root: root,
            workspace,
            contest: contest.to_string(),
        };
        sandbox.write(
            "Cargo.toml",
            &format!("[package]\nname = \"{contest}\"\nversion = \"0.1.0\"\nedition = \"2024\"\n"),
        )?;
        sandbox.write(
            "single-run.toml",
            "build_command = [\"sh\", \"build.sh\"]\n",
        )?;
        sandbox.write("build.sh", &BUILD_SCRIPT.replace("__CONTEST__", contest))?;
        sandbox.solution("cat")?;
        Ok(sandbox)
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn contest(&self) -> &str {
        &self.contest
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.workspace.join(relative)
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.path(relative);
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    }

    pub fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn input(&self, seed: u32, content: &str) -> Result<()> {
        self.write(&format!("pahcer/in/{seed:04}.txt"), content)
    }

    /// Body of the solution the stub build installs.
    pub fn solution(&self, body: &str) -> Result<()> {
        self.script("solution.sh", body)
    }

    pub fn tester(&self, body: &str) -> Result<()> {
        self.script("tester", body)
    }

    pub fn visualizer(&self, body: &str) -> Result<()> {
        self.script("vis", body)
    }

    /// Makes the next stub build exit with 101 like a failed `cargo build`.
    pub fn break_build(&self) -> Result<()> {
        self.write("build_fail", "")
    }

    fn script(&self, relative: &str, body: &str) -> Result<()> {
        self.write(relative, &format!("#!/bin/sh\n{body}\n"))?;
        set_executable(&self.path(relative))
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
        .with_context(|| format!("failed to chmod {}", path.display()))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Exit status plus captured stdout/stderr (UTF-8).
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}

/// Runs the command with piped stdout/stderr.
pub fn run_command(mut command: Command) -> Result<CommandOutput> {
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    let output = command
        .output()
        .context("failed to run child process")?;

    let stdout = String::from_utf8(output.stdout).context("child stdout is not valid UTF-8")?;
    let stderr = String::from_utf8(output.stderr).context("child stderr is not valid UTF-8")?;

    Ok(CommandOutput {
        status: output.status,
        stdout,
        stderr,
    })
}

/// Errors with the captured stderr unless the child exited successfully.
pub fn ensure_success(output: &CommandOutput, context: &str) -> Result<()> {
    if output.status.success() {
        Ok(())
    } else {
        Err(anyhow!(
            "{context} -> exit={:?}, stderr={}",
            output.status,
            output.stderr.trim()
        ))
    }
}
