use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitStatus,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{
    error::{Step, StepFailure},
    process::exit_code,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Batch,
    Interactive,
}

impl Mode {
    pub fn from_flag(interactive: bool) -> Self {
        if interactive {
            Mode::Interactive
        } else {
            Mode::Batch
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StepRecord {
    pub step: Step,
    pub command: String,
    pub duration_ms: u128,
    pub exit_code: i32,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct FailureRecord {
    pub step: Step,
    pub message: String,
    pub exit_code: i32,
}

/// Everything one seed run did, written as JSON when `--summary` is given.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub seed: u32,
    pub contest: String,
    pub mode: Mode,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub input: PathBuf,
    pub output: PathBuf,
    pub error_log: PathBuf,
    pub steps: Vec<StepRecord>,
    pub stderr_lines: usize,
    pub failure: Option<FailureRecord>,
}

impl RunReport {
    pub fn new(
        seed: u32,
        contest: &str,
        mode: Mode,
        input: PathBuf,
        output: PathBuf,
        error_log: PathBuf,
    ) -> Self {
        Self {
            seed,
            contest: contest.to_string(),
            mode,
            started_at: Local::now(),
            finished_at: None,
            input,
            output,
            error_log,
            steps: Vec::new(),
            stderr_lines: 0,
            failure: None,
        }
    }

    pub fn record_step(&mut self, step: Step, command: String, duration_ms: u128, status: ExitStatus) {
        self.steps.push(StepRecord {
            step,
            command,
            duration_ms,
            exit_code: exit_code(status),
            success: status.success(),
        });
    }

    pub fn fail(&mut self, failure: &StepFailure) {
        self.failure = Some(FailureRecord {
            step: failure.step,
            message: failure.to_string(),
            exit_code: failure.exit_code(),
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Zero on success, otherwise the failing child's code.
    pub fn exit_code(&self) -> i32 {
        self.failure.as_ref().map_or(0, |failure| failure.exit_code)
    }

    pub fn step(&self, step: Step) -> Option<&StepRecord> {
        self.steps.iter().find(|record| record.step == step)
    }

    pub fn write_summary(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("failed to write summary {}", path.display()))
    }
}
