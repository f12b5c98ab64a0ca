use std::{fmt, process::ExitStatus};

use serde::Serialize;
use thiserror::Error;

use crate::process::exit_code;

/// Child processes the runner launches, in the order it launches them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Build,
    Solution,
    Tester,
    Visualizer,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Build => "build",
            Step::Solution => "solution",
            Step::Tester => "tester",
            Step::Visualizer => "visualizer",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A child process exited unsuccessfully.
#[derive(Debug, Error)]
#[error("{step} step failed: {program} exited with {status}")]
pub struct StepFailure {
    pub step: Step,
    pub program: String,
    pub status: ExitStatus,
}

impl StepFailure {
    pub fn exit_code(&self) -> i32 {
        exit_code(self.status)
    }
}
