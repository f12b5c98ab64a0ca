//! Local single-seed runner for heuristic contest solutions.
//!
//! Builds the solution, feeds it `pahcer/in/<seed>.txt`, captures `out.txt` and
//! `err.txt`, and hands the result to the interactive tester or the visualizer.

pub mod config;
pub mod error;
pub mod logging;
pub mod process;
pub mod report;
pub mod runner;

pub use config::RunnerConfig;
pub use error::{Step, StepFailure};
pub use report::{Mode, RunReport};
pub use runner::Runner;
