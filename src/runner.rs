//! One seed, start to finish: build, relocate, run, echo stderr, judge.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
    time::Instant,
};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::{
    config::RunnerConfig,
    error::{Step, StepFailure},
    process::{describe, echo_lines, run_inherited, run_redirected},
    report::{Mode, RunReport},
};

pub struct Runner {
    workspace: PathBuf,
    config: RunnerConfig,
}

impl Runner {
    pub fn new(workspace: &Path, config: RunnerConfig) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
            config,
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::from_flag(self.config.interactive)
    }

    /// Runs `seed` and echoes the captured stderr to `out`.
    ///
    /// A child that exits unsuccessfully ends the run early and is reported through
    /// `RunReport::failure`; `Err` is reserved for problems outside the children.
    pub fn run<W: Write>(&self, seed: u32, out: &mut W) -> Result<RunReport> {
        let input = self.config.input_path(seed);
        let mut report = RunReport::new(
            seed,
            self.config.contest_name(),
            self.mode(),
            input.clone(),
            self.config.output_file.clone(),
            self.config.error_file.clone(),
        );

        let input_abs = self.workspace.join(&input);
        if !input_abs.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("input file {} not found", input_abs.display()),
            ))
            .with_context(|| format!("seed {seed} has no input"));
        }

        info!(seed, contest = self.config.contest_name(), mode = ?report.mode, "starting run");

        if let Err(failure) = self.build(&mut report)? {
            report.fail(&failure);
            report.finish();
            return Ok(report);
        }
        self.install_binary()?;

        let result = match report.mode {
            Mode::Batch => self.run_batch(&mut report, out)?,
            Mode::Interactive => self.run_interactive(&mut report, out)?,
        };
        if let Err(failure) = result {
            report.fail(&failure);
        }
        report.finish();
        Ok(report)
    }

    fn build(&self, report: &mut RunReport) -> Result<Result<(), StepFailure>> {
        let (program, args) = self
            .config
            .build_command
            .split_first()
            .context("build_command is empty")?;
        let mut command = Command::new(program);
        command.args(args).current_dir(&self.workspace);
        info!(command = %describe(&command), "building release binary");
        self.step(report, Step::Build, &mut command, run_inherited)
    }

    /// Moves the freshly built binary next to the inputs, replacing any old copy.
    fn install_binary(&self) -> Result<()> {
        let built = self.workspace.join(self.config.built_binary());
        let installed = self.workspace.join(self.config.binary_name());
        if !built.is_file() {
            bail!(
                "build succeeded but {} does not exist",
                built.display()
            );
        }
        debug!(from = %built.display(), to = %installed.display(), "moving binary");
        if let Err(err) = fs::rename(&built, &installed) {
            warn!(err = %err, "rename failed, falling back to copy");
            fs::copy(&built, &installed).with_context(|| {
                format!("failed to copy {} to {}", built.display(), installed.display())
            })?;
            fs::remove_file(&built)
                .with_context(|| format!("failed to remove {}", built.display()))?;
        }
        Ok(())
    }

    fn run_batch<W: Write>(
        &self,
        report: &mut RunReport,
        out: &mut W,
    ) -> Result<Result<(), StepFailure>> {
        let mut solution = Command::new(self.workspace.join(self.config.binary_name()));
        solution.current_dir(&self.workspace);
        let solved = self.redirected_step(report, Step::Solution, &mut solution)?;
        self.echo_stderr(report, out)?;
        if let Err(failure) = solved {
            return Ok(Err(failure));
        }

        let mut visualizer = Command::new(self.workspace.join(&self.config.visualizer));
        visualizer
            .arg(&report.input)
            .arg(&report.output)
            .current_dir(&self.workspace);
        info!(command = %describe(&visualizer), "running visualizer");
        self.step(report, Step::Visualizer, &mut visualizer, run_inherited)
    }

    /// The tester owns the solution process, so only the tester's status is judged.
    fn run_interactive<W: Write>(
        &self,
        report: &mut RunReport,
        out: &mut W,
    ) -> Result<Result<(), StepFailure>> {
        let mut tester = Command::new(self.workspace.join(&self.config.tester));
        tester
            .arg(Path::new(".").join(self.config.binary_name()))
            .current_dir(&self.workspace);
        let tested = self.redirected_step(report, Step::Tester, &mut tester)?;
        self.echo_stderr(report, out)?;
        Ok(tested)
    }

    fn redirected_step(
        &self,
        report: &mut RunReport,
        step: Step,
        command: &mut Command,
    ) -> Result<Result<(), StepFailure>> {
        let input = self.workspace.join(&report.input);
        let output = self.workspace.join(&report.output);
        let error = self.workspace.join(&report.error_log);
        info!(command = %describe(command), "running {step}");
        self.step(report, step, command, |command| {
            run_redirected(command, &input, &output, &error)
        })
    }

    fn step<F>(
        &self,
        report: &mut RunReport,
        step: Step,
        command: &mut Command,
        launch: F,
    ) -> Result<Result<(), StepFailure>>
    where
        F: FnOnce(&mut Command) -> Result<ExitStatus>,
    {
        let program = describe(command);
        let start = Instant::now();
        let status = launch(command)?;
        report.record_step(step, program.clone(), start.elapsed().as_millis(), status);

        if status.success() {
            Ok(Ok(()))
        } else {
            debug!(%step, exit_code = ?status.code(), "child exited unsuccessfully");
            Ok(Err(StepFailure {
                step,
                program,
                status,
            }))
        }
    }

    fn echo_stderr<W: Write>(&self, report: &mut RunReport, out: &mut W) -> Result<()> {
        let path = self.workspace.join(&report.error_log);
        report.stderr_lines = echo_lines(&path, out)?.len();
        Ok(())
    }
}
