use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::warn;

use single_run::{Runner, RunnerConfig, config::DEFAULT_CONFIG_FILE, logging};

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            std::process::exit(1);
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "single-run",
    version,
    about = "Build a contest solution and run it on one seed"
)]
struct Cli {
    /// Seed of the input file `pahcer/in/<seed:04>.txt`.
    #[arg(short, long)]
    seed: u32,
    /// Drive the solution through `./tester` instead of running it directly.
    #[arg(long)]
    interactive: bool,
    /// Contest directory that relative paths are resolved against.
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
    /// TOML config relative to the workspace (default `single-run.toml`, optional).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write a JSON summary of the run to this path.
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let workspace = fs::canonicalize(&cli.workspace)
        .with_context(|| format!("failed to resolve workspace {}", cli.workspace.display()))?;

    let explicit = cli.config.is_some();
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = RunnerConfig::load(&workspace, &config_path, explicit)?;
    if cli.interactive {
        config.interactive = true;
    }

    let runner = Runner::new(&workspace, config);
    let report = {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let report = runner.run(cli.seed, &mut out)?;
        out.flush()?;
        report
    };

    if let Some(path) = &cli.summary {
        let path = workspace.join(path);
        if let Err(err) = report.write_summary(&path) {
            if report.succeeded() {
                return Err(err);
            }
            warn!(err = %format!("{err:#}"), "could not write summary");
        }
    }

    match &report.failure {
        None => {
            eprintln!(
                "{} seed {:04} ({:?}) -> {}",
                "done".green().bold(),
                report.seed,
                report.mode,
                report.output.display()
            );
        }
        Some(failure) => {
            eprintln!(
                "{} seed {:04}: {}",
                "failed".red().bold(),
                report.seed,
                failure.message
            );
        }
    }
    Ok(report.exit_code())
}
