use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "single-run.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Falls back to `[package].name` of the workspace `Cargo.toml`.
    pub contest_name: Option<String>,
    pub interactive: bool,
    pub build_command: Vec<String>,
    pub target_dir: PathBuf,
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    pub error_file: PathBuf,
    pub tester: PathBuf,
    pub visualizer: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            contest_name: None,
            interactive: false,
            build_command: vec!["cargo".into(), "build".into(), "--release".into()],
            target_dir: PathBuf::from("../target/release"),
            input_dir: PathBuf::from("pahcer/in"),
            output_file: PathBuf::from("out.txt"),
            error_file: PathBuf::from("err.txt"),
            tester: PathBuf::from("./tester"),
            visualizer: PathBuf::from("./vis"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CargoManifest {
    package: Option<CargoPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoPackage {
    name: String,
}

impl RunnerConfig {
    /// Loads the config at `path` (relative to `workspace`) and resolves the contest name.
    ///
    /// A missing file is only an error when the caller asked for it explicitly.
    pub fn load(workspace: &Path, path: &Path, explicit: bool) -> Result<Self> {
        let path = workspace.join(path);
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str::<RunnerConfig>(&content)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        } else if explicit {
            bail!("config file {} does not exist", path.display());
        } else {
            RunnerConfig::default()
        };

        if config.contest_name.is_none() {
            config.contest_name = Some(resolve_contest_name(workspace)?);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.contest_name();
        if name.is_empty() {
            bail!("contest name must not be empty");
        }
        if name.contains(['/', '\\']) {
            bail!("contest name {name:?} must not contain path separators");
        }
        if self.build_command.is_empty() {
            bail!("build_command must name at least a program");
        }
        Ok(())
    }

    pub fn contest_name(&self) -> &str {
        self.contest_name.as_deref().unwrap_or_default()
    }

    /// File name of the release binary on this platform.
    pub fn binary_name(&self) -> String {
        format!("{}{}", self.contest_name(), std::env::consts::EXE_SUFFIX)
    }

    pub fn input_path(&self, seed: u32) -> PathBuf {
        self.input_dir.join(format!("{seed:04}.txt"))
    }

    pub fn built_binary(&self) -> PathBuf {
        self.target_dir.join(self.binary_name())
    }
}

/// Reads `[package].name` from the workspace `Cargo.toml`.
pub fn resolve_contest_name(workspace: &Path) -> Result<String> {
    let path = workspace.join("Cargo.toml");
    let content = fs::read_to_string(&path).with_context(|| {
        format!(
            "no contest_name configured and failed to read {}",
            path.display()
        )
    })?;
    let manifest: CargoManifest = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    match manifest.package {
        Some(package) => Ok(package.name),
        None => bail!("{} has no [package] section", path.display()),
    }
}
