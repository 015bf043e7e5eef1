//! Configuration settings for the automaton simulator

use crate::automaton::palette::{Palette, MAX_STATES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Side length of the square grid used when no size is given
pub const DEFAULT_GRID_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub grid: GridConfig,
    pub files: FilesConfig,
    pub simulation: SimulationConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub palette: Palette,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Directory searched for `.tab` files, `default.cas` and relative paths
    pub directory: PathBuf,
    /// Transition function file; disables rule cycling when set
    #[serde(default)]
    pub rule_file: Option<PathBuf>,
    /// Initial state file
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Generations computed by a headless run
    pub steps: usize,
    /// Return to the initial state before switching rule files
    pub reset_on_rule_switch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Where captured states are written
    pub capture_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    /// One character per cell, no coordinates
    Compact,
    Color,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: GridConfig {
                rows: DEFAULT_GRID_SIZE,
                cols: DEFAULT_GRID_SIZE,
            },
            files: FilesConfig {
                directory: PathBuf::from("."),
                rule_file: None,
                state_file: None,
            },
            simulation: SimulationConfig {
                steps: 1,
                reset_on_rule_switch: true,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                capture_directory: PathBuf::from("."),
            },
            palette: Palette::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            anyhow::bail!(
                "Grid dimensions must be positive, got {}x{}",
                self.grid.rows,
                self.grid.cols
            );
        }

        if self.palette.is_empty() {
            anyhow::bail!("Palette must contain at least one colour");
        }

        if self.palette.len() > MAX_STATES {
            anyhow::bail!(
                "Palette has {} colours, at most {} states are supported",
                self.palette.len(),
                MAX_STATES
            );
        }

        if !self.files.directory.is_dir() {
            anyhow::bail!(
                "Working directory does not exist: {}",
                self.files.directory.display()
            );
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(size) = cli_overrides.size {
            self.grid.rows = size;
            self.grid.cols = size;
        }
        if let Some(rows) = cli_overrides.rows {
            self.grid.rows = rows;
        }
        if let Some(cols) = cli_overrides.cols {
            self.grid.cols = cols;
        }
        if let Some(ref directory) = cli_overrides.directory {
            self.files.directory = directory.clone();
        }
        if let Some(ref rule_file) = cli_overrides.rule_file {
            self.files.rule_file = Some(rule_file.clone());
        }
        if let Some(ref state_file) = cli_overrides.state_file {
            self.files.state_file = Some(state_file.clone());
        }
        if let Some(steps) = cli_overrides.steps {
            self.simulation.steps = steps;
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub size: Option<usize>,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub directory: Option<PathBuf>,
    pub rule_file: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub steps: Option<usize>,
    pub format: Option<OutputFormat>,
}

impl CliOverrides {
    /// Classify free-form arguments the way the simulator always has: an
    /// optional leading grid size, then a `.tab` and/or a `.cas` file.
    ///
    /// Returns the arguments that were not understood.
    pub fn absorb_positional(&mut self, inputs: &[String]) -> Vec<String> {
        let mut ignored = Vec::new();
        let mut inputs = inputs.iter().peekable();

        if let Some(size) = inputs.peek().and_then(|arg| arg.parse::<usize>().ok()) {
            if size > 0 {
                self.size.get_or_insert(size);
            }
            inputs.next();
        }

        for arg in inputs {
            let path = PathBuf::from(arg);
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("tab") if self.rule_file.is_none() => self.rule_file = Some(path),
                Some("cas") if self.state_file.is_none() => self.state_file = Some(path),
                _ => ignored.push(arg.clone()),
            }
        }

        ignored
    }
}
