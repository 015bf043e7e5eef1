//! Configuration management for the automaton simulator

pub mod settings;

pub use settings::{
    CliOverrides, FilesConfig, GridConfig, OutputConfig, OutputFormat, Settings, SimulationConfig,
    DEFAULT_GRID_SIZE,
};
