//! File I/O for `.cas` state files and generated example files

use super::grid::{CellState, Grid, Neighborhood};
use crate::error::StateFileError;
use anyhow::{Context, Result};
use itertools::Itertools;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// File name of the initial state used when none is given or the given one is missing
pub const DEFAULT_STATE_FILE: &str = "default.cas";

/// Rectangular block of states read from a `.cas` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateBlock {
    height: usize,
    width: usize,
    cells: Vec<CellState>,
}

impl StateBlock {
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, row: usize, col: usize) -> Option<CellState> {
        (row < self.height && col < self.width).then(|| self.cells[row * self.width + col])
    }

    /// Top-left position of the block when centred in a `rows x cols` grid
    pub fn offsets(&self, rows: usize, cols: usize) -> Result<(usize, usize), StateFileError> {
        if self.height > rows || self.width > cols {
            return Err(StateFileError::TooLarge {
                height: self.height,
                width: self.width,
                rows,
                cols,
            });
        }
        Ok(((rows - self.height) / 2, (cols - self.width) / 2))
    }

    /// Write the block into the centre of `grid`; cells outside the block keep their value
    pub fn paste_centered(&self, grid: &mut Grid) -> Result<(), StateFileError> {
        let (row_off, col_off) = self.offsets(grid.rows(), grid.cols())?;
        for (r, row) in self.cells.chunks(self.width).enumerate() {
            for (c, &state) in row.iter().enumerate() {
                grid.set_unchecked(r + row_off, c + col_off, state);
            }
        }
        Ok(())
    }
}

/// Parse `.cas` content: whitespace-separated states, one grid row per line.
///
/// Blank lines are skipped. Every row must have as many tokens as the first.
pub fn parse_state_block(content: &str, max_states: usize) -> Result<StateBlock, StateFileError> {
    let mut width = 0;
    let mut height = 0;
    let mut cells = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut found = 0;
        for token in line.split_whitespace() {
            let state = token
                .parse::<usize>()
                .map_err(|_| StateFileError::InvalidToken {
                    line: line_no,
                    token: token.to_string(),
                })?;
            if state >= max_states {
                return Err(StateFileError::StateOutOfRange {
                    line: line_no,
                    state,
                    max: max_states,
                });
            }
            cells.push(state as CellState);
            found += 1;
        }

        if height == 0 {
            width = found;
        } else if found != width {
            return Err(StateFileError::RaggedRow {
                line: line_no,
                expected: width,
                found,
            });
        }
        height += 1;
    }

    if height == 0 {
        return Err(StateFileError::Empty);
    }

    Ok(StateBlock {
        height,
        width,
        cells,
    })
}

/// Load a state block from a `.cas` file
pub fn load_state_file<P: AsRef<Path>>(path: P, max_states: usize) -> Result<StateBlock, StateFileError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| StateFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_state_block(&content, max_states)
}

/// Where an initial state came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateOrigin {
    /// The file the caller asked for
    Requested(PathBuf),
    /// `default.cas` in the working directory
    Default(PathBuf),
    /// Nothing could be opened; the grid stays all zero
    Blank,
}

/// Result of resolving the initial state
#[derive(Debug, Clone)]
pub struct LoadedState {
    pub block: Option<StateBlock>,
    pub origin: StateOrigin,
}

/// Resolves initial state files with the default-name fallback
#[derive(Debug, Clone)]
pub struct StateLoader {
    directory: PathBuf,
    max_states: usize,
}

impl StateLoader {
    pub fn new<P: Into<PathBuf>>(directory: P, max_states: usize) -> Self {
        Self {
            directory: directory.into(),
            max_states,
        }
    }

    pub fn default_path(&self) -> PathBuf {
        self.directory.join(DEFAULT_STATE_FILE)
    }

    /// Load `requested`, else `default.cas`, else nothing.
    ///
    /// Only a file that cannot be opened triggers the fallback; a file that
    /// opens but is malformed is an error.
    pub fn load(&self, requested: Option<&Path>) -> Result<LoadedState, StateFileError> {
        if let Some(requested) = requested {
            let path = self.directory.join(requested);
            match load_state_file(&path, self.max_states) {
                Ok(block) => {
                    info!("Initial state file: {}", path.display());
                    return Ok(LoadedState {
                        block: Some(block),
                        origin: StateOrigin::Requested(path),
                    });
                }
                Err(StateFileError::Io { .. }) => {
                    warn!("Unable to open the CA state file: {}", path.display());
                }
                Err(e) => return Err(e),
            }
        }

        let path = self.default_path();
        match load_state_file(&path, self.max_states) {
            Ok(block) => {
                info!("Initial state file: {}", path.display());
                Ok(LoadedState {
                    block: Some(block),
                    origin: StateOrigin::Default(path),
                })
            }
            Err(StateFileError::Io { .. }) => {
                info!("CA state file not specified, the default cell state is 0");
                Ok(LoadedState {
                    block: None,
                    origin: StateOrigin::Blank,
                })
            }
            Err(e) => Err(e),
        }
    }
}

/// Convert a grid to `.cas` text
pub fn grid_to_string(grid: &Grid) -> String {
    grid.cells()
        .chunks(grid.cols())
        .map(|row| row.iter().join(" ") + "\n")
        .collect()
}

/// Save a grid as a `.cas` file
pub fn save_state_file<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    let content = grid_to_string(grid);

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write state to file: {}", path.as_ref().display()))?;

    Ok(())
}

/// Render a complete `.tab` file for `states` and `neighborhood`, keeping
/// only the configurations where `rule` changes the centre cell.
pub fn generate_rule_table<F>(states: usize, neighborhood: Neighborhood, comment: &str, rule: F) -> String
where
    F: Fn(&[CellState]) -> CellState,
{
    let center = neighborhood.center_index();
    let mut output = format!("# {}\n2 {}\n", comment, states);

    let configurations = (0..neighborhood.size())
        .map(|_| 0..states as CellState)
        .multi_cartesian_product();
    for key in configurations {
        let next = rule(&key);
        if next != key[center] {
            output.push_str(&format!("{} {}\n", key.iter().join(" "), next));
        }
    }

    output
}

/// Conway's Game of Life on the Moore neighbourhood
pub fn life_rule(key: &[CellState]) -> CellState {
    let alive = key[4] == 1;
    let neighbors = key.iter().enumerate().filter(|&(i, &s)| i != 4 && s == 1).count();
    match (alive, neighbors) {
        (true, 2) | (true, 3) | (false, 3) => 1,
        _ => 0,
    }
}

/// XOR of the four orthogonal neighbours
pub fn parity_rule(key: &[CellState]) -> CellState {
    (key[0] ^ key[1] ^ key[3] ^ key[4]) & 1
}

/// Create example state and rule files
pub fn create_example_files<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    // Glider
    let glider = "0 1 0\n0 0 1\n1 1 1\n";
    std::fs::write(dir.join(DEFAULT_STATE_FILE), glider).context("Failed to write default.cas")?;

    // Blinker
    let blinker = "0 0 0\n1 1 1\n0 0 0\n";
    std::fs::write(dir.join("blinker.cas"), blinker).context("Failed to write blinker.cas")?;

    let life = generate_rule_table(2, Neighborhood::Moore, "Conway's Game of Life", life_rule);
    std::fs::write(dir.join("default.tab"), life).context("Failed to write default.tab")?;

    let parity = generate_rule_table(
        2,
        Neighborhood::VonNeumann,
        "XOR of the orthogonal neighbours",
        parity_rule,
    );
    std::fs::write(dir.join("parity.tab"), parity).context("Failed to write parity.tab")?;

    Ok(())
}
