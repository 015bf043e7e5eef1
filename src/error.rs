//! Error types for grids, rule tables and state files

use crate::automaton::CellState;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by grid construction and cell access
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    ZeroDimension { rows: usize, cols: usize },

    #[error("coordinates ({row}, {col}) out of bounds for {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("grid dimensions differ: expected {expected:?}, got {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("cell state {state} is invalid for an automaton with {states} states")]
    InvalidState { state: CellState, states: usize },
}

/// Errors raised while reading a `.tab` transition function file.
///
/// Everything except [`RuleFileError::Io`] means the file itself is broken and
/// the automaton cannot safely run with it.
#[derive(Debug, Error)]
pub enum RuleFileError {
    #[error("unable to open the transition function file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transition function file has no header line")]
    MissingHeader,

    #[error("line {line}: the header must be the number of states, optionally preceded by the dimension")]
    MalformedHeader { line: usize },

    #[error("line {line}: unsupported dimension {dim} (must be 2)")]
    UnsupportedDimension { line: usize, dim: i64 },

    #[error("too many states: {states} (the maximum is {max})")]
    TooManyStates { states: usize, max: usize },

    #[error("the number of states must be positive")]
    NoStates,

    #[error("line {line}: invalid token '{token}'")]
    InvalidToken { line: usize, token: String },

    #[error("line {line}: unsupported neighbourhood of {size} cells (must be 5 or 9)")]
    UnsupportedNeighborhood { line: usize, size: usize },

    #[error("line {line}: neighbourhood of {found} cells, previous rules use {expected}")]
    InconsistentNeighborhood {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: state {state} is outside [0, {states})")]
    StateOutOfRange {
        line: usize,
        state: usize,
        states: usize,
    },

    #[error("rule key has {found} cells, the table expects {expected}")]
    WrongKeyLength { expected: usize, found: usize },
}

impl RuleFileError {
    /// Whether the file could not be read at all, as opposed to being malformed
    pub fn is_io(&self) -> bool {
        matches!(self, RuleFileError::Io { .. })
    }
}

/// Errors raised while reading a `.cas` initial state file
#[derive(Debug, Error)]
pub enum StateFileError {
    #[error("unable to open the CA state file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state file contains no rows")]
    Empty,

    #[error("line {line}: invalid token '{token}'")]
    InvalidToken { line: usize, token: String },

    #[error("line {line} has {found} cells, expected {expected} (all rows must have the same length)")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("state block {height}x{width} does not fit into the {rows}x{cols} grid")]
    TooLarge {
        height: usize,
        width: usize,
        rows: usize,
        cols: usize,
    },

    #[error("line {line}: state {state} exceeds the palette of {max} colours")]
    StateOutOfRange { line: usize, state: usize, max: usize },
}
