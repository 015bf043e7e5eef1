//! Table-driven cellular automaton core

pub mod catalog;
pub mod engine;
pub mod grid;
pub mod io;
pub mod palette;
pub mod rules;

pub use catalog::{CatalogMove, RuleFileCatalog, DEFAULT_RULE_FILE};
pub use engine::{Engine, RuleSwitch};
pub use grid::{CellState, Grid, Neighborhood};
pub use io::{
    create_example_files, load_state_file, parse_state_block, save_state_file, StateBlock,
    StateLoader, StateOrigin, DEFAULT_STATE_FILE,
};
pub use palette::{Palette, Rgb, MAX_STATES};
pub use rules::RuleTable;
