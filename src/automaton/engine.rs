//! The automaton engine: grid, initial snapshot, active rule table and catalog

use super::catalog::{CatalogMove, RuleFileCatalog};
use super::grid::{CellState, Grid};
use super::io::{StateBlock, StateLoader};
use super::palette::{Palette, MAX_STATES};
use super::rules::RuleTable;
use crate::config::Settings;
use crate::error::{GridError, RuleFileError, StateFileError};
use anyhow::{Context, Result};
use log::{debug, info, warn};

/// Caption used when no rule file is active
pub const UNTITLED_RULES: &str = "(no transition function)";

/// Result of a rule file switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSwitch {
    /// A new table replaced the active one
    Switched { name: String },
    /// Already at the last file; nothing changed
    EndOfCatalog,
    /// There are no rule files to switch between
    NoCatalog,
}

/// A cellular automaton driven by a lookup-table transition function
#[derive(Debug, Clone)]
pub struct Engine {
    grid: Grid,
    scratch: Grid,
    snapshot: Grid,
    rules: RuleTable,
    catalog: RuleFileCatalog,
    palette: Palette,
}

impl Engine {
    /// An all-zero engine with an empty two-state von Neumann table
    pub fn new(rows: usize, cols: usize, palette: Palette) -> Result<Self, GridError> {
        let grid = Grid::new(rows, cols)?;
        Ok(Self {
            scratch: grid.clone(),
            snapshot: grid.clone(),
            grid,
            rules: RuleTable::default(),
            catalog: RuleFileCatalog::empty(palette.max_states()),
            palette,
        })
    }

    /// Build an engine from settings: grid size, initial state, then rules.
    ///
    /// A rule file named in the settings is used directly and disables
    /// cycling. If it cannot be opened, the catalog of the working directory
    /// is used instead.
    pub fn bootstrap(settings: &Settings) -> Result<Self> {
        let palette = settings.palette.clone();
        let max_states = palette.max_states();
        let directory = &settings.files.directory;
        let mut engine = Self::new(settings.grid.rows, settings.grid.cols, palette)
            .context("Failed to create the CA grid")?;
        info!("CA size: {}x{}", settings.grid.rows, settings.grid.cols);

        let loader = StateLoader::new(directory, max_states);
        let loaded = loader
            .load(settings.files.state_file.as_deref())
            .context("Failed to load the initial CA state")?;
        if let Some(block) = loaded.block {
            engine
                .load_initial_state(&block)
                .with_context(|| format!("Failed to place the initial state from {:?}", loaded.origin))?;
        }

        if let Some(rule_file) = &settings.files.rule_file {
            let path = directory.join(rule_file);
            match RuleTable::load(&path, max_states) {
                Ok(table) => {
                    engine.set_rule_table(table)?;
                    return Ok(engine);
                }
                Err(e) if e.is_io() => {
                    warn!("Unable to open the transition function file: {}", path.display());
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Invalid transition function file: {}", path.display())
                    });
                }
            }
        }

        let catalog = RuleFileCatalog::discover(directory, max_states)?;
        if let Some(table) = catalog
            .load_current()
            .context("Invalid transition function file")?
        {
            engine.set_rule_table(table)?;
        } else {
            info!("No transition function file found, every cell keeps its state");
        }
        engine.catalog = catalog;

        Ok(engine)
    }

    /// Replace the catalog used by rule switching
    pub fn set_catalog(&mut self, catalog: RuleFileCatalog) {
        self.catalog = catalog;
    }

    /// Replace the active rule table wholesale.
    ///
    /// Tables with more states than the palette can show are rejected.
    pub fn set_rule_table(&mut self, rules: RuleTable) -> Result<(), RuleFileError> {
        let max = self.palette.max_states().min(MAX_STATES);
        if rules.states() > max {
            return Err(RuleFileError::TooManyStates {
                states: rules.states(),
                max,
            });
        }
        self.rules = rules;
        Ok(())
    }

    /// Centre `block` into a zero snapshot and restart from it
    pub fn load_initial_state(&mut self, block: &StateBlock) -> Result<(), StateFileError> {
        let mut snapshot = self.snapshot.clone();
        snapshot.fill(0);
        block.paste_centered(&mut snapshot)?;
        self.snapshot = snapshot;
        self.reset();
        Ok(())
    }

    /// Advance every cell by one synchronous generation
    pub fn step(&mut self) {
        let neighborhood = self.rules.neighborhood();

        for row in 0..self.grid.rows() {
            for col in 0..self.grid.cols() {
                let neighbors = self.grid.neighbors(row, col, neighborhood);
                let next = self.rules.next_state(&neighbors);
                self.scratch.set_unchecked(row, col, next);
            }
        }

        self.grid.copy_cells_from(&self.scratch);
        self.grid.advance_age();
    }

    /// Advance `generations` steps
    pub fn steps(&mut self, generations: usize) {
        for _ in 0..generations {
            self.step();
        }
    }

    /// Return to the initial state; the rule table is kept
    pub fn reset(&mut self) {
        self.grid.restore(&self.snapshot);
    }

    /// Set every cell to state 0
    pub fn zero_init(&mut self) {
        self.grid.zero_init();
    }

    /// Increment a cell's state, wrapping to 0 after the last state
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<CellState, GridError> {
        let current = self.grid.get(row, col).ok_or(GridError::OutOfBounds {
            row,
            col,
            rows: self.grid.rows(),
            cols: self.grid.cols(),
        })?;
        let next = ((current as usize + 1) % self.states()) as CellState;
        self.grid.set(row, col, next)?;
        Ok(next)
    }

    /// Set a cell to `state`, which must be below the table's state count
    pub fn set_cell(&mut self, row: usize, col: usize, state: CellState) -> Result<(), GridError> {
        if state as usize >= self.states() {
            return Err(GridError::InvalidState {
                state,
                states: self.states(),
            });
        }
        self.grid.set(row, col, state)
    }

    /// Move to the next rule file of the catalog
    pub fn next_rule_file(&mut self) -> Result<RuleSwitch, RuleFileError> {
        let step = self.catalog.next()?;
        self.apply_move(step)
    }

    /// Move to the previous rule file of the catalog, wrapping to the last
    pub fn prev_rule_file(&mut self) -> Result<RuleSwitch, RuleFileError> {
        let step = self.catalog.prev()?;
        self.apply_move(step)
    }

    fn apply_move(&mut self, step: CatalogMove) -> Result<RuleSwitch, RuleFileError> {
        Ok(match step {
            CatalogMove::Loaded(table) => {
                self.set_rule_table(table)?;
                let name = self.current_rule_source_name().to_string();
                debug!("Switched transition function to {}", name);
                RuleSwitch::Switched { name }
            }
            CatalogMove::EndOfCatalog => RuleSwitch::EndOfCatalog,
            CatalogMove::Empty => RuleSwitch::NoCatalog,
        })
    }

    /// Generations since the last reset
    pub fn current_generation(&self) -> u64 {
        self.grid.age()
    }

    pub fn cell_state(&self, row: usize, col: usize) -> Option<CellState> {
        self.grid.get(row, col)
    }

    /// Name of the active rule file, for captions
    pub fn current_rule_source_name(&self) -> &str {
        self.rules.source_name().unwrap_or(UNTITLED_RULES)
    }

    /// Number of states of the active rule table
    pub fn states(&self) -> usize {
        self.rules.states()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn initial_state(&self) -> &Grid {
        &self.snapshot
    }

    pub fn rule_table(&self) -> &RuleTable {
        &self.rules
    }

    pub fn catalog(&self) -> &RuleFileCatalog {
        &self.catalog
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::grid::Neighborhood;
    use crate::automaton::io::parse_state_block;

    fn engine(rows: usize, cols: usize) -> Engine {
        Engine::new(rows, cols, Palette::default()).unwrap()
    }

    fn table(states: usize, neighborhood: Neighborhood, rules: &[(&[CellState], CellState)]) -> RuleTable {
        let mut table = RuleTable::empty(states, neighborhood).unwrap();
        for (key, next) in rules {
            table.insert(key, *next).unwrap();
        }
        table
    }

    #[test]
    fn test_new_engine_defaults() {
        let engine = engine(4, 4);
        assert_eq!(engine.states(), 2);
        assert_eq!(engine.rule_table().neighborhood(), Neighborhood::VonNeumann);
        assert_eq!(engine.current_generation(), 0);
        assert_eq!(engine.current_rule_source_name(), UNTITLED_RULES);
        assert!(Engine::new(0, 4, Palette::default()).is_err());
    }

    #[test]
    fn test_west_east_rule_example() {
        let mut engine = engine(3, 3);
        engine.set_rule_table(table(2, Neighborhood::VonNeumann, &[(&[0, 1, 0, 1, 0], 1)])).unwrap();
        engine.set_cell(1, 0, 1).unwrap();
        engine.set_cell(1, 2, 1).unwrap();

        engine.step();

        assert_eq!(engine.cell_state(1, 1), Some(1));
        assert_eq!(engine.cell_state(1, 0), Some(1));
        assert_eq!(engine.cell_state(1, 2), Some(1));
        assert_eq!(engine.grid().population(), 3);
        assert_eq!(engine.current_generation(), 1);
    }

    #[test]
    fn test_unmatched_configuration_unchanged() {
        let mut engine = engine(3, 3);
        engine.set_rule_table(table(2, Neighborhood::VonNeumann, &[(&[0, 0, 0, 0, 0], 1)])).unwrap();
        // every cell sees at least one live cell or is live itself
        engine.set_cell(0, 1, 1).unwrap();
        engine.set_cell(1, 0, 1).unwrap();
        engine.set_cell(1, 2, 1).unwrap();
        engine.set_cell(2, 1, 1).unwrap();
        engine.set_cell(1, 1, 1).unwrap();
        let before = engine.grid().clone();

        engine.step();

        // corners see 0,0,0,1,1 and have no rule; the rest are live
        assert_eq!(engine.grid().cells(), before.cells());
    }

    #[test]
    fn test_fallback_single_cell() {
        let mut engine = engine(3, 3);
        engine.set_rule_table(table(2, Neighborhood::VonNeumann, &[(&[0, 0, 0, 0, 0], 1)])).unwrap();
        engine.set_cell(0, 1, 1).unwrap();

        engine.step();

        // (1, 1) had key 1,0,0,0,0: no rule, stays 0
        assert_eq!(engine.cell_state(1, 1), Some(0));
        // (2, 0) had key 0,0,0,0,0 and became 1
        assert_eq!(engine.cell_state(2, 0), Some(1));
    }

    #[test]
    fn test_step_is_synchronous() {
        // a cell becomes 1 when its West neighbour is 1; in-place updates
        // would smear the single cell along the whole row in one step
        let mut engine = engine(1, 5);
        engine.set_rule_table(table(
            2,
            Neighborhood::VonNeumann,
            &[(&[0, 1, 0, 0, 0], 1), (&[1, 0, 1, 0, 1], 0)],
        )).unwrap();
        engine.set_cell(0, 0, 1).unwrap();

        engine.step();

        assert_eq!(engine.grid().cells(), &[0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_step_determinism() {
        let state = parse_state_block("0 1 0\n1 1 0\n0 1 1\n", 16).unwrap();

        let mut first = engine(6, 6);
        first.set_rule_table(table(
            2,
            Neighborhood::Moore,
            &[(&[0, 1, 0, 1, 1, 0, 0, 1, 1], 0), (&[0, 0, 0, 0, 0, 1, 0, 1, 1], 1)],
        )).unwrap();
        first.load_initial_state(&state).unwrap();
        let mut second = first.clone();

        first.steps(7);
        second.steps(7);
        assert_eq!(first.grid(), second.grid());
    }

    #[test]
    fn test_generation_counter() {
        let mut engine = engine(4, 4);
        engine.steps(3);
        assert_eq!(engine.current_generation(), 3);
        engine.step();
        assert_eq!(engine.current_generation(), 4);

        engine.reset();
        assert_eq!(engine.current_generation(), 0);

        engine.steps(2);
        engine.zero_init();
        assert_eq!(engine.current_generation(), 0);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut engine = engine(5, 5);
        engine.set_rule_table(table(2, Neighborhood::VonNeumann, &[(&[0, 0, 0, 0, 0], 1)])).unwrap();
        let block = parse_state_block("1\n", 16).unwrap();
        engine.load_initial_state(&block).unwrap();
        assert_eq!(engine.cell_state(2, 2), Some(1));

        engine.steps(2);
        assert_ne!(engine.grid(), engine.initial_state());

        engine.reset();
        assert_eq!(engine.grid().cells(), engine.initial_state().cells());
        assert_eq!(engine.rule_table().len(), 1);
    }

    #[test]
    fn test_toggle_cell_wraps() {
        let mut engine = engine(2, 2);
        engine
            .set_rule_table(RuleTable::empty(3, Neighborhood::VonNeumann).unwrap())
            .unwrap();

        assert_eq!(engine.toggle_cell(0, 1).unwrap(), 1);
        assert_eq!(engine.toggle_cell(0, 1).unwrap(), 2);
        assert_eq!(engine.toggle_cell(0, 1).unwrap(), 0);
        assert_eq!(engine.current_generation(), 0);
        assert!(engine.toggle_cell(2, 0).is_err());
    }

    #[test]
    fn test_set_cell_validates_state() {
        let mut engine = engine(2, 2);
        assert!(matches!(
            engine.set_cell(0, 0, 2),
            Err(GridError::InvalidState { state: 2, states: 2 })
        ));
        assert!(engine.set_cell(0, 0, 1).is_ok());
    }

    #[test]
    fn test_oversized_initial_state_rejected() {
        let mut engine = engine(2, 2);
        let block = parse_state_block("1 1 1\n", 16).unwrap();
        assert!(engine.load_initial_state(&block).is_err());
        assert_eq!(engine.grid().population(), 0);
    }

    #[test]
    fn test_set_rule_table_respects_palette() {
        let palette = Palette::new(vec!["#000000".parse().unwrap(); 3]);
        let mut engine = Engine::new(2, 2, palette).unwrap();
        let wide = RuleTable::empty(4, Neighborhood::VonNeumann).unwrap();
        assert!(matches!(
            engine.set_rule_table(wide),
            Err(RuleFileError::TooManyStates { states: 4, max: 3 })
        ));
        assert_eq!(engine.states(), 2);

        engine
            .set_rule_table(RuleTable::empty(3, Neighborhood::Moore).unwrap())
            .unwrap();
        assert_eq!(engine.states(), 3);
        assert_eq!(engine.toggle_cell(0, 0).unwrap(), 1);
    }

    #[test]
    fn test_switch_without_catalog() {
        let mut engine = engine(2, 2);
        assert_eq!(engine.next_rule_file().unwrap(), RuleSwitch::NoCatalog);
        assert_eq!(engine.prev_rule_file().unwrap(), RuleSwitch::NoCatalog);
    }
}
