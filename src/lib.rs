//! Table-driven 2-D cellular automaton simulator
//!
//! The transition function is not hard-coded: it is read at runtime from
//! `.tab` files mapping a neighbourhood configuration to the next state.
//! Initial states come from `.cas` files centred onto a toroidal grid.

pub mod automaton;
pub mod config;
pub mod error;
pub mod session;
pub mod utils;

pub use automaton::{Engine, Grid, Neighborhood, RuleFileCatalog, RuleSwitch, RuleTable};
pub use config::Settings;
pub use error::{GridError, RuleFileError, StateFileError};

use anyhow::Result;

/// Build an engine from settings and advance it by the configured number of steps
pub fn simulate(settings: &Settings) -> Result<Engine> {
    let mut engine = Engine::bootstrap(settings)?;
    engine.steps(settings.simulation.steps);
    Ok(engine)
}
