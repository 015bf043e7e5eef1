//! Line-oriented control of a running automaton.
//!
//! Each input line is one command, mirroring the simulator's keyboard
//! controls: step, reset, clear, switch rule files, edit cells, capture.

use crate::automaton::{save_state_file, Engine, RuleSwitch};
use crate::config::{OutputFormat, Settings};
use crate::utils::{ColorOutput, GridFormatter};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
Interactive control
  t            perform a single CA step
  r [N]        perform N steps (default 1)
  i            return to the initial CA state
  s            set every cell to state 0
  n / p        switch to the next / previous .tab file
  x ROW COL    increment a cell state
  c            capture the current CA state to NNN.cas
  d            show the grid
  h            show this help
  q            quit";

/// A parsed control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Step,
    Run(usize),
    Reset,
    Zero,
    NextRules,
    PrevRules,
    Toggle { row: usize, col: usize },
    Capture,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (h for help)")]
    Unknown(String),
    #[error("'{command}' needs a {argument}")]
    MissingArgument {
        command: String,
        argument: &'static str,
    },
    #[error("'{0}' is not a non-negative integer")]
    InvalidNumber(String),
}

fn number(token: &str) -> Result<usize, CommandError> {
    token
        .parse()
        .map_err(|_| CommandError::InvalidNumber(token.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().ok_or(CommandError::Empty)?;
        let mut argument = |argument: &'static str| {
            tokens
                .next()
                .ok_or_else(|| CommandError::MissingArgument {
                    command: name.to_string(),
                    argument,
                })
                .and_then(number)
        };

        Ok(match name {
            "t" | "step" => Command::Step,
            "r" | "run" => match argument("step count") {
                Ok(count) => Command::Run(count),
                Err(CommandError::MissingArgument { .. }) => Command::Run(1),
                Err(e) => return Err(e),
            },
            "i" | "reset" => Command::Reset,
            "s" | "zero" => Command::Zero,
            "n" | "next" | "down" => Command::NextRules,
            "p" | "prev" | "up" => Command::PrevRules,
            "x" | "toggle" => {
                let row = argument("row")?;
                let col = argument("column")?;
                Command::Toggle { row, col }
            }
            "c" | "capture" => Command::Capture,
            "d" | "show" => Command::Show,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        })
    }
}

/// Whether the session keeps reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// An engine plus the controller state around it
pub struct Session {
    engine: Engine,
    reset_on_rule_switch: bool,
    capture_directory: PathBuf,
    captures: usize,
    format: OutputFormat,
}

impl Session {
    pub fn new(engine: Engine, settings: &Settings) -> Self {
        Self {
            engine,
            reset_on_rule_switch: settings.simulation.reset_on_rule_switch,
            capture_directory: settings.output.capture_directory.clone(),
            captures: 0,
            format: settings.output.format,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Apply one command, writing any feedback to `out`
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Outcome> {
        match command {
            Command::Step => {
                self.engine.step();
                writeln!(out, "step {}", self.engine.current_generation())?;
            }
            Command::Run(count) => {
                self.engine.steps(count);
                writeln!(out, "step {}", self.engine.current_generation())?;
            }
            Command::Reset => {
                self.engine.reset();
                self.captures = 0;
                self.show(out)?;
            }
            Command::Zero => {
                self.engine.zero_init();
                self.captures = 0;
                self.show(out)?;
            }
            Command::NextRules | Command::PrevRules => {
                return self.switch_rules(command == Command::NextRules, out);
            }
            Command::Toggle { row, col } => match self.engine.toggle_cell(row, col) {
                Ok(state) => writeln!(out, "cell ({}, {}) -> {}", row, col, state)?,
                Err(e) => writeln!(out, "{}", ColorOutput::error(&e.to_string()))?,
            },
            Command::Capture => {
                let path = self.capture_directory.join(format!("{:03}.cas", self.captures));
                save_state_file(self.engine.grid(), &path)?;
                self.captures += 1;
                writeln!(out, "captured {}", path.display())?;
            }
            Command::Show => self.show(out)?,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Outcome::Quit),
        }
        Ok(Outcome::Continue)
    }

    fn switch_rules<W: Write>(&mut self, forward: bool, out: &mut W) -> Result<Outcome> {
        if self.engine.catalog().is_empty() {
            writeln!(out, "no .tab files to switch between")?;
            return Ok(Outcome::Continue);
        }
        if self.reset_on_rule_switch {
            self.engine.reset();
        }
        self.captures = 0;

        let switch = if forward {
            self.engine.next_rule_file()
        } else {
            self.engine.prev_rule_file()
        }
        .context("Failed to switch the transition function")?;

        match switch {
            RuleSwitch::Switched { name } => {
                writeln!(out, "transition function: {}", name)?;
                self.show(out)?;
                Ok(Outcome::Continue)
            }
            RuleSwitch::EndOfCatalog => {
                writeln!(out, "last transition function reached")?;
                Ok(Outcome::Quit)
            }
            RuleSwitch::NoCatalog => Ok(Outcome::Continue),
        }
    }

    fn show<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{}", GridFormatter::render(&self.engine, self.format)?)?;
        Ok(())
    }

    /// Read commands until `q`, end of input, or the end of the rule catalog.
    ///
    /// Malformed commands and out-of-range cells are reported and skipped.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        self.show(out)?;
        writeln!(out, "{}", HELP)?;

        for line in input.lines() {
            let line = line.context("Failed to read command")?;
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    writeln!(out, "{}", ColorOutput::error(&e.to_string()))?;
                    continue;
                }
            };
            if self.execute(command, out)? == Outcome::Quit {
                break;
            }
        }

        Ok(())
    }
}
