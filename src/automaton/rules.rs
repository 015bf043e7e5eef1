//! Transition function table and `.tab` parsing

use super::grid::{CellState, Neighborhood};
use super::palette::MAX_STATES;
use crate::error::RuleFileError;
use log::info;
use std::collections::HashMap;
use std::path::Path;

/// Pack ordered neighbour states into a lookup key.
///
/// Every state occupies one base-100 digit, so nine states fit in a `u64`
/// and keys stay unique for any state below [`MAX_STATES`].
pub fn pack_key(states: &[CellState]) -> u64 {
    states
        .iter()
        .fold(0u64, |key, &state| key * MAX_STATES as u64 + u64::from(state))
}

/// Local transition function: neighbourhood configuration to next state.
///
/// The table is sparse. A configuration without an entry keeps the centre
/// cell's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    states: usize,
    neighborhood: Neighborhood,
    rules: HashMap<u64, CellState>,
    rules_read: usize,
    source: Option<String>,
}

impl RuleTable {
    /// A table without rules: every configuration is an identity transition.
    ///
    /// `states` must lie in `1..=MAX_STATES` so that packed keys stay unique.
    pub fn empty(states: usize, neighborhood: Neighborhood) -> Result<Self, RuleFileError> {
        if states == 0 {
            return Err(RuleFileError::NoStates);
        }
        if states > MAX_STATES {
            return Err(RuleFileError::TooManyStates {
                states,
                max: MAX_STATES,
            });
        }
        Ok(Self::with_states(states, neighborhood))
    }

    fn with_states(states: usize, neighborhood: Neighborhood) -> Self {
        Self {
            states,
            neighborhood,
            rules: HashMap::new(),
            rules_read: 0,
            source: None,
        }
    }

    /// Number of cell states
    pub fn states(&self) -> usize {
        self.states
    }

    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    /// Number of distinct configurations with an explicit rule
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rule lines read, duplicates included
    pub fn rules_read(&self) -> usize {
        self.rules_read
    }

    /// Name of the file the table was loaded from
    pub fn source_name(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add a rule. A later rule for the same configuration replaces the earlier one.
    pub fn insert(&mut self, key: &[CellState], next: CellState) -> Result<(), RuleFileError> {
        if key.len() != self.neighborhood.size() {
            return Err(RuleFileError::WrongKeyLength {
                expected: self.neighborhood.size(),
                found: key.len(),
            });
        }
        let invalid = key
            .iter()
            .chain(std::iter::once(&next))
            .find(|&&s| s as usize >= self.states);
        if let Some(&state) = invalid {
            return Err(RuleFileError::StateOutOfRange {
                line: 0,
                state: state as usize,
                states: self.states,
            });
        }
        self.rules.insert(pack_key(key), next);
        self.rules_read += 1;
        Ok(())
    }

    /// Explicit rule for a configuration, if any
    pub fn get(&self, neighbors: &[CellState]) -> Option<CellState> {
        self.rules.get(&pack_key(neighbors)).copied()
    }

    /// Next state of the centre cell of `neighbors`.
    ///
    /// Falls back to the centre cell's current state when no rule matches.
    pub fn next_state(&self, neighbors: &[CellState]) -> CellState {
        self.get(neighbors)
            .unwrap_or_else(|| neighbors[neighbors.len() / 2])
    }

    /// Load a `.tab` file. `max_states` is the palette bound.
    pub fn load<P: AsRef<Path>>(path: P, max_states: usize) -> Result<Self, RuleFileError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RuleFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let table = Self::parse(&content, max_states)?.with_source(name);

        info!("Transition function file: {}", path.display());
        info!("The number of states: {}", table.states());
        info!("Cellular neighbourhood: {}", table.neighborhood().size());
        info!("Transition rules read: {}", table.rules_read());
        Ok(table)
    }

    /// Parse `.tab` content.
    ///
    /// The header is `states` or `2 states`. Every following line is a rule:
    /// the neighbourhood states in key order, then the next state. Blank lines
    /// and lines starting with `#` are skipped.
    pub fn parse(content: &str, max_states: usize) -> Result<Self, RuleFileError> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let (header_line, header) = lines.next().ok_or(RuleFileError::MissingHeader)?;
        let states = parse_header(header_line, header, max_states)?;

        let mut rules: Vec<Vec<usize>> = Vec::new();
        let mut neighborhood: Option<Neighborhood> = None;

        for (line_no, line) in lines {
            let values = parse_integers(line_no, line)?;
            let size = values.len().saturating_sub(1);
            let current = Neighborhood::from_size(size)
                .ok_or(RuleFileError::UnsupportedNeighborhood { line: line_no, size })?;

            match neighborhood {
                None => neighborhood = Some(current),
                Some(expected) if expected != current => {
                    return Err(RuleFileError::InconsistentNeighborhood {
                        line: line_no,
                        expected: expected.size(),
                        found: size,
                    });
                }
                Some(_) => {}
            }

            if let Some(&state) = values.iter().find(|&&v| v >= states) {
                return Err(RuleFileError::StateOutOfRange {
                    line: line_no,
                    state,
                    states,
                });
            }
            // checked against `states`, which never exceeds MAX_STATES
            rules.push(values);
        }

        // parse_header keeps `states` within 1..=MAX_STATES
        let mut table = Self::with_states(states, neighborhood.unwrap_or(Neighborhood::VonNeumann));
        for values in rules {
            if let Some((&next, key)) = values.split_last() {
                let key: Vec<CellState> = key.iter().map(|&v| v as CellState).collect();
                table.insert(&key, next as CellState)?;
            }
        }

        Ok(table)
    }
}

impl Default for RuleTable {
    /// Two states, von Neumann neighbourhood, no rules
    fn default() -> Self {
        Self::with_states(2, Neighborhood::VonNeumann)
    }
}

fn parse_integers(line: usize, text: &str) -> Result<Vec<usize>, RuleFileError> {
    text.split_whitespace()
        .map(|token| {
            token.parse::<usize>().map_err(|_| RuleFileError::InvalidToken {
                line,
                token: token.to_string(),
            })
        })
        .collect()
}

fn parse_header(line: usize, header: &str, max_states: usize) -> Result<usize, RuleFileError> {
    let tokens: Vec<&str> = header.split_whitespace().collect();
    let parse = |token: &str| {
        token.parse::<i64>().map_err(|_| RuleFileError::InvalidToken {
            line,
            token: token.to_string(),
        })
    };

    let states = match tokens.as_slice() {
        [states] => parse(*states)?,
        [dim, states] => {
            let dim = parse(*dim)?;
            if dim != 2 {
                return Err(RuleFileError::UnsupportedDimension { line, dim });
            }
            parse(*states)?
        }
        _ => return Err(RuleFileError::MalformedHeader { line }),
    };

    if states <= 0 {
        return Err(RuleFileError::NoStates);
    }
    let states = states as usize;
    let max = max_states.min(MAX_STATES);
    if states > max {
        return Err(RuleFileError::TooManyStates { states, max });
    }
    Ok(states)
}
