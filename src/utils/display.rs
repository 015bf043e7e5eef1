//! Display and output formatting utilities

use crate::automaton::{CellState, Engine, Grid, Palette};
use crate::config::OutputFormat;
use anyhow::Result;
use serde::Serialize;

/// Machine-readable view of the engine state
#[derive(Debug, Clone, Serialize)]
pub struct GridReport {
    pub generation: u64,
    pub rule_source: String,
    pub states: usize,
    pub neighborhood: usize,
    pub rows: usize,
    pub cols: usize,
    pub population: usize,
    /// Cell count per state
    pub histogram: Vec<usize>,
    pub cells: Vec<Vec<CellState>>,
}

impl GridReport {
    pub fn from_engine(engine: &Engine) -> Self {
        let grid = engine.grid();
        Self {
            generation: engine.current_generation(),
            rule_source: engine.current_rule_source_name().to_string(),
            states: engine.states(),
            neighborhood: engine.rule_table().neighborhood().size(),
            rows: grid.rows(),
            cols: grid.cols(),
            population: grid.population(),
            histogram: grid.histogram(),
            cells: grid.to_rows(),
        }
    }
}

/// Format grids for console output
pub struct GridFormatter;

impl GridFormatter {
    /// Render the engine's grid in the requested format, with a caption
    pub fn render(engine: &Engine, format: OutputFormat) -> Result<String> {
        let body = match format {
            OutputFormat::Json => {
                return Ok(serde_json::to_string_pretty(&GridReport::from_engine(engine))?);
            }
            OutputFormat::Text => Self::format_grid_with_coords(engine.grid()),
            OutputFormat::Compact => Self::format_grid_compact(engine.grid()),
            OutputFormat::Color => Self::format_grid_colored(engine.grid(), engine.palette()),
        };
        Ok(format!("{}\n{}", Self::caption(engine), body))
    }

    /// Title line: rule file and generation
    pub fn caption(engine: &Engine) -> String {
        format!(
            "[{}] generation {}",
            engine.current_rule_source_name(),
            engine.current_generation()
        )
    }

    /// Format a grid in compact form, one character per cell
    pub fn format_grid_compact(grid: &Grid) -> String {
        let mut output = String::with_capacity(grid.rows() * (grid.cols() + 1));
        for row in grid.cells().chunks(grid.cols()) {
            for &cell in row {
                output.push(Self::symbol(cell));
            }
            output.push('\n');
        }
        output
    }

    /// Format a grid with coordinates
    pub fn format_grid_with_coords(grid: &Grid) -> String {
        let mut output = String::new();

        // Header with column numbers
        output.push_str("   ");
        for x in 0..grid.cols() {
            output.push_str(&format!("{:2}", x % 10));
        }
        output.push('\n');

        // Rows with row numbers
        for (y, row) in grid.cells().chunks(grid.cols()).enumerate() {
            output.push_str(&format!("{:2} ", y));
            for &cell in row {
                output.push(' ');
                output.push(Self::symbol(cell));
            }
            output.push('\n');
        }

        output
    }

    /// Format a grid as coloured blocks using the palette
    pub fn format_grid_colored(grid: &Grid, palette: &Palette) -> String {
        let mut output = String::new();
        for row in grid.cells().chunks(grid.cols()) {
            for &cell in row {
                match palette.color(cell as usize) {
                    Some(rgb) => output.push_str(&format!(
                        "\x1b[38;2;{};{};{}m██\x1b[0m",
                        rgb.r, rgb.g, rgb.b
                    )),
                    None => output.push_str("??"),
                }
            }
            output.push('\n');
        }
        output
    }

    /// `·` for state 0, then digits and letters
    fn symbol(cell: CellState) -> char {
        match cell {
            0 => '·',
            1..=9 => char::from(b'0' + cell),
            10..=35 => char::from(b'a' + cell - 10),
            _ => '#',
        }
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Check if terminal supports color
    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err()
            && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
