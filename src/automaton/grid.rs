//! Toroidal grid of cell states

use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell state, valid in `[0, states)`
pub type CellState = u8;

/// Supported cellular neighbourhoods.
///
/// Both orders put the centre cell at index `size / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// 5 cells: North, West, Centre, East, South
    VonNeumann,
    /// 9 cells: the full 3x3 block in row-major order
    Moore,
}

const VON_NEUMANN_OFFSETS: [(isize, isize); 5] = [(-1, 0), (0, -1), (0, 0), (0, 1), (1, 0)];

const MOORE_OFFSETS: [(isize, isize); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Neighborhood {
    /// Map a cell count to a neighbourhood
    pub fn from_size(size: usize) -> Option<Self> {
        match size {
            5 => Some(Neighborhood::VonNeumann),
            9 => Some(Neighborhood::Moore),
            _ => None,
        }
    }

    pub fn size(self) -> usize {
        self.offsets().len()
    }

    /// Index of the centre cell in the ordered neighbour list
    pub fn center_index(self) -> usize {
        self.size() / 2
    }

    /// (row, col) offsets in lookup-key order
    pub fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Neighborhood::VonNeumann => &VON_NEUMANN_OFFSETS,
            Neighborhood::Moore => &MOORE_OFFSETS,
        }
    }
}

/// Row-major grid with wraparound on every edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>,
    age: u64,
}

impl Grid {
    /// Create an all-zero grid
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::ZeroDimension { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
            age: 0,
        })
    }

    /// Create a grid from rows of states
    pub fn from_rows(rows: Vec<Vec<CellState>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut grid = Self::new(height, width)?;

        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(GridError::DimensionMismatch {
                    expected: (height, width),
                    found: (r, row.len()),
                });
            }
            let start = grid.index(r, 0);
            grid.cells[start..start + width].copy_from_slice(&row);
        }

        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Generation counter
    pub fn age(&self) -> u64 {
        self.age
    }

    pub(crate) fn advance_age(&mut self) {
        self.age += 1;
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Get cell value at coordinates
    pub fn get(&self, row: usize, col: usize) -> Option<CellState> {
        if row < self.rows && col < self.cols {
            Some(self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// Set cell value at coordinates
    pub fn set(&mut self, row: usize, col: usize, state: CellState) -> Result<(), GridError> {
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let idx = self.index(row, col);
        self.cells[idx] = state;
        Ok(())
    }

    /// Set a cell the caller already knows to be in bounds
    pub(crate) fn set_unchecked(&mut self, row: usize, col: usize, state: CellState) {
        debug_assert!(row < self.rows && col < self.cols);
        let idx = self.index(row, col);
        self.cells[idx] = state;
    }

    /// Ordered neighbour states of a cell, including the cell itself.
    ///
    /// Rows and columns wrap independently to the opposite edge.
    pub fn neighbors(&self, row: usize, col: usize, neighborhood: Neighborhood) -> Vec<CellState> {
        neighborhood
            .offsets()
            .iter()
            .map(|&(dr, dc)| {
                let r = (row as isize + dr).rem_euclid(self.rows as isize) as usize;
                let c = (col as isize + dc).rem_euclid(self.cols as isize) as usize;
                self.cells[self.index(r, c)]
            })
            .collect()
    }

    /// Set every cell to `state` without touching the generation counter
    pub fn fill(&mut self, state: CellState) {
        self.cells.fill(state);
    }

    /// Set every cell to 0 and restart the generation counter
    pub fn zero_init(&mut self) {
        self.fill(0);
        self.age = 0;
    }

    /// Copy every cell of `snapshot` and restart the generation counter
    pub fn load_snapshot(&mut self, snapshot: &Grid) -> Result<(), GridError> {
        if (self.rows, self.cols) != (snapshot.rows, snapshot.cols) {
            return Err(GridError::DimensionMismatch {
                expected: (self.rows, self.cols),
                found: (snapshot.rows, snapshot.cols),
            });
        }
        self.restore(snapshot);
        Ok(())
    }

    /// `load_snapshot` for a snapshot of the same shape
    pub(crate) fn restore(&mut self, snapshot: &Grid) {
        self.copy_cells_from(snapshot);
        self.age = 0;
    }

    /// Overwrite the cells with those of an equally sized grid; age unchanged
    pub(crate) fn copy_cells_from(&mut self, other: &Grid) {
        assert_eq!(
            (self.rows, self.cols),
            (other.rows, other.cols),
            "grids must have the same shape"
        );
        self.cells.copy_from_slice(&other.cells);
    }

    /// Number of cells in a non-zero state
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != 0).count()
    }

    /// Number of cells in each state, indexed by state
    pub fn histogram(&self) -> Vec<usize> {
        let top = self.cells.iter().copied().max().unwrap_or(0) as usize;
        let mut counts = vec![0; top + 1];
        for &cell in &self.cells {
            counts[cell as usize] += 1;
        }
        counts
    }

    /// Rows of states, top to bottom
    pub fn to_rows(&self) -> Vec<Vec<CellState>> {
        self.cells.chunks(self.cols).map(<[CellState]>::to_vec).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wide = self.cells.iter().any(|&cell| cell > 9);
        for row in self.cells.chunks(self.cols) {
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                if wide {
                    write!(f, "{:2}", cell)?;
                } else {
                    write!(f, "{}", cell)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(rows: usize, cols: usize) -> Grid {
        let cells = (0..rows)
            .map(|r| (0..cols).map(|c| (r * cols + c) as CellState).collect())
            .collect();
        Grid::from_rows(cells).unwrap()
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(3, 4).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.cells().len(), 12);
        assert_eq!(grid.population(), 0);
        assert_eq!(grid.age(), 0);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(Grid::new(0, 3), Err(GridError::ZeroDimension { .. })));
        assert!(matches!(Grid::new(3, 0), Err(GridError::ZeroDimension { .. })));
        assert!(Grid::from_rows(vec![]).is_err());
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let rows = vec![vec![0, 1, 0], vec![1, 1]];
        assert!(matches!(
            Grid::from_rows(rows),
            Err(GridError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_get_and_set() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.set(1, 0, 3).unwrap();
        assert_eq!(grid.get(1, 0), Some(3));
        assert_eq!(grid.get(2, 0), None);
        assert!(matches!(grid.set(0, 2, 1), Err(GridError::OutOfBounds { .. })));
    }

    #[test]
    fn test_von_neumann_order_interior() {
        let grid = numbered(3, 3);
        // N, W, C, E, S around the centre
        assert_eq!(grid.neighbors(1, 1, Neighborhood::VonNeumann), vec![1, 3, 4, 5, 7]);
    }

    #[test]
    fn test_moore_order_interior() {
        let grid = numbered(3, 3);
        assert_eq!(
            grid.neighbors(1, 1, Neighborhood::Moore),
            vec![0, 1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn test_toroidal_wrap_von_neumann() {
        let grid = numbered(4, 5);
        let (rows, cols) = (grid.rows(), grid.cols());
        for c in 0..cols {
            let top = grid.neighbors(0, c, Neighborhood::VonNeumann);
            assert_eq!(top[0], grid.get(rows - 1, c).unwrap());
            let bottom = grid.neighbors(rows - 1, c, Neighborhood::VonNeumann);
            assert_eq!(bottom[4], grid.get(0, c).unwrap());
        }
        for r in 0..rows {
            let left = grid.neighbors(r, 0, Neighborhood::VonNeumann);
            assert_eq!(left[1], grid.get(r, cols - 1).unwrap());
            let right = grid.neighbors(r, cols - 1, Neighborhood::VonNeumann);
            assert_eq!(right[3], grid.get(r, 0).unwrap());
        }
    }

    #[test]
    fn test_toroidal_wrap_moore_corners() {
        let grid = numbered(4, 5);
        // top-left corner: NW is the bottom-right cell
        let corner = grid.neighbors(0, 0, Neighborhood::Moore);
        assert_eq!(corner, vec![19, 15, 16, 4, 0, 1, 9, 5, 6]);
        // bottom-right corner: SE is the top-left cell
        let corner = grid.neighbors(3, 4, Neighborhood::Moore);
        assert_eq!(corner, vec![13, 14, 10, 18, 19, 15, 3, 4, 0]);
    }

    #[test]
    fn test_zero_init_and_snapshot_reset_age() {
        let mut grid = numbered(3, 3);
        grid.advance_age();
        grid.advance_age();
        assert_eq!(grid.age(), 2);

        let snapshot = grid.clone();
        grid.zero_init();
        assert_eq!(grid.population(), 0);
        assert_eq!(grid.age(), 0);

        grid.advance_age();
        grid.load_snapshot(&snapshot).unwrap();
        assert_eq!(grid.cells(), snapshot.cells());
        assert_eq!(grid.age(), 0);

        let other = Grid::new(2, 2).unwrap();
        assert!(grid.load_snapshot(&other).is_err());
    }

    #[test]
    fn test_restore_and_unchecked_set() {
        let mut grid = Grid::new(2, 3).unwrap();
        grid.set_unchecked(1, 2, 4);
        assert_eq!(grid.get(1, 2), Some(4));

        let snapshot = grid.clone();
        grid.fill(0);
        grid.advance_age();
        grid.restore(&snapshot);
        assert_eq!(grid.cells(), snapshot.cells());
        assert_eq!(grid.age(), 0);
    }

    #[test]
    #[should_panic(expected = "same shape")]
    fn test_copy_cells_requires_same_shape() {
        let mut grid = Grid::new(2, 3).unwrap();
        grid.copy_cells_from(&Grid::new(3, 2).unwrap());
    }

    #[test]
    fn test_histogram() {
        let grid = Grid::from_rows(vec![vec![0, 2, 2], vec![1, 0, 0]]).unwrap();
        assert_eq!(grid.histogram(), vec![3, 1, 2]);
        assert_eq!(grid.population(), 3);
    }

    #[test]
    fn test_display() {
        let grid = Grid::from_rows(vec![vec![0, 1], vec![2, 0]]).unwrap();
        assert_eq!(grid.to_string(), "0 1\n2 0\n");
    }

    #[test]
    fn test_neighborhood_sizes() {
        assert_eq!(Neighborhood::from_size(5), Some(Neighborhood::VonNeumann));
        assert_eq!(Neighborhood::from_size(9), Some(Neighborhood::Moore));
        assert_eq!(Neighborhood::from_size(8), None);
        assert_eq!(Neighborhood::VonNeumann.center_index(), 2);
        assert_eq!(Neighborhood::Moore.center_index(), 4);
    }
}
