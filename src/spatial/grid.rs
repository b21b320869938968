//! Row-major occupancy grid with cached neighborhoods

use crate::core::error::{Result, SchellingError};
use crate::core::types::{Occupant, Position};
use crate::spatial::neighborhood::immediate_neighbors;

/// A single grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub position: Position,
    pub occupant: Occupant,
    /// Adjacent cells, fixed at construction
    neighbors: Vec<Position>,
}

impl Cell {
    pub fn neighbors(&self) -> &[Position] {
        &self.neighbors
    }
}

/// Fixed-size 2D grid of cells
#[derive(Debug, Clone)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from row-major occupants
    pub fn new(rows: usize, cols: usize, occupants: Vec<Occupant>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(SchellingError::InvalidDimensions { rows, cols });
        }
        let expected = rows
            .checked_mul(cols)
            .ok_or(SchellingError::InvalidDimensions { rows, cols })?;
        if occupants.len() != expected {
            return Err(SchellingError::LayoutMismatch {
                expected,
                actual: occupants.len(),
            });
        }

        let cells = occupants
            .into_iter()
            .enumerate()
            .map(|(i, occupant)| {
                let position = Position::new(i / cols, i % cols);
                Cell {
                    position,
                    occupant,
                    neighbors: immediate_neighbors(position, rows, cols),
                }
            })
            .collect();

        Ok(Self { rows, cols, cells })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    #[inline]
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.row * self.cols + pos.col)
    }

    #[inline]
    pub fn position_of(&self, index: usize) -> Option<Position> {
        (index < self.cells.len()).then(|| Position::new(index / self.cols, index % self.cols))
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.index_of(pos).map(|i| &self.cells[i])
    }

    /// Occupant at `pos`; out-of-bounds reads as empty
    #[inline]
    pub fn occupant(&self, pos: Position) -> Occupant {
        self.get(pos).map(|c| c.occupant).unwrap_or_default()
    }

    pub fn neighbors(&self, pos: Position) -> &[Position] {
        self.get(pos).map(Cell::neighbors).unwrap_or(&[])
    }

    /// Occupants of the cells adjacent to `pos`
    pub fn neighbor_occupants(&self, pos: Position) -> impl Iterator<Item = Occupant> + '_ {
        self.neighbors(pos).iter().map(move |&n| self.occupant(n))
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Row-major copy of every occupant
    pub fn occupants(&self) -> Vec<Occupant> {
        self.cells.iter().map(|c| c.occupant).collect()
    }

    /// Move the occupant of `from` into the vacancy at `to`
    ///
    /// Returns false, leaving the grid untouched, unless `from` holds an agent
    /// and `to` is empty.
    pub fn relocate(&mut self, from: Position, to: Position) -> bool {
        let (Some(src), Some(dst)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };
        if self.cells[src].occupant.is_empty() || !self.cells[dst].occupant.is_empty() {
            return false;
        }
        self.cells[dst].occupant = self.cells[src].occupant;
        self.cells[src].occupant = Occupant::Empty;
        true
    }

    /// Number of cells holding `occupant`
    pub fn count(&self, occupant: Occupant) -> usize {
        self.cells.iter().filter(|c| c.occupant == occupant).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Grid {
        let t = Occupant::agent(0);
        let u = Occupant::agent(1);
        let e = Occupant::Empty;
        Grid::new(3, 3, vec![t, t, e, t, e, u, u, u, e]).expect("valid layout")
    }

    #[test]
    fn test_row_major_addressing() {
        let grid = scenario();
        assert_eq!(grid.len(), 9);
        assert_eq!(grid.occupant(Position::new(0, 1)), Occupant::agent(0));
        assert_eq!(grid.occupant(Position::new(1, 2)), Occupant::agent(1));
        assert_eq!(grid.index_of(Position::new(2, 1)), Some(7));
        assert_eq!(grid.position_of(7), Some(Position::new(2, 1)));
        assert_eq!(grid.index_of(Position::new(3, 0)), None);
        assert_eq!(grid.position_of(9), None);
    }

    #[test]
    fn test_cached_neighbors() {
        let grid = scenario();
        let neighbors: Vec<Occupant> = grid.neighbor_occupants(Position::new(0, 0)).collect();
        assert_eq!(neighbors.len(), 3);
        assert_eq!(grid.neighbors(Position::new(1, 1)).len(), 8);
        assert!(grid.neighbors(Position::new(5, 5)).is_empty());
    }

    #[test]
    fn test_relocate_moves_agent_into_vacancy() {
        let mut grid = scenario();
        assert!(grid.relocate(Position::new(0, 0), Position::new(0, 2)));
        assert_eq!(grid.occupant(Position::new(0, 0)), Occupant::Empty);
        assert_eq!(grid.occupant(Position::new(0, 2)), Occupant::agent(0));
        assert_eq!(grid.count(Occupant::agent(0)), 3);
        assert_eq!(grid.count(Occupant::Empty), 3);
    }

    #[test]
    fn test_relocate_rejects_invalid_moves() {
        let mut grid = scenario();
        let before = grid.occupants();
        assert!(!grid.relocate(Position::new(0, 0), Position::new(0, 1)));
        assert!(!grid.relocate(Position::new(1, 1), Position::new(0, 2)));
        assert!(!grid.relocate(Position::new(0, 0), Position::new(9, 9)));
        assert_eq!(grid.occupants(), before);
    }

    #[test]
    fn test_rejects_bad_layout() {
        assert!(matches!(
            Grid::new(2, 2, vec![Occupant::Empty; 3]),
            Err(SchellingError::LayoutMismatch { expected: 4, actual: 3 })
        ));
        assert!(matches!(
            Grid::new(0, 2, vec![]),
            Err(SchellingError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Grid::new(usize::MAX, 2, vec![]),
            Err(SchellingError::InvalidDimensions { rows: usize::MAX, cols: 2 })
        ));
    }
}
