//! Square-grid neighborhood geometry (Moore neighborhood, no wraparound)

use crate::core::types::Position;

/// Offsets of the 8 cells at Chebyshev distance 1
const MOORE_OFFSETS: [(isize, isize); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

#[inline]
fn offset(pos: Position, dr: isize, dc: isize, rows: usize, cols: usize) -> Option<Position> {
    let row = pos.row.checked_add_signed(dr)?;
    let col = pos.col.checked_add_signed(dc)?;
    (row < rows && col < cols).then_some(Position::new(row, col))
}

/// Up to 8 cells adjacent to `pos`, clipped to `[0, rows) x [0, cols)`
pub fn immediate_neighbors(pos: Position, rows: usize, cols: usize) -> Vec<Position> {
    MOORE_OFFSETS
        .iter()
        .filter_map(|&(dr, dc)| offset(pos, dr, dc, rows, cols))
        .collect()
}

/// All in-bounds cells at Chebyshev distance exactly `radius` from `pos`
///
/// Radius 0 yields `pos` itself. An empty result means the whole ring lies
/// outside the grid, so no larger ring can contain any cell either.
pub fn ring_at(pos: Position, radius: usize, rows: usize, cols: usize) -> Vec<Position> {
    if radius == 0 {
        return if pos.row < rows && pos.col < cols {
            vec![pos]
        } else {
            Vec::new()
        };
    }

    let p = radius as isize;
    let mut ring = Vec::with_capacity(8 * radius);

    // Left and right columns, corners included
    for dr in -p..=p {
        for dc in [-p, p] {
            if let Some(cell) = offset(pos, dr, dc, rows, cols) {
                ring.push(cell);
            }
        }
    }

    // Top and bottom rows, corners excluded
    for dr in [-p, p] {
        for dc in (-p + 1)..p {
            if let Some(cell) = offset(pos, dr, dc, rows, cols) {
                ring.push(cell);
            }
        }
    }

    ring
}

/// Largest radius the relocation search ever needs to try
pub fn max_ring_radius(rows: usize, cols: usize) -> usize {
    rows.max(cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn set(cells: Vec<Position>) -> HashSet<Position> {
        cells.into_iter().collect()
    }

    #[test]
    fn test_interior_cell_has_eight_neighbors() {
        let neighbors = immediate_neighbors(Position::new(1, 1), 3, 3);
        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&Position::new(1, 1)));
    }

    #[test]
    fn test_corner_and_edge_clipping() {
        assert_eq!(immediate_neighbors(Position::new(0, 0), 3, 3).len(), 3);
        assert_eq!(immediate_neighbors(Position::new(0, 1), 3, 3).len(), 5);
        assert_eq!(immediate_neighbors(Position::new(2, 2), 3, 3).len(), 3);
        assert!(immediate_neighbors(Position::new(0, 0), 1, 1).is_empty());
    }

    #[test]
    fn test_ring_one_matches_neighbors() {
        for row in 0..4 {
            for col in 0..5 {
                let pos = Position::new(row, col);
                assert_eq!(
                    set(ring_at(pos, 1, 4, 5)),
                    set(immediate_neighbors(pos, 4, 5))
                );
            }
        }
    }

    #[test]
    fn test_ring_sizes() {
        let center = Position::new(10, 10);
        for radius in 1..5 {
            let ring = ring_at(center, radius, 21, 21);
            assert_eq!(ring.len(), 8 * radius);
            assert_eq!(set(ring.clone()).len(), ring.len(), "ring has duplicates");
            assert!(ring.iter().all(|c| c.chebyshev(&center) == radius));
        }
    }

    #[test]
    fn test_ring_beyond_grid_is_empty() {
        let corner = Position::new(0, 0);
        assert_eq!(ring_at(corner, 2, 3, 3).len(), 5);
        assert!(ring_at(corner, 3, 3, 3).is_empty());
        assert_eq!(ring_at(corner, 0, 3, 3), vec![corner]);
    }

    proptest! {
        #[test]
        fn neighbor_relation_is_symmetric(
            rows in 1usize..8, cols in 1usize..8,
            ar in 0usize..8, ac in 0usize..8,
        ) {
            let a = Position::new(ar % rows, ac % cols);
            for b in immediate_neighbors(a, rows, cols) {
                prop_assert!(immediate_neighbors(b, rows, cols).contains(&a));
            }
        }

        #[test]
        fn rings_partition_the_grid(
            rows in 1usize..9, cols in 1usize..9,
            r in 0usize..9, c in 0usize..9,
        ) {
            let pos = Position::new(r % rows, c % cols);
            let mut seen = HashSet::new();
            for radius in 0..=max_ring_radius(rows, cols) {
                for cell in ring_at(pos, radius, rows, cols) {
                    prop_assert_eq!(cell.chebyshev(&pos), radius);
                    prop_assert!(seen.insert(cell), "cell {} in two rings", cell);
                }
            }
            prop_assert_eq!(seen.len(), rows * cols);
        }
    }
}
