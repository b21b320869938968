//! Expanding-ring search for a satisfying vacancy

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::types::{GroupId, Position};
use crate::simulation::satisfaction::SatisfactionRule;
use crate::spatial::grid::Grid;
use crate::spatial::neighborhood::{max_ring_radius, ring_at};

/// Satisfying vacancies found on the nearest productive ring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    pub radius: usize,
    pub positions: Vec<Position>,
}

/// A chosen destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub position: Position,
    pub radius: usize,
}

/// Collect every vacancy on the first ring around `origin` where `group` would be satisfied
///
/// Rings are scanned outward from radius 1. Each vacancy is judged against its
/// own current neighborhood. Returns `None` once a ring falls entirely off the
/// grid without any candidate having been found.
pub fn candidate_destinations(
    grid: &Grid,
    rule: &SatisfactionRule,
    origin: Position,
    group: GroupId,
) -> Option<Candidates> {
    for radius in 1..=max_ring_radius(grid.rows, grid.cols) {
        let ring = if radius == 1 {
            grid.neighbors(origin).to_vec()
        } else {
            ring_at(origin, radius, grid.rows, grid.cols)
        };
        if ring.is_empty() {
            return None;
        }

        let positions: Vec<Position> = ring
            .into_iter()
            .filter(|&pos| {
                grid.occupant(pos).is_empty()
                    && rule.is_satisfied(group, grid.neighbor_occupants(pos))
            })
            .collect();

        if !positions.is_empty() {
            return Some(Candidates { radius, positions });
        }
    }
    None
}

/// Pick one candidate destination uniformly at random
pub fn find_destination<R: Rng + ?Sized>(
    grid: &Grid,
    rule: &SatisfactionRule,
    origin: Position,
    group: GroupId,
    rng: &mut R,
) -> Option<Destination> {
    let candidates = candidate_destinations(grid, rule, origin, group)?;
    candidates.positions.choose(rng).map(|&position| Destination {
        position,
        radius: candidates.radius,
    })
}
