//! Aggregate measurements over a grid

use serde::{Deserialize, Serialize};

use crate::core::types::Occupant;
use crate::simulation::satisfaction::{NeighborTally, SatisfactionRule};
use crate::spatial::grid::Grid;

/// Population and segregation statistics for one grid state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    /// Agents per group, indexed by `GroupId`
    pub group_counts: Vec<usize>,
    pub vacancies: usize,
    pub agents: usize,
    pub unsatisfied: usize,
    /// Fraction of agents currently satisfied
    pub satisfied_fraction: f64,
    /// Mean share of same-group agents among each agent's occupied neighbors
    ///
    /// Agents without occupied neighbors are left out of the mean.
    pub segregation_index: f64,
}

impl GridMetrics {
    pub fn measure(grid: &Grid, rule: &SatisfactionRule) -> Self {
        let mut group_counts: Vec<usize> = Vec::new();
        let mut vacancies = 0;
        let mut unsatisfied = 0;
        let mut share_sum = 0.0;
        let mut share_samples = 0usize;

        for cell in grid.cells() {
            let group = match cell.occupant {
                Occupant::Empty => {
                    vacancies += 1;
                    continue;
                }
                Occupant::Agent(group) => group,
            };

            if group_counts.len() <= group.index() {
                group_counts.resize(group.index() + 1, 0);
            }
            group_counts[group.index()] += 1;

            let tally = NeighborTally::count(group, grid.neighbor_occupants(cell.position));
            if !rule.accepts(tally) {
                unsatisfied += 1;
            }
            if let Some(share) = tally.same_share() {
                share_sum += share;
                share_samples += 1;
            }
        }

        let agents = grid.len() - vacancies;
        Self {
            group_counts,
            vacancies,
            agents,
            unsatisfied,
            satisfied_fraction: if agents == 0 {
                1.0
            } else {
                (agents - unsatisfied) as f64 / agents as f64
            },
            segregation_index: if share_samples == 0 {
                0.0
            } else {
                share_sum / share_samples as f64
            },
        }
    }
}
