//! Satisfaction rule: does an agent accept its neighborhood?

use crate::core::config::validate_tolerance;
use crate::core::error::Result;
use crate::core::types::{GroupId, Occupant};

/// Same-group and other-group counts around a cell; vacancies are not counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborTally {
    pub same: usize,
    pub other: usize,
}

impl NeighborTally {
    pub fn count(group: GroupId, neighbors: impl IntoIterator<Item = Occupant>) -> Self {
        neighbors
            .into_iter()
            .fold(Self::default(), |mut tally, occupant| {
                match occupant {
                    Occupant::Agent(g) if g == group => tally.same += 1,
                    Occupant::Agent(_) => tally.other += 1,
                    Occupant::Empty => {}
                }
                tally
            })
    }

    pub fn occupied(&self) -> usize {
        self.same + self.other
    }

    /// Share of occupied neighbors belonging to the same group, if any are occupied
    pub fn same_share(&self) -> Option<f64> {
        let occupied = self.occupied();
        (occupied > 0).then(|| self.same as f64 / occupied as f64)
    }
}

/// Tolerance-based satisfaction policy, identical for every group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatisfactionRule {
    tolerance: f64,
}

impl SatisfactionRule {
    pub fn new(tolerance: f64) -> Result<Self> {
        validate_tolerance(tolerance)?;
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Decide from a precomputed tally
    ///
    /// - no other-group neighbor: satisfied
    /// - other-group neighbors but no same-group neighbor: unsatisfied
    /// - otherwise: satisfied iff `other / same <= tolerance`
    pub fn accepts(&self, tally: NeighborTally) -> bool {
        match (tally.same, tally.other) {
            (_, 0) => true,
            (0, _) => false,
            (same, other) => other as f64 / same as f64 <= self.tolerance,
        }
    }

    /// Whether an agent of `group` is content among `neighbors`
    pub fn is_satisfied(&self, group: GroupId, neighbors: impl IntoIterator<Item = Occupant>) -> bool {
        self.accepts(NeighborTally::count(group, neighbors))
    }
}
