//! Simulation configuration with documented defaults
//!
//! A configuration is plain data: it is validated once when an engine is
//! built and never consulted through global state afterwards.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, SchellingError};
use crate::core::types::{GroupId, Occupant};

/// Configuration for a single simulation run
///
/// Field defaults reproduce the 100x100 Vinkovic & Kirman (2006) setup:
/// two groups of 4000 agents and 2000 vacancies with a tolerance of 1/2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of grid rows
    pub rows: usize,

    /// Number of grid columns
    pub cols: usize,

    /// Agent count per group, indexed by `GroupId`
    pub groups: Vec<usize>,

    /// Number of empty cells
    pub vacancies: usize,

    /// Maximum ratio of differently-typed to same-typed neighbors an agent accepts
    ///
    /// At 0.5 an agent with 4 same-group neighbors tolerates at most 2 others.
    pub tolerance: f64,

    /// Step budget; `None` runs until halted
    pub max_steps: Option<u64>,

    /// RNG seed; `None` draws one from the OS
    pub seed: Option<u64>,

    /// Check for equilibrium every N steps and stop once no agent is dissatisfied
    ///
    /// The check scans every agent, so it should not run on every step of a
    /// large grid.
    pub stability_check_interval: Option<u64>,

    /// Log progress every N steps
    pub progress_interval: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rows: 100,
            cols: 100,
            groups: vec![4000, 4000],
            vacancies: 2000,
            tolerance: 0.5,
            max_steps: None,
            seed: None,
            stability_check_interval: None,
            progress_interval: None,
        }
    }
}

/// Published parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Schelling (1971): 13x16 mesh, 69/69 agents, 70 vacancies
    Schelling1971,
    /// Vinkovic & Kirman (2006): 100x100 mesh, 4000/4000 agents, 2000 vacancies
    VinkovicKirman2006,
    /// 26x32 mesh, 276/276 agents, 280 vacancies
    Mesh26x32,
}

impl Preset {
    pub const ALL: [Preset; 3] = [
        Preset::Schelling1971,
        Preset::VinkovicKirman2006,
        Preset::Mesh26x32,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Schelling1971 => "schelling1971",
            Preset::VinkovicKirman2006 => "vinkovic-kirman2006",
            Preset::Mesh26x32 => "mesh26x32",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn config(&self) -> SimulationConfig {
        let (rows, cols, groups, vacancies) = match self {
            Preset::Schelling1971 => (13, 16, vec![69, 69], 70),
            Preset::VinkovicKirman2006 => (100, 100, vec![4000, 4000], 2000),
            Preset::Mesh26x32 => (26, 32, vec![276, 276], 280),
        };
        SimulationConfig {
            rows,
            cols,
            groups,
            vacancies,
            ..SimulationConfig::default()
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing fields take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// `rows * cols`, or `None` if the product does not fit in `usize`
    pub fn cell_count(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Total of every group count plus vacancies, or `None` on overflow
    pub fn occupant_total(&self) -> Option<usize> {
        self.groups
            .iter()
            .try_fold(self.vacancies, |total, &count| total.checked_add(count))
    }

    /// The occupant multiset: every group count followed by the vacancy count
    pub fn composition(&self) -> Vec<(Occupant, usize)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, &count)| (Occupant::Agent(GroupId(i as u8)), count))
            .chain(std::iter::once((Occupant::Empty, self.vacancies)))
            .collect()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(SchellingError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }

        if self.groups.is_empty() {
            return Err(SchellingError::NoGroups);
        }

        if self.groups.len() > GroupId::MAX_GROUPS {
            return Err(SchellingError::TooManyGroups(self.groups.len()));
        }

        validate_tolerance(self.tolerance)?;

        let expected = self.cell_count().ok_or(SchellingError::InvalidDimensions {
            rows: self.rows,
            cols: self.cols,
        })?;

        // An overflowing total can never match a representable cell count
        let actual = self.occupant_total().unwrap_or(usize::MAX);
        if actual != expected {
            return Err(SchellingError::CompositionMismatch { expected, actual });
        }

        Ok(())
    }
}

pub(crate) fn validate_tolerance(tolerance: f64) -> Result<()> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(SchellingError::InvalidTolerance(tolerance));
    }
    Ok(())
}
