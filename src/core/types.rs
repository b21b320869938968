//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation step counter
pub type Step = u64;

/// Row-major grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev distance (max of row and column differences)
    pub fn chebyshev(&self, other: &Self) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Identifier of a colored occupant type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u8);

impl GroupId {
    /// Largest number of distinct groups a grid can hold
    pub const MAX_GROUPS: usize = u8::MAX as usize + 1;

    pub fn new(id: u8) -> Self {
        Self(id)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Single-character glyph used by text frames
    pub fn glyph(&self) -> char {
        const GLYPHS: &[u8] = b"XO#@%&*+=ABCDEFGHIJKLMNPQRSTUVWYZ";
        GLYPHS
            .get(self.index())
            .map(|&b| b as char)
            .unwrap_or('?')
    }
}

/// Content of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Occupant {
    #[default]
    Empty,
    Agent(GroupId),
}

impl Occupant {
    pub fn agent(group: u8) -> Self {
        Occupant::Agent(GroupId(group))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Occupant::Empty)
    }

    pub fn group(&self) -> Option<GroupId> {
        match self {
            Occupant::Agent(group) => Some(*group),
            Occupant::Empty => None,
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Occupant::Empty => '.',
            Occupant::Agent(group) => group.glyph(),
        }
    }
}
