//! Schelling segregation model
//!
//! Agents of several groups share a rectangular grid with some vacancies.
//! Each step samples one agent; if too many of its neighbors belong to other
//! groups it moves to the nearest vacancy where it would be content.

pub mod core;
pub mod simulation;
pub mod spatial;

pub use crate::core::{Result, SchellingError, SimulationConfig};
pub use crate::simulation::{Engine, GridSnapshot, Observer, StepOutcome, StepResult};
