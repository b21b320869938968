pub mod config;
pub mod error;
pub mod types;

pub use config::{Preset, SimulationConfig};
pub use error::{Result, SchellingError};
pub use types::{GroupId, Occupant, Position, Step};
