//! Grid storage and neighborhood geometry

pub mod grid;
pub mod neighborhood;

pub use grid::{Cell, Grid};
pub use neighborhood::{immediate_neighbors, max_ring_radius, ring_at};
