//! Grid snapshots and step observers
//!
//! Observers are how rendering and export collaborators follow a run. The
//! engine only builds a snapshot when at least one observer is registered.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::{Occupant, Position, Step};

/// Owned, read-only copy of the grid at a given step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub step: Step,
    occupants: Vec<Occupant>,
}

impl GridSnapshot {
    pub fn new(rows: usize, cols: usize, step: Step, occupants: Vec<Occupant>) -> Self {
        debug_assert_eq!(occupants.len(), rows * cols);
        Self {
            rows,
            cols,
            step,
            occupants,
        }
    }

    pub fn get(&self, pos: Position) -> Option<Occupant> {
        (pos.row < self.rows && pos.col < self.cols)
            .then(|| self.occupants[pos.row * self.cols + pos.col])
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    pub fn row(&self, row: usize) -> Option<&[Occupant]> {
        (row < self.rows).then(|| &self.occupants[row * self.cols..(row + 1) * self.cols])
    }

    pub fn count(&self, occupant: Occupant) -> usize {
        self.occupants.iter().filter(|&&o| o == occupant).count()
    }
}

impl fmt::Display for GridSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.occupants.chunks(self.cols.max(1)) {
            let line: String = row.iter().map(Occupant::glyph).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Receives the grid after every step
pub trait Observer {
    fn on_step(&mut self, snapshot: &GridSnapshot, step: Step);
}

impl<F> Observer for F
where
    F: FnMut(&GridSnapshot, Step),
{
    fn on_step(&mut self, snapshot: &GridSnapshot, step: Step) {
        self(snapshot, step)
    }
}

/// Logs the run's progress every `interval` steps
#[derive(Debug, Clone)]
pub struct ProgressLogger {
    interval: Step,
    total: Option<Step>,
}

impl ProgressLogger {
    pub fn new(interval: Step, total: Option<Step>) -> Self {
        Self {
            interval: interval.max(1),
            total,
        }
    }
}

impl Observer for ProgressLogger {
    fn on_step(&mut self, snapshot: &GridSnapshot, step: Step) {
        if step % self.interval != 0 {
            return;
        }
        let vacancies = snapshot.count(Occupant::Empty);
        match self.total {
            Some(total) => tracing::info!(
                "Step {}/{} ({:.1}%), {} vacancies",
                step,
                total,
                step as f64 * 100.0 / total.max(1) as f64,
                vacancies
            ),
            None => tracing::info!("Step {}, {} vacancies", step, vacancies),
        }
    }
}

/// Keeps every `interval`-th snapshot for a downstream renderer
#[derive(Debug, Clone, Default)]
pub struct FrameSampler {
    interval: Step,
    frames: Vec<GridSnapshot>,
}

impl FrameSampler {
    pub fn new(interval: Step) -> Self {
        Self {
            interval: interval.max(1),
            frames: Vec::new(),
        }
    }

    pub fn frames(&self) -> &[GridSnapshot] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<GridSnapshot> {
        self.frames
    }
}

impl Observer for FrameSampler {
    fn on_step(&mut self, snapshot: &GridSnapshot, step: Step) {
        if step % self.interval == 0 {
            self.frames.push(snapshot.clone());
        }
    }
}
