pub mod engine;
pub mod metrics;
pub mod observer;
pub mod output;
pub mod relocation;
pub mod satisfaction;

pub use engine::{Engine, EngineState, StepOutcome, StepResult};
pub use metrics::GridMetrics;
pub use observer::{FrameSampler, GridSnapshot, Observer, ProgressLogger};
pub use output::{RunReport, SimulationOutput, StopReason};
pub use relocation::{candidate_destinations, find_destination, Candidates, Destination};
pub use satisfaction::{NeighborTally, SatisfactionRule};
