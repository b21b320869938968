//! Run statistics and serialization

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::Step;
use crate::simulation::engine::Engine;
use crate::simulation::metrics::GridMetrics;

/// Why a run loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The engine's step limit was reached
    StepLimit,
    /// The budget passed to `Engine::run` was used up
    RunBudget,
    /// No agent was dissatisfied at a stability check
    Stable,
    /// The caller halted the engine
    Halted,
}

/// Summary of one `Engine::run` call
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub steps: Step,
    pub moves: u64,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

/// Complete simulation output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub config: SimulationConfig,
    pub seed: Option<u64>,
    pub initial_metrics: GridMetrics,
    pub final_metrics: GridMetrics,
    pub statistics: RunStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunStats {
    pub steps: Step,
    pub moves: u64,
    pub stop_reason: StopReason,
    pub simulation_time_ms: u64,
}

impl SimulationOutput {
    pub fn new(config: SimulationConfig, initial: GridMetrics, engine: &Engine, report: &RunReport) -> Self {
        Self {
            config,
            seed: engine.seed(),
            initial_metrics: initial,
            final_metrics: engine.metrics(),
            statistics: RunStats {
                steps: engine.step_count(),
                moves: engine.moves(),
                stop_reason: report.stop_reason,
                simulation_time_ms: report.elapsed.as_millis() as u64,
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> String {
        format!(
            "Simulated {} steps in {}ms ({} moves, stopped: {:?})\n\
             Satisfied: {:.1}% -> {:.1}%\n\
             Segregation index: {:.3} -> {:.3}",
            self.statistics.steps,
            self.statistics.simulation_time_ms,
            self.statistics.moves,
            self.statistics.stop_reason,
            self.initial_metrics.satisfied_fraction * 100.0,
            self.final_metrics.satisfied_fraction * 100.0,
            self.initial_metrics.segregation_index,
            self.final_metrics.segregation_index,
        )
    }
}
