//! Simulation engine: owns the grid and drives discrete relocation steps

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{Occupant, Position, Step};
use crate::simulation::metrics::GridMetrics;
use crate::simulation::observer::{GridSnapshot, Observer};
use crate::simulation::output::{RunReport, StopReason};
use crate::simulation::relocation::find_destination;
use crate::simulation::satisfaction::SatisfactionRule;
use crate::spatial::grid::Grid;

/// Lifecycle of the engine between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Ready to step
    Idle,
    /// Step budget reached or halted by the caller
    Stopped,
}

/// What happened during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The sampled agent moved into a satisfying vacancy `radius` rings away
    Moved {
        from: Position,
        to: Position,
        radius: usize,
    },
    /// The sampled agent was content where it stood
    AlreadySatisfied { at: Position },
    /// The sampled agent was dissatisfied but no ring offered a satisfying vacancy
    NoDestination { at: Position },
    /// The grid holds no agent to sample
    NoAgents,
    /// The engine is stopped; nothing ran
    Stopped,
}

/// Result of `Engine::step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    pub outcome: StepOutcome,
    /// Number of completed steps, including this one
    pub step_index: Step,
}

impl StepResult {
    pub fn moved(&self) -> bool {
        matches!(self.outcome, StepOutcome::Moved { .. })
    }

    pub fn from(&self) -> Option<Position> {
        match self.outcome {
            StepOutcome::Moved { from, .. } => Some(from),
            _ => None,
        }
    }

    pub fn to(&self) -> Option<Position> {
        match self.outcome {
            StepOutcome::Moved { to, .. } => Some(to),
            _ => None,
        }
    }
}

/// The Schelling simulation
///
/// The engine is the only writer of its grid. Observers get owned snapshots.
pub struct Engine {
    grid: Grid,
    rule: SatisfactionRule,
    rng: ChaCha8Rng,
    /// Positions of every agent, kept in sync with the grid for uniform sampling
    agents: Vec<Position>,
    step_count: Step,
    moves: u64,
    max_steps: Option<Step>,
    stability_check_interval: Option<Step>,
    state: EngineState,
    seed: Option<u64>,
    observers: Vec<Box<dyn Observer>>,
}

impl Engine {
    /// Build an engine from a config, seeding from `config.seed` or the OS
    pub fn initialize(config: &SimulationConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut engine = Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))?;
        engine.seed = Some(seed);
        Ok(engine)
    }

    /// Build an engine from a config with an explicit RNG
    ///
    /// The composition is shuffled into a uniformly random permutation over all cells.
    pub fn with_rng(config: &SimulationConfig, mut rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;

        let mut occupants: Vec<Occupant> = config
            .composition()
            .into_iter()
            .flat_map(|(occupant, count)| std::iter::repeat(occupant).take(count))
            .collect();
        occupants.shuffle(&mut rng);

        let mut engine = Self::from_layout(config.rows, config.cols, occupants, config.tolerance, rng)?;
        engine.max_steps = config.max_steps;
        engine.stability_check_interval = config.stability_check_interval;
        engine.refresh_state();
        Ok(engine)
    }

    /// Build an engine over an explicit row-major layout
    pub fn from_layout(
        rows: usize,
        cols: usize,
        occupants: Vec<Occupant>,
        tolerance: f64,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        let rule = SatisfactionRule::new(tolerance)?;
        let grid = Grid::new(rows, cols, occupants)?;
        let agents: Vec<Position> = grid
            .cells()
            .filter(|c| !c.occupant.is_empty())
            .map(|c| c.position)
            .collect();

        if agents.is_empty() {
            tracing::warn!("Grid {}x{} holds no agents; every step will be a no-op", rows, cols);
        }
        tracing::debug!(
            "Engine ready: {}x{} grid, {} agents, tolerance {}",
            rows,
            cols,
            agents.len(),
            tolerance
        );

        Ok(Self {
            grid,
            rule,
            rng,
            agents,
            step_count: 0,
            moves: 0,
            max_steps: None,
            stability_check_interval: None,
            state: EngineState::Idle,
            seed: None,
            observers: Vec::new(),
        })
    }

    /// Stop after `max_steps` completed steps; `None` removes the budget
    pub fn with_max_steps(mut self, max_steps: Option<Step>) -> Self {
        self.max_steps = max_steps;
        self.refresh_state();
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rule(&self) -> &SatisfactionRule {
        &self.rule
    }

    pub fn step_count(&self) -> Step {
        self.step_count
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Seed used by `initialize`, if the engine was built that way
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn register_observer<O: Observer + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    /// Stop the engine; later `step` calls do nothing
    pub fn halt(&mut self) {
        if self.state != EngineState::Stopped {
            tracing::info!("Simulation halted at step {}", self.step_count);
        }
        self.state = EngineState::Stopped;
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::new(self.grid.rows, self.grid.cols, self.step_count, self.grid.occupants())
    }

    pub fn metrics(&self) -> GridMetrics {
        GridMetrics::measure(&self.grid, &self.rule)
    }

    /// Number of agents that are currently dissatisfied
    pub fn unsatisfied_count(&self) -> usize {
        self.agents
            .iter()
            .filter(|&&pos| !self.is_agent_satisfied(pos))
            .count()
    }

    /// True once no agent is dissatisfied
    pub fn is_stable(&self) -> bool {
        self.agents.iter().all(|&pos| self.is_agent_satisfied(pos))
    }

    /// Run one step: sample an agent, relocate it if dissatisfied, notify observers
    pub fn step(&mut self) -> StepResult {
        if self.state == EngineState::Stopped {
            return StepResult {
                outcome: StepOutcome::Stopped,
                step_index: self.step_count,
            };
        }

        let outcome = self.advance();
        self.step_count += 1;
        self.refresh_state();

        if !self.observers.is_empty() {
            let snapshot = self.snapshot();
            for observer in &mut self.observers {
                observer.on_step(&snapshot, self.step_count);
            }
        }

        StepResult {
            outcome,
            step_index: self.step_count,
        }
    }

    /// Step until stopped, stable, or `budget` steps have run in this call
    pub fn run(&mut self, budget: Option<Step>) -> RunReport {
        self.run_inner(budget, None)
    }

    /// Like `run`, also feeding every step to a borrowed observer
    pub fn run_with(&mut self, budget: Option<Step>, observer: &mut dyn Observer) -> RunReport {
        self.run_inner(budget, Some(observer))
    }

    fn run_inner(&mut self, budget: Option<Step>, mut extra: Option<&mut dyn Observer>) -> RunReport {
        let start = Instant::now();
        let first_step = self.step_count;
        let first_move = self.moves;

        tracing::info!(
            "Running from step {} (budget: {:?}, limit: {:?})",
            first_step,
            budget,
            self.max_steps
        );

        let stop_reason = loop {
            if self.state == EngineState::Stopped {
                break self.stopped_reason();
            }
            if budget.is_some_and(|b| self.step_count - first_step >= b) {
                break StopReason::RunBudget;
            }
            if let Some(interval) = self.stability_check_interval {
                if self.step_count % interval.max(1) == 0 && self.is_stable() {
                    break StopReason::Stable;
                }
            }

            let result = self.step();
            if let Some(observer) = extra.as_deref_mut() {
                observer.on_step(&self.snapshot(), result.step_index);
            }
        };

        let report = RunReport {
            steps: self.step_count - first_step,
            moves: self.moves - first_move,
            stop_reason,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            "Run finished after {} steps ({} moves): {:?}",
            report.steps,
            report.moves,
            report.stop_reason
        );
        report
    }

    fn advance(&mut self) -> StepOutcome {
        if self.agents.is_empty() {
            return StepOutcome::NoAgents;
        }

        let slot = self.rng.gen_range(0..self.agents.len());
        let origin = self.agents[slot];
        let group = match self.grid.occupant(origin) {
            Occupant::Agent(group) => group,
            Occupant::Empty => {
                debug_assert!(false, "agent list out of sync at {}", origin);
                return StepOutcome::NoAgents;
            }
        };

        if self.rule.is_satisfied(group, self.grid.neighbor_occupants(origin)) {
            return StepOutcome::AlreadySatisfied { at: origin };
        }

        let Some(dest) = find_destination(&self.grid, &self.rule, origin, group, &mut self.rng) else {
            tracing::trace!("No destination for group {} agent at {}", group.0, origin);
            return StepOutcome::NoDestination { at: origin };
        };

        if !self.grid.relocate(origin, dest.position) {
            return StepOutcome::NoDestination { at: origin };
        }
        self.agents[slot] = dest.position;
        self.moves += 1;

        tracing::debug!(
            "Step {}: group {} moved {} -> {} (ring {})",
            self.step_count + 1,
            group.0,
            origin,
            dest.position,
            dest.radius
        );

        StepOutcome::Moved {
            from: origin,
            to: dest.position,
            radius: dest.radius,
        }
    }

    fn is_agent_satisfied(&self, pos: Position) -> bool {
        match self.grid.occupant(pos) {
            Occupant::Agent(group) => self.rule.is_satisfied(group, self.grid.neighbor_occupants(pos)),
            Occupant::Empty => true,
        }
    }

    fn refresh_state(&mut self) {
        if self.max_steps.is_some_and(|max| self.step_count >= max) {
            self.state = EngineState::Stopped;
        }
    }

    fn stopped_reason(&self) -> StopReason {
        if self.max_steps.is_some_and(|max| self.step_count >= max) {
            StopReason::StepLimit
        } else {
            StopReason::Halted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GroupId;
    use std::cell::RefCell;
    use std::rc::Rc;

    const T: Occupant = Occupant::Agent(GroupId(0));
    const U: Occupant = Occupant::Agent(GroupId(1));
    const E: Occupant = Occupant::Empty;

    fn small_config(seed: u64) -> SimulationConfig {
        SimulationConfig {
            rows: 10,
            cols: 10,
            groups: vec![40, 40],
            vacancies: 20,
            seed: Some(seed),
            ..SimulationConfig::default()
        }
    }

    fn engine_from(rows: usize, cols: usize, layout: Vec<Occupant>) -> Engine {
        Engine::from_layout(rows, cols, layout, 0.5, ChaCha8Rng::seed_from_u64(9))
            .expect("valid layout")
    }

    #[test]
    fn test_initialize_preserves_composition() {
        let engine = Engine::initialize(&small_config(1)).expect("valid config");
        let grid = engine.grid();
        assert_eq!(grid.count(T), 40);
        assert_eq!(grid.count(U), 40);
        assert_eq!(grid.count(E), 20);
        assert_eq!(engine.seed(), Some(1));
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = Engine::initialize(&small_config(5)).expect("valid config");
        let mut b = Engine::initialize(&small_config(5)).expect("valid config");
        assert_eq!(a.snapshot(), b.snapshot());
        for _ in 0..200 {
            assert_eq!(a.step(), b.step());
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_initialize_rejects_bad_config() {
        let config = SimulationConfig {
            vacancies: 0,
            ..small_config(1)
        };
        assert!(Engine::initialize(&config).is_err());

        let overflowing = SimulationConfig {
            rows: 2,
            cols: 2,
            groups: vec![usize::MAX, 5],
            vacancies: 0,
            ..small_config(1)
        };
        assert!(matches!(
            Engine::initialize(&overflowing),
            Err(crate::core::error::SchellingError::CompositionMismatch { expected: 4, .. })
        ));
    }

    #[test]
    fn test_satisfied_agent_leaves_grid_unchanged() {
        // Single group: nobody is ever dissatisfied
        let mut engine = engine_from(2, 2, vec![T, T, E, T]);
        let before = engine.snapshot();
        let result = engine.step();
        assert!(!result.moved());
        assert!(matches!(result.outcome, StepOutcome::AlreadySatisfied { .. }));
        assert_eq!(result.step_index, 1);
        assert_eq!(engine.grid().occupants(), before.occupants());
    }

    #[test]
    fn test_dissatisfied_agent_moves_to_vacancy() {
        // Both interior T agents are dissatisfied and (1,2) satisfies them
        #[rustfmt::skip]
        let mut engine = engine_from(2, 3, vec![
            U, T, U,
            T, T, E,
        ]);
        let mut moved = None;
        for _ in 0..100 {
            let result = engine.step();
            if result.moved() {
                moved = Some(result);
                break;
            }
        }
        let result = moved.expect("someone should move");
        let to = result.to().expect("destination");
        let from = result.from().expect("origin");
        assert_eq!(engine.grid().occupant(from), E);
        assert_ne!(engine.grid().occupant(to), E);
        assert_eq!(engine.moves(), 1);
    }

    #[test]
    fn test_step_budget_stops_engine() {
        let mut engine = Engine::initialize(&small_config(3))
            .expect("valid config")
            .with_max_steps(Some(5));
        for i in 1..=5 {
            assert_eq!(engine.step().step_index, i);
        }
        assert_eq!(engine.state(), EngineState::Stopped);
        let result = engine.step();
        assert_eq!(result.outcome, StepOutcome::Stopped);
        assert_eq!(result.step_index, 5);
        assert_eq!(engine.step_count(), 5);
    }

    #[test]
    fn test_halt() {
        let mut engine = Engine::initialize(&small_config(3)).expect("valid config");
        engine.step();
        engine.halt();
        assert_eq!(engine.step().outcome, StepOutcome::Stopped);
        let report = engine.run(Some(10));
        assert_eq!(report.steps, 0);
        assert_eq!(report.stop_reason, StopReason::Halted);
    }

    #[test]
    fn test_no_agents_is_a_noop_step() {
        let mut engine = engine_from(2, 2, vec![E; 4]);
        let result = engine.step();
        assert_eq!(result.outcome, StepOutcome::NoAgents);
        assert_eq!(engine.step_count(), 1);
        assert!(engine.is_stable());
    }

    #[test]
    fn test_observers_see_every_step() {
        let seen: Rc<RefCell<Vec<Step>>> = Rc::default();
        let mut engine = Engine::initialize(&small_config(8)).expect("valid config");
        let sink = Rc::clone(&seen);
        engine.register_observer(move |snap: &GridSnapshot, step: Step| {
            assert_eq!(snap.step, step);
            sink.borrow_mut().push(step);
        });
        engine.run(Some(4));
        assert_eq!(*seen.borrow(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let engine = engine_from(1, 3, vec![T, E, U]);
        let mut snapshot = engine.snapshot();
        snapshot.step = 99;
        assert_eq!(engine.grid().occupant(Position::new(0, 1)), E);
        assert_eq!(engine.snapshot().step, 0);
    }

    #[test]
    fn test_run_stops_when_stable() {
        let config = SimulationConfig {
            stability_check_interval: Some(1),
            ..small_config(2)
        };
        let mut engine = Engine::initialize(&config).expect("valid config");
        let report = engine.run(Some(200_000));
        if report.stop_reason == StopReason::Stable {
            assert!(engine.is_stable());
            assert_eq!(engine.unsatisfied_count(), 0);
        } else {
            assert_eq!(report.steps, 200_000);
        }
    }
}
