//! Simulation driver context: sequences attempts, one genome at a time.
//!
//! A driver calls [`Simulation::step`] once per frame with a monotonic clock
//! reading in milliseconds. Headless callers use [`Simulation::run_attempt`]
//! and [`Simulation::run_generations`], which advance an internal virtual
//! clock by `attempt.tick_ms` per tick instead.

use crate::character::Character;
use crate::config::{Config, ConfigError};
use crate::course::Course;
use crate::events::{EventSink, LogSink, SimEvent};
use crate::evolution::{EvolutionError, GaStats, GeneticAlgorithm};
use crate::fitness::{FitnessEvaluator, Termination};
use crate::genome::Genome;
use crate::legs::{LegSegment, LegSystem};
use crate::physics::{PhysicsEngine, StepReport};
use crate::stats::{Metrics, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors surfaced to the driver
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Evolution(#[from] EvolutionError),
}

/// Result of one finished attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResult {
    pub generation: u32,
    pub index: usize,
    pub genome: Genome,
    pub fitness: f32,
    pub distance: f32,
    pub termination: Termination,
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub new_record: bool,
    pub new_generation: bool,
}

/// What a call to `step` did
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// A new attempt was set up; no physics ran
    Started,
    /// One tick ran and the attempt continues
    Running(StepReport),
    /// One tick ran and ended the attempt; the next attempt is already set up
    Finished(AttemptResult),
}

/// Outcome of evaluating a genome outside the population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub fitness: f32,
    pub distance: f32,
    pub termination: Termination,
    pub ticks: u64,
    pub elapsed_ms: u64,
}

/// Per-seed result of a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub generations: u32,
    pub attempts: u64,
    pub best_fitness: f32,
    pub best_genome: Option<Genome>,
}

impl RunSummary {
    /// Save summary to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load summary from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

struct Attempt {
    legs: LegSystem,
    start_ms: u64,
    ticks: u64,
}

/// The mutable simulation context owned by a driver
pub struct Simulation<S: EventSink = LogSink> {
    pub config: Config,
    pub ga: GeneticAlgorithm,
    pub course: Course,
    pub character: Character,
    pub physics: PhysicsEngine,
    pub fitness: FitnessEvaluator,
    pub metrics: Metrics,
    pub history: StatsHistory,

    attempt: Option<Attempt>,
    /// Latest clock reading seen
    clock_ms: u64,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,

    sink: S,
}

impl Simulation<LogSink> {
    /// Create a simulation with a random seed, logging events through `log`
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a simulation with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self, ConfigError> {
        Self::with_sink(config, seed, LogSink)
    }
}

impl<S: EventSink> Simulation<S> {
    /// Create a simulation reporting events to `sink`.
    /// Fails if `config` does not pass [`Config::validate`].
    pub fn with_sink(config: Config, seed: u64, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let course = Course::generate(&config.course, config.physics.ground_y, &mut rng);
        let mut ga = GeneticAlgorithm::from_config(&config);
        ga.initialize(&mut rng);

        log::debug!(
            "Simulation created: seed={}, population={}, obstacles={}",
            seed,
            ga.population().len(),
            course.len()
        );

        Ok(Self {
            ga,
            course,
            character: Character::from_config(&config.attempt),
            physics: PhysicsEngine::new(config.physics.clone()),
            fitness: FitnessEvaluator::from_config(&config.attempt),
            metrics: Metrics::new(),
            history: StatsHistory::new(config.logging.history_interval),
            attempt: None,
            clock_ms: 0,
            rng,
            seed,
            sink,
            config,
        })
    }

    fn emit(&mut self, event: SimEvent) {
        self.sink.record(self.clock_ms, &event);
    }

    /// Set up an attempt for the current genome starting at `now_ms`
    pub fn start_attempt(&mut self, now_ms: u64) -> Result<(), SimulationError> {
        self.clock_ms = now_ms;
        let genome = self.ga.current_genome()?.clone();

        self.character
            .reset(self.config.attempt.start_x, self.config.attempt.start_y);
        self.attempt = Some(Attempt {
            legs: LegSystem::new(genome),
            start_ms: now_ms,
            ticks: 0,
        });
        self.metrics.start_attempt(now_ms);
        self.metrics.update_distance(0.0);

        let stats = self.ga.stats();
        self.emit(SimEvent::AttemptStarted {
            generation: stats.generation,
            index: stats.current_index,
            population_size: stats.population_size,
        });
        Ok(())
    }

    /// Run one tick at clock reading `now_ms`.
    ///
    /// Starts an attempt if none is running. Otherwise advances the legs and
    /// the body, then checks for termination; a finished attempt is scored,
    /// recorded and the next genome's attempt is set up at the same `now_ms`.
    pub fn step(&mut self, now_ms: u64) -> Result<StepOutcome, SimulationError> {
        self.clock_ms = now_ms;

        let mut attempt = match self.attempt.take() {
            Some(attempt) => attempt,
            None => {
                self.start_attempt(now_ms)?;
                return Ok(StepOutcome::Started);
            }
        };

        // Phase 1: rotate legs
        attempt.legs.update(&mut self.character);
        let segments = attempt.legs.legs(&self.character);

        // Phase 2: physics
        let report = self
            .physics
            .step(&mut self.character, self.course.obstacles(), &segments);
        attempt.ticks += 1;

        // Phase 3: terminal conditions
        let elapsed_ms = now_ms.saturating_sub(attempt.start_ms);
        let fell_off = self.physics.check_failure(&self.character);
        let stuck = self
            .physics
            .check_stuck(&self.character, self.character.start_x, elapsed_ms);

        // Phase 4: metrics
        self.metrics.update_distance(self.character.distance());
        self.metrics
            .update_fitness(self.fitness.score(&self.character, fell_off));

        // Phase 5: termination
        let start_ms = attempt.start_ms;
        self.attempt = Some(attempt);
        match self.fitness.termination(start_ms, now_ms, fell_off, stuck) {
            Some(termination) => {
                let result = self.finish_attempt(now_ms, termination)?;
                Ok(StepOutcome::Finished(result))
            }
            None => Ok(StepOutcome::Running(report)),
        }
    }

    fn finish_attempt(
        &mut self,
        now_ms: u64,
        termination: Termination,
    ) -> Result<AttemptResult, SimulationError> {
        let (start_ms, ticks) = match self.attempt.take() {
            Some(attempt) => (attempt.start_ms, attempt.ticks),
            None => (now_ms, 0),
        };

        let fell_off = termination == Termination::FellOff;
        let score = self.fitness.score(&self.character, fell_off);
        let generation = self.ga.generation();
        let index = self.ga.current_index();

        let new_record = self.ga.record_fitness(score)?;
        let genome = self.ga.current_genome()?.clone();

        match termination {
            Termination::FellOff => self.emit(SimEvent::FellOff),
            Termination::Stuck => self.emit(SimEvent::Stuck),
            Termination::TimedOut => self.emit(SimEvent::TimedOut),
        }
        if new_record {
            self.emit(SimEvent::NewRecord { fitness: score });
        }

        let new_generation = self.ga.advance(&mut self.rng)?;
        if new_generation {
            self.emit(SimEvent::GenerationComplete { generation });
            if let Some(summary) = self.ga.last_summary().cloned() {
                log::info!("{}", summary.summary());
                self.history.record(summary);
            }
        }
        self.metrics.update_generation(self.ga.generation());

        let result = AttemptResult {
            generation,
            index,
            genome,
            fitness: score,
            distance: self.character.distance(),
            termination,
            ticks,
            elapsed_ms: now_ms.saturating_sub(start_ms),
            new_record,
            new_generation,
        };

        self.start_attempt(now_ms)?;
        Ok(result)
    }

    /// Drive one whole attempt on the virtual clock
    pub fn run_attempt(&mut self) -> Result<AttemptResult, SimulationError> {
        if self.attempt.is_none() {
            self.start_attempt(self.clock_ms)?;
        }

        loop {
            let now = self.clock_ms + self.config.attempt.tick_ms;
            if let StepOutcome::Finished(result) = self.step(now)? {
                return Ok(result);
            }
        }
    }

    /// Drive attempts until `generations` more generations have been bred or
    /// the configured generation limit is reached
    pub fn run_generations(&mut self, generations: u32) -> Result<(), SimulationError> {
        let target = self.ga.generation().saturating_add(generations);
        while self.ga.generation() < target && !self.ga.is_complete() {
            self.run_attempt()?;
        }
        Ok(())
    }

    /// Run `genome` over the course on a private body and clock.
    /// Leaves the population, metrics and events untouched.
    pub fn evaluate(&self, genome: &Genome) -> Evaluation {
        let legs = LegSystem::new(genome.clone());
        let mut character = Character::from_config(&self.config.attempt);
        let tick_ms = self.config.attempt.tick_ms;
        let mut elapsed_ms = 0u64;
        let mut ticks = 0u64;

        loop {
            legs.update(&mut character);
            let segments = legs.legs(&character);
            self.physics
                .step(&mut character, self.course.obstacles(), &segments);
            ticks += 1;
            elapsed_ms += tick_ms;

            let fell_off = self.physics.check_failure(&character);
            let stuck = self
                .physics
                .check_stuck(&character, character.start_x, elapsed_ms);

            if let Some(termination) = self.fitness.termination(0, elapsed_ms, fell_off, stuck) {
                return Evaluation {
                    fitness: self.fitness.score(&character, fell_off),
                    distance: character.distance(),
                    termination,
                    ticks,
                    elapsed_ms,
                };
            }
        }
    }

    /// Start over: new course, new population, no record, empty metrics
    pub fn reset(&mut self) {
        self.course = Course::generate(
            &self.config.course,
            self.config.physics.ground_y,
            &mut self.rng,
        );
        self.ga.initialize(&mut self.rng);
        self.ga.clear_best();
        self.character
            .reset(self.config.attempt.start_x, self.config.attempt.start_y);
        self.attempt = None;
        self.metrics.reset();
        self.history.clear();

        self.emit(SimEvent::Reset);
    }

    /// Current leg geometry, empty between attempts
    pub fn legs(&self) -> Vec<LegSegment> {
        self.attempt
            .as_ref()
            .map(|a| a.legs.legs(&self.character))
            .unwrap_or_default()
    }

    /// Whether an attempt is in progress
    pub fn is_running(&self) -> bool {
        self.attempt.is_some()
    }

    pub fn stats(&self) -> GaStats {
        self.ga.stats()
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Condensed result of the run so far
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            generations: self.ga.generation(),
            attempts: self.metrics.total_attempts,
            best_fitness: self.ga.best_fitness(),
            best_genome: self.ga.best_genome().cloned(),
        }
    }
}

/// Evolve one independent simulation per seed in parallel
pub fn sweep(
    config: &Config,
    seeds: &[u64],
    generations: u32,
) -> Vec<Result<RunSummary, SimulationError>> {
    seeds
        .par_iter()
        .map(|&seed| {
            let mut sim = Simulation::with_sink(config.clone(), seed, crate::events::NullSink)?;
            sim.run_generations(generations)?;
            Ok(sim.summary())
        })
        .collect()
}
