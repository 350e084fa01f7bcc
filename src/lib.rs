//! # STRIDER
//!
//! Evolves 2D leg shapes that carry a square body across an obstacle course.
//!
//! ## Features
//!
//! - **Evolvable**: each genome is a polyline of leg points plus a rotation speed
//! - **Physical**: legs push the body forward only while touching a surface
//! - **Parallel**: multi-seed sweeps across all CPU cores via Rayon
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use strider::{Config, Simulation};
//!
//! let mut sim = Simulation::new_with_seed(Config::default(), 42).unwrap();
//!
//! // Evaluate every genome of ten generations
//! sim.run_generations(10).unwrap();
//!
//! println!("Best fitness: {:.1}", sim.ga.best_fitness());
//! println!("{}", sim.metrics.summary());
//! ```
//!
//! ## Driving from a frame loop
//!
//! ```rust,no_run
//! use strider::{Config, Simulation, StepOutcome};
//!
//! let mut sim = Simulation::new_with_seed(Config::default(), 7).unwrap();
//! let mut now_ms = 0;
//! loop {
//!     now_ms += 16;
//!     if let StepOutcome::Finished(result) = sim.step(now_ms).unwrap() {
//!         println!("{:?} after {}ms: {:.1}", result.termination, result.elapsed_ms, result.fitness);
//!         break;
//!     }
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use strider::Config;
//!
//! let mut config = Config::default();
//! config.evolution.population_size = 12;
//! config.evolution.mutation_rate = 0.2;
//! assert!(config.validate().is_ok());
//! ```

pub mod character;
pub mod config;
pub mod course;
pub mod events;
pub mod evolution;
pub mod fitness;
pub mod genome;
pub mod legs;
pub mod physics;
pub mod simulation;
pub mod stats;

// Re-export main types
pub use config::Config;
pub use events::{ActivityLog, EventSink, SimEvent};
pub use evolution::GeneticAlgorithm;
pub use genome::{Genome, Point};
pub use simulation::{AttemptResult, Simulation, StepOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(attempts: u32, seed: u64) -> Result<BenchmarkResult, simulation::SimulationError> {
    use std::time::Instant;

    let mut sim = Simulation::with_sink(Config::default(), seed, events::NullSink)?;

    let start = Instant::now();
    let mut ticks = 0;
    for _ in 0..attempts {
        ticks += sim.run_attempt()?.ticks;
    }
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        attempts,
        ticks,
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        generation: sim.ga.generation(),
        best_fitness: sim.ga.best_fitness(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub attempts: u32,
    pub ticks: u64,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
    pub generation: u32,
    pub best_fitness: f32,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Attempts: {}", self.attempts)?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        writeln!(f, "Generation reached: {}", self.generation)?;
        writeln!(f, "Best fitness: {:.1}", self.best_fitness)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_simulation() {
        let mut sim = Simulation::with_sink(Config::default(), 1, events::NullSink).unwrap();

        sim.run_attempt().unwrap();

        assert_eq!(sim.ga.current_index(), 1);
        assert!(sim.clock_ms() > 0);
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(3, 42).unwrap();

        assert_eq!(result.attempts, 3);
        assert!(result.ticks >= 3);
        assert!(result.ticks_per_second > 0.0);
    }
}
