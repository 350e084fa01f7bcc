//! Configuration system for STRIDER runs.
//!
//! Supports YAML configuration files with sensible defaults. Every section is
//! optional in the file; missing sections fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub genome: GenomeConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub attempt: AttemptConfig,
    #[serde(default)]
    pub course: CourseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Genetic algorithm parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Genomes per generation
    pub population_size: usize,
    /// Fraction of the sorted population kept as parents
    pub survival_rate: f32,
    /// Per-gene mutation probability
    pub mutation_rate: f32,
    /// Maximum coordinate offset applied by a point mutation
    pub mutation_amount: f32,
    /// Generation count after which the run is complete
    pub max_generations: u32,
}

/// Genome shape limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenomeConfig {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    /// Fewest points in a freshly generated genome (origin included)
    pub min_points: usize,
    /// Most points in a freshly generated genome (origin included)
    pub max_points: usize,
    /// Initial rotation speeds are drawn from [-initial_speed, initial_speed]
    pub initial_speed: f32,
    /// Largest rotation speed change a single mutation applies
    pub speed_step: f32,
    /// Mutated rotation speeds are clamped to [-max_speed, max_speed]
    pub max_speed: f32,
}

/// Physics constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    /// Multiplicative velocity damping per step
    pub friction: f32,
    pub ground_y: f32,
    /// Vertical velocity set on ground contact (negative is upward)
    pub bounce_velocity: f32,
    /// Constant forward push added every step
    pub forward_bias: f32,
    /// Thrust per unit of backward tip speed for a contacting leg
    pub leg_thrust: f32,
    /// Upward assist per unit of thrust when a leg touches an obstacle top
    pub climb_assist: f32,
    /// Distance above a surface at which a leg tip counts as touching
    pub contact_tolerance: f32,
    /// Vertical position past which the body has fallen off
    pub fall_y: f32,
    /// Net displacement under which the body may be stuck
    pub stuck_distance: f32,
    /// Elapsed time after which low displacement means stuck
    pub stuck_timeout_ms: u64,
}

/// Per-attempt settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttemptConfig {
    /// Wall-clock limit for one attempt
    pub timeout_ms: u64,
    /// Fitness multiplier applied when the attempt ends by falling
    pub fell_penalty: f32,
    pub start_x: f32,
    pub start_y: f32,
    pub body_size: f32,
    /// Virtual clock advance per tick in headless runs
    pub tick_ms: u64,
}

/// Obstacle course layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    pub count: usize,
    pub first_x: f32,
    pub spacing: f32,
    pub width: f32,
    /// Inclusive lower bound of obstacle height
    pub min_height: u32,
    /// Exclusive upper bound of obstacle height
    pub max_height: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Entries kept by the activity log
    pub activity_capacity: usize,
    /// Generations between recorded history summaries
    pub history_interval: u32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 6,
            survival_rate: 0.33,
            mutation_rate: 0.4,
            mutation_amount: 20.0,
            max_generations: 1000,
        }
    }
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            min_x: -25.0,
            max_x: 25.0,
            min_y: 15.0,
            max_y: 60.0,
            min_points: 3,
            max_points: 4,
            initial_speed: 0.1,
            speed_step: 0.02,
            max_speed: 0.15,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            friction: 0.98,
            ground_y: 530.0,
            bounce_velocity: -2.0,
            forward_bias: 0.3,
            leg_thrust: 0.05,
            climb_assist: 3.0,
            contact_tolerance: 4.0,
            fall_y: 580.0,
            stuck_distance: 20.0,
            stuck_timeout_ms: 2000,
        }
    }
}

impl Default for AttemptConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 6000,
            fell_penalty: 0.7,
            start_x: 100.0,
            start_y: 450.0,
            body_size: 30.0,
            tick_ms: 16,
        }
    }
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            count: 50,
            first_x: 250.0,
            spacing: 180.0,
            width: 100.0,
            min_height: 30,
            max_height: 90,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            activity_capacity: 50,
            history_interval: 1,
        }
    }
}

/// Errors raised while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.float_settings().iter().any(|v| !v.is_finite()) {
            return invalid("numeric settings must be finite");
        }

        let evo = &self.evolution;
        if evo.population_size < 2 {
            return invalid("population_size must be at least 2");
        }
        if !(0.0..=1.0).contains(&evo.survival_rate) {
            return invalid("survival_rate must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&evo.mutation_rate) {
            return invalid("mutation_rate must be within [0, 1]");
        }
        if evo.mutation_amount < 0.0 {
            return invalid("mutation_amount must be non-negative");
        }

        let genome = &self.genome;
        if genome.min_x > genome.max_x || genome.min_y > genome.max_y {
            return invalid("genome bounds are inverted");
        }
        if genome.min_points < 2 || genome.min_points > genome.max_points {
            return invalid("genome point counts must satisfy 2 <= min_points <= max_points");
        }
        if genome.initial_speed < 0.0 || genome.speed_step < 0.0 || genome.max_speed < 0.0 {
            return invalid("rotation speed limits must be non-negative");
        }

        if !(self.physics.friction > 0.0 && self.physics.friction <= 1.0) {
            return invalid("friction must be within (0, 1]");
        }
        if !(0.0..=1.0).contains(&self.attempt.fell_penalty) {
            return invalid("fell_penalty must be within [0, 1]");
        }
        if self.attempt.timeout_ms == 0 || self.attempt.tick_ms == 0 {
            return invalid("timeout_ms and tick_ms must be > 0");
        }
        if self.attempt.body_size <= 0.0 {
            return invalid("body_size must be > 0");
        }
        if self.course.min_height >= self.course.max_height {
            return invalid("course min_height must be below max_height");
        }
        Ok(())
    }

    fn float_settings(&self) -> [f32; 27] {
        let (e, g, p, a, c) = (
            &self.evolution,
            &self.genome,
            &self.physics,
            &self.attempt,
            &self.course,
        );
        [
            e.survival_rate,
            e.mutation_rate,
            e.mutation_amount,
            g.min_x,
            g.max_x,
            g.min_y,
            g.max_y,
            g.initial_speed,
            g.speed_step,
            g.max_speed,
            p.gravity,
            p.friction,
            p.ground_y,
            p.bounce_velocity,
            p.forward_bias,
            p.leg_thrust,
            p.climb_assist,
            p.contact_tolerance,
            p.fall_y,
            p.stuck_distance,
            a.fell_penalty,
            a.start_x,
            a.start_y,
            a.body_size,
            c.first_x,
            c.spacing,
            c.width,
        ]
    }
}
