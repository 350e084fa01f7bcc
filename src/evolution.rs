//! Generational genetic algorithm: one genome evaluated per attempt,
//! truncation selection and crossover + mutation once a generation is done.

use crate::config::{Config, EvolutionConfig, GenomeConfig};
use crate::genome::Genome;
use crate::stats::GenerationSummary;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller contract violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvolutionError {
    #[error("population is empty; call initialize() first")]
    EmptyPopulation,
    #[error("current index {index} is out of bounds for population of {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Progress counters exposed to drivers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaStats {
    pub generation: u32,
    pub current_index: usize,
    pub population_size: usize,
    pub best_fitness: f32,
    pub current_fitness: f32,
}

/// Population manager
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    pub config: EvolutionConfig,
    bounds: GenomeConfig,
    population: Vec<Genome>,
    current_index: usize,
    generation: u32,
    best_genome: Option<Genome>,
    best_fitness: f32,
    last_summary: Option<GenerationSummary>,
}

impl GeneticAlgorithm {
    /// Create an algorithm with an empty population; call `initialize` before use
    pub fn new(config: EvolutionConfig, bounds: GenomeConfig) -> Self {
        Self {
            config,
            bounds,
            population: Vec::new(),
            current_index: 0,
            generation: 0,
            best_genome: None,
            best_fitness: 0.0,
            last_summary: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.evolution.clone(), config.genome.clone())
    }

    /// Fill the population with random genomes and rewind to the first.
    /// The best-ever record is kept; see `clear_best`.
    pub fn initialize(&mut self, rng: &mut impl Rng) {
        self.population = (0..self.config.population_size)
            .map(|_| Genome::generate_random(&self.bounds, rng))
            .collect();
        self.generation = 0;
        self.current_index = 0;
        self.last_summary = None;
    }

    /// Forget the best-ever record
    pub fn clear_best(&mut self) {
        self.best_genome = None;
        self.best_fitness = 0.0;
    }

    /// Genome under evaluation
    pub fn current_genome(&self) -> Result<&Genome, EvolutionError> {
        if self.population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        self.population
            .get(self.current_index)
            .ok_or(EvolutionError::IndexOutOfBounds {
                index: self.current_index,
                len: self.population.len(),
            })
    }

    fn current_genome_mut(&mut self) -> Result<&mut Genome, EvolutionError> {
        let len = self.population.len();
        if len == 0 {
            return Err(EvolutionError::EmptyPopulation);
        }
        let index = self.current_index;
        self.population
            .get_mut(index)
            .ok_or(EvolutionError::IndexOutOfBounds { index, len })
    }

    /// Store `score` on the current genome. Returns whether it set a new
    /// best-ever record; ties keep the earlier record.
    pub fn record_fitness(&mut self, score: f32) -> Result<bool, EvolutionError> {
        let best_fitness = self.best_fitness;
        let genome = self.current_genome_mut()?;
        genome.fitness = score;
        genome.tested = true;

        if score > best_fitness {
            let snapshot = genome.clone();
            self.best_fitness = score;
            self.best_genome = Some(snapshot);
            return Ok(true);
        }
        Ok(false)
    }

    /// Move to the next genome, evolving when the generation is exhausted.
    /// Returns `true` when a new generation has started.
    pub fn advance(&mut self, rng: &mut impl Rng) -> Result<bool, EvolutionError> {
        if self.population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        self.current_index += 1;
        if self.current_index >= self.population.len() {
            self.evolve(rng);
            return Ok(true);
        }
        Ok(false)
    }

    /// Number of genomes kept as parents
    pub fn num_survivors(&self) -> usize {
        let len = self.population.len();
        let by_rate = (len as f32 * self.config.survival_rate).floor() as usize;
        by_rate.max(2).min(len)
    }

    /// Replace the population with survivors followed by their offspring
    pub fn evolve(&mut self, rng: &mut impl Rng) {
        if self.population.is_empty() {
            return;
        }

        self.last_summary = Some(GenerationSummary::from_population(
            self.generation,
            &self.population,
            self.best_fitness,
        ));

        // Stable: equal fitness keeps insertion order
        self.population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let size = self.population.len();
        let survivors = self.num_survivors();
        self.population.truncate(survivors);

        let mut offspring = Vec::with_capacity(size - survivors);
        while survivors + offspring.len() < size {
            let parent1 = &self.population[rng.gen_range(0..survivors)];
            let parent2 = &self.population[rng.gen_range(0..survivors)];

            let child = Genome::crossover(parent1, parent2, rng).mutate(
                self.config.mutation_rate,
                self.config.mutation_amount,
                &self.bounds,
                rng,
            );
            offspring.push(child);
        }

        self.population.extend(offspring);
        self.generation += 1;
        self.current_index = 0;

        log::debug!(
            "Generation {} bred: {} survivors, {} offspring",
            self.generation,
            survivors,
            size - survivors
        );
    }

    pub fn stats(&self) -> GaStats {
        GaStats {
            generation: self.generation,
            current_index: self.current_index,
            population_size: self.population.len(),
            best_fitness: self.best_fitness,
            current_fitness: self
                .population
                .get(self.current_index)
                .map(|g| g.fitness)
                .unwrap_or(0.0),
        }
    }

    /// Configured generation limit reached
    pub fn is_complete(&self) -> bool {
        self.generation >= self.config.max_generations
    }

    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn best_genome(&self) -> Option<&Genome> {
        self.best_genome.as_ref()
    }

    pub fn best_fitness(&self) -> f32 {
        self.best_fitness
    }

    /// Summary of the generation most recently replaced by `evolve`
    pub fn last_summary(&self) -> Option<&GenerationSummary> {
        self.last_summary.as_ref()
    }
}
