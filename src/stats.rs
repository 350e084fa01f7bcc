//! Statistics tracking: live per-attempt metrics and per-generation history.

use crate::genome::Genome;
use serde::{Deserialize, Serialize};

/// Fitness summary of one finished generation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Index of the generation that was evaluated
    pub generation: u32,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub worst_fitness: f32,
    /// Best-ever fitness at the end of this generation
    pub best_ever: f32,
    /// Genomes that were actually evaluated
    pub tested: usize,
}

impl GenerationSummary {
    /// Summarize a population before it is replaced
    pub fn from_population(generation: u32, population: &[Genome], best_ever: f32) -> Self {
        if population.is_empty() {
            return Self {
                generation,
                best_ever,
                ..Self::default()
            };
        }

        let fitness = population.iter().map(|g| g.fitness);
        let best_fitness = fitness.clone().fold(f32::MIN, f32::max);
        let worst_fitness = fitness.clone().fold(f32::MAX, f32::min);
        let mean_fitness = fitness.sum::<f32>() / population.len() as f32;

        Self {
            generation,
            best_fitness,
            mean_fitness,
            worst_fitness,
            best_ever,
            tested: population.iter().filter(|g| g.tested).count(),
        }
    }

    /// Format as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Gen:{:4} | Best:{:7.1} | Mean:{:7.1} | Worst:{:7.1} | Record:{:7.1}",
            self.generation, self.best_fitness, self.mean_fitness, self.worst_fitness, self.best_ever
        )
    }
}

/// Historical generation tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// Recorded generation summaries, oldest first
    pub generations: Vec<GenerationSummary>,
    /// Record every `interval` generations
    pub interval: u32,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u32) -> Self {
        Self {
            generations: Vec::new(),
            interval: interval.max(1),
        }
    }

    /// Record a summary if it falls on the interval
    pub fn record(&mut self, summary: GenerationSummary) -> bool {
        if summary.generation % self.interval.max(1) != 0 {
            return false;
        }
        self.generations.push(summary);
        true
    }

    pub fn latest(&self) -> Option<&GenerationSummary> {
        self.generations.last()
    }

    pub fn clear(&mut self) {
        self.generations.clear();
    }

    /// Best fitness per generation
    pub fn best_series(&self) -> Vec<(u32, f32)> {
        self.generations
            .iter()
            .map(|s| (s.generation, s.best_fitness))
            .collect()
    }

    /// Mean fitness per generation
    pub fn mean_series(&self) -> Vec<(u32, f32)> {
        self.generations
            .iter()
            .map(|s| (s.generation, s.mean_fitness))
            .collect()
    }

    /// Save history to file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load history from file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// Display values of `Metrics`, floored to whole pixels
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub generation: u32,
    pub current_distance: i64,
    pub best_distance: i64,
    pub total_attempts: u64,
    pub current_fitness: i64,
    /// Current distance relative to the best, 0 when nothing is recorded yet
    pub progress: f32,
}

/// Live counters mirrored from the simulation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub generation: u32,
    pub current_distance: f32,
    pub best_distance: f32,
    pub total_attempts: u64,
    pub current_fitness: f32,
    /// Clock reading when the current attempt began
    pub attempt_start_ms: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn start_attempt(&mut self, now_ms: u64) {
        self.attempt_start_ms = now_ms;
        self.total_attempts += 1;
    }

    pub fn update_distance(&mut self, distance: f32) {
        self.current_distance = distance;
    }

    pub fn update_fitness(&mut self, fitness: f32) {
        self.current_fitness = fitness;
        if fitness > self.best_distance {
            self.best_distance = fitness;
        }
    }

    pub fn update_generation(&mut self, generation: u32) {
        self.generation = generation;
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.attempt_start_ms)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            generation: self.generation,
            current_distance: self.current_distance.floor() as i64,
            best_distance: self.best_distance.floor() as i64,
            total_attempts: self.total_attempts,
            current_fitness: self.current_fitness.floor() as i64,
            progress: if self.best_distance > 0.0 {
                self.current_distance / self.best_distance
            } else {
                0.0
            },
        }
    }

    /// Format as a one-line summary
    pub fn summary(&self) -> String {
        let s = self.snapshot();
        format!(
            "Gen:{:4} | Attempts:{:6} | Dist:{:6} | Best:{:6} | Progress:{:5.1}%",
            s.generation,
            s.total_attempts,
            s.current_distance,
            s.best_distance,
            s.progress * 100.0
        )
    }
}
