//! STRIDER - CLI Entry Point
//!
//! Headless leg evolution.

use clap::{Parser, Subcommand};
use rand::Rng;
use strider::events::LogSink;
use strider::simulation::{sweep, RunSummary, Simulation};
use strider::{benchmark, ActivityLog, Config, Genome};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Written beside the best genome so `replay` can rebuild the same course
const RUN_SUMMARY_FILE: &str = "run_summary.json";

#[derive(Parser)]
#[command(name = "strider")]
#[command(version)]
#[command(about = "Evolves 2D leg shapes that carry a body across an obstacle course")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new evolution
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations to evolve
        #[arg(short, long, default_value = "50")]
        generations: u32,

        /// Output directory for history and best genome
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Evaluate a saved genome on a course
    Replay {
        /// Genome file (JSON)
        genome: PathBuf,

        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Seed for the course layout; defaults to the seed in the
        /// `run_summary.json` next to the genome
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Compare independent runs with different seeds
    Sweep {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of seeds, starting at 0
        #[arg(short, long, default_value = "8")]
        seeds: u64,

        /// Generations per seed
        #[arg(short, long, default_value = "20")]
        generations: u32,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of attempts
        #[arg(short, long, default_value = "60")]
        attempts: u32,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            generations,
            output,
            seed,
            quiet,
        } => run_evolution(config, generations, output, seed, quiet),

        Commands::Replay {
            genome,
            config,
            seed,
        } => replay_genome(genome, config, seed),

        Commands::Sweep {
            config,
            seeds,
            generations,
        } => run_sweep(config, seeds, generations),

        Commands::Benchmark { attempts, seed } => {
            init_logging("info");
            run_benchmark(attempts, seed)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }
    }
}

/// `RUST_LOG` wins over the configured level
fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

/// Load the config (or defaults) and start logging at its level
fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        println!("Loading config from: {:?}", path);
        Config::from_file(path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };

    init_logging(&config.logging.log_level);
    Ok(config)
}

fn run_evolution(
    config_path: PathBuf,
    generations: u32,
    output: PathBuf,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;

    std::fs::create_dir_all(&output)?;

    let seed = match seed {
        Some(s) => {
            println!("Using seed: {}", s);
            s
        }
        None => rand::thread_rng().gen(),
    };
    let activity = ActivityLog::new(config.logging.activity_capacity);
    let mut sim = Simulation::with_sink(config.clone(), seed, (LogSink, activity))?;

    println!("Starting evolution");
    println!("  Population: {}", config.evolution.population_size);
    println!("  Obstacles: {}", sim.course.len());
    println!("  Generations: {}", generations);
    println!();

    let start = Instant::now();
    let mut ticks = 0u64;

    for _ in 0..generations {
        if sim.ga.is_complete() {
            println!("\nGeneration limit {} reached", config.evolution.max_generations);
            break;
        }

        let generation = sim.ga.generation();
        while sim.ga.generation() == generation {
            ticks += sim.run_attempt()?.ticks;
        }

        if !quiet {
            if let Some(summary) = sim.ga.last_summary() {
                println!("{}", summary.summary());
            }
        }
    }

    let elapsed = start.elapsed();

    println!();
    println!("=== Evolution Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generations: {}", sim.ga.generation());
    println!("Attempts: {}", sim.metrics.total_attempts);
    println!(
        "Speed: {:.1} ticks/s",
        ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("Best fitness: {:.1}", sim.ga.best_fitness());
    println!("Seed: {}", sim.seed());

    if !quiet {
        println!();
        println!("Recent activity:");
        for entry in sim.sink().1.entries().take(10) {
            println!("  [{:>8}ms] {} {}", entry.at_ms, entry.icon, entry.message);
        }
    }

    let history_path = output.join("history.json");
    sim.history.save(&history_path.to_string_lossy())?;
    println!("Stats history: {:?}", history_path);

    if let Some(best) = sim.ga.best_genome() {
        let genome_path = output.join("best_genome.json");
        std::fs::write(&genome_path, best.to_json()?)?;
        println!("Best genome: {:?}", genome_path);
    }

    let summary_path = output.join(RUN_SUMMARY_FILE);
    sim.summary().save(&summary_path)?;
    println!("Run summary: {:?}", summary_path);

    Ok(())
}

/// Seed of the run that produced `genome_path`, if its summary sits beside it
fn recorded_seed(genome_path: &Path) -> Option<u64> {
    let summary_path = genome_path.parent()?.join(RUN_SUMMARY_FILE);
    match RunSummary::load(&summary_path) {
        Ok(summary) => Some(summary.seed),
        Err(e) => {
            log::debug!("No run summary at {:?}: {}", summary_path, e);
            None
        }
    }
}

fn replay_genome(
    genome_path: PathBuf,
    config_path: PathBuf,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    let genome = Genome::from_json(&std::fs::read_to_string(&genome_path)?)?;

    let recorded = recorded_seed(&genome_path);
    let seed = match (seed, recorded) {
        (Some(s), Some(r)) if s != r => {
            log::warn!(
                "Replay seed {} differs from the run seed {}; the course layout will differ",
                s,
                r
            );
            s
        }
        (Some(s), _) => s,
        (None, Some(r)) => r,
        (None, None) => {
            log::warn!("No run summary next to the genome; replaying on the seed 0 course");
            0
        }
    };

    println!("=== Replay ===");
    println!("Genome: {:?}", genome_path);
    println!("  Points: {}", genome.len());
    println!("  Rotation speed: {:.3}", genome.rotation_speed);
    println!("  Course seed: {}", seed);
    println!();

    let sim = Simulation::new_with_seed(config, seed)?;
    let eval = sim.evaluate(&genome);

    println!("Termination: {:?}", eval.termination);
    println!("Distance: {:.1}", eval.distance);
    println!("Fitness: {:.1}", eval.fitness);
    println!("Duration: {}ms ({} ticks)", eval.elapsed_ms, eval.ticks);

    Ok(())
}

fn run_sweep(
    config_path: PathBuf,
    seeds: u64,
    generations: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    let seed_list: Vec<u64> = (0..seeds).collect();

    println!("=== Sweep ===");
    println!("Seeds: {}", seeds);
    println!("Generations: {}", generations);
    println!();

    let start = Instant::now();
    let results = sweep(&config, &seed_list, generations);

    let mut best: Option<(u64, f32)> = None;
    for result in results {
        let summary = result?;
        println!(
            "Seed:{:4} | Gen:{:4} | Attempts:{:6} | Best:{:7.1}",
            summary.seed, summary.generations, summary.attempts, summary.best_fitness
        );
        if best.map_or(true, |(_, f)| summary.best_fitness > f) {
            best = Some((summary.seed, summary.best_fitness));
        }
    }

    println!();
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());
    if let Some((seed, fitness)) = best {
        println!("Best seed: {} ({:.1})", seed, fitness);
    }

    Ok(())
}

fn run_benchmark(attempts: u32, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== STRIDER Benchmark ===");
    println!("Attempts: {}", attempts);
    println!("Seed: {}", seed);
    println!();

    let result = benchmark(attempts, seed)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
