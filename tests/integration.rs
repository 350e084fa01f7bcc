//! Integration tests for STRIDER

use strider::events::NullSink;
use strider::fitness::Termination;
use strider::simulation::{sweep, RunSummary};
use strider::stats::StatsHistory;
use strider::{ActivityLog, Config, Genome, SimEvent, Simulation, StepOutcome};

fn small_config() -> Config {
    let mut config = Config::default();
    config.course.count = 10;
    config
}

#[test]
fn test_full_evolution_cycle() {
    let mut sim = Simulation::with_sink(small_config(), 12345, ActivityLog::new(1000)).unwrap();

    sim.run_generations(3).unwrap();

    assert_eq!(sim.ga.generation(), 3);
    assert_eq!(sim.ga.population().len(), 6);
    // 18 finished attempts plus the one already set up for generation 3
    assert_eq!(sim.metrics.total_attempts, 19);
    assert_eq!(sim.history.generations.len(), 3);

    // Every genome stays structurally valid across generations
    let bounds = &sim.config.genome;
    for genome in sim.ga.population() {
        assert_eq!(genome.points()[0], strider::Point::ORIGIN);
        assert!(genome.len() >= bounds.min_points);
        assert!(genome.rotation_speed.abs() <= bounds.max_speed + 1e-6);
        for p in &genome.points()[1..] {
            assert!(p.x >= bounds.min_x && p.x <= bounds.max_x);
            assert!(p.y >= bounds.min_y && p.y <= bounds.max_y);
        }
    }

    // Best-ever never decreases
    let records: Vec<f32> = sim.history.generations.iter().map(|s| s.best_ever).collect();
    assert!(records.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*records.last().unwrap(), sim.ga.best_fitness());
}

#[test]
fn test_reproducibility() {
    let config = small_config();

    let mut sim1 = Simulation::with_sink(config.clone(), 99999, NullSink).unwrap();
    let mut sim2 = Simulation::with_sink(config, 99999, NullSink).unwrap();

    sim1.run_generations(2).unwrap();
    sim2.run_generations(2).unwrap();

    assert_eq!(sim1.course.obstacles(), sim2.course.obstacles());
    assert_eq!(sim1.ga.population(), sim2.ga.population());
    assert_eq!(sim1.history.best_series(), sim2.history.best_series());
    assert_eq!(sim1.clock_ms(), sim2.clock_ms());
}

#[test]
fn test_frame_driven_matches_headless() {
    let config = small_config();
    let mut headless = Simulation::with_sink(config.clone(), 5, NullSink).unwrap();
    let mut framed = Simulation::with_sink(config, 5, NullSink).unwrap();

    let expected = headless.run_attempt().unwrap();

    let mut now = 0;
    framed.start_attempt(now).unwrap();
    let result = loop {
        now += 16;
        if let StepOutcome::Finished(result) = framed.step(now).unwrap() {
            break result;
        }
    };

    assert_eq!(result.fitness, expected.fitness);
    assert_eq!(result.termination, expected.termination);
    assert_eq!(result.ticks, expected.ticks);
}

#[test]
fn test_reset_keeps_running() {
    let mut sim = Simulation::with_sink(small_config(), 2024, ActivityLog::new(1000)).unwrap();
    sim.run_generations(1).unwrap();

    sim.reset();

    assert_eq!(sim.ga.generation(), 0);
    assert_eq!(sim.ga.best_fitness(), 0.0);
    assert_eq!(sim.metrics.snapshot().total_attempts, 0);

    sim.run_generations(1).unwrap();
    assert_eq!(sim.ga.generation(), 1);
    assert_eq!(sim.history.generations.len(), 1);
    assert_eq!(sim.sink().count(|e| *e == SimEvent::Reset), 1);
}

#[test]
fn test_events_per_generation() {
    let mut sim = Simulation::with_sink(small_config(), 31, ActivityLog::new(1000)).unwrap();

    sim.run_generations(2).unwrap();

    let log = sim.sink();
    let started = log.count(|e| matches!(e, SimEvent::AttemptStarted { .. }));
    let ended = log.count(|e| matches!(e, SimEvent::FellOff | SimEvent::Stuck | SimEvent::TimedOut));
    let generations = log.count(|e| matches!(e, SimEvent::GenerationComplete { .. }));

    assert_eq!(ended, 12);
    assert_eq!(started, 13);
    assert_eq!(generations, 2);
    assert!(log.count(|e| matches!(e, SimEvent::NewRecord { .. })) >= 1 || sim.ga.best_fitness() == 0.0);
}

#[test]
fn test_best_genome_replays_to_same_fitness() {
    let mut sim = Simulation::with_sink(small_config(), 777, NullSink).unwrap();
    sim.run_generations(2).unwrap();

    let best = match sim.ga.best_genome() {
        Some(best) => best.clone(),
        None => return,
    };

    let json = best.to_json().unwrap();
    let restored = Genome::from_json(&json).unwrap();
    assert_eq!(restored.points(), best.points());

    let eval = sim.evaluate(&restored);
    assert_eq!(eval.fitness, sim.ga.best_fitness());
}

#[test]
fn test_history_persistence() {
    let mut sim = Simulation::with_sink(small_config(), 54321, NullSink).unwrap();
    sim.run_generations(2).unwrap();

    let path = std::env::temp_dir().join("strider_integration_history.json");
    let path = path.to_string_lossy().to_string();
    sim.history.save(&path).expect("Failed to save history");

    let loaded = StatsHistory::load(&path).expect("Failed to load history");

    assert_eq!(loaded.generations, sim.history.generations);
    assert_eq!(loaded.interval, sim.history.interval);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_config_file_roundtrip() {
    let path = std::env::temp_dir().join("strider_integration_config.yaml");
    let mut config = small_config();
    config.evolution.population_size = 8;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.evolution.population_size, 8);
    assert_eq!(loaded.course.count, 10);
    let sim = Simulation::with_sink(loaded, 1, NullSink).unwrap();
    assert_eq!(sim.ga.population().len(), 8);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_sweep_matches_sequential_runs() {
    let config = small_config();

    let results = sweep(&config, &[3, 4], 1);

    for result in results {
        let summary = result.unwrap();
        let mut sim = Simulation::with_sink(config.clone(), summary.seed, NullSink).unwrap();
        sim.run_generations(1).unwrap();
        assert_eq!(summary.best_fitness, sim.ga.best_fitness());
    }
}

#[test]
fn test_no_attempt_outlives_timeout() {
    let mut sim = Simulation::with_sink(small_config(), 8, NullSink).unwrap();
    let limit = sim.config.attempt.timeout_ms + sim.config.attempt.tick_ms;

    for _ in 0..12 {
        let result = sim.run_attempt().unwrap();
        assert!(result.elapsed_ms <= limit);
        if result.termination == Termination::TimedOut {
            assert!(result.elapsed_ms > sim.config.attempt.timeout_ms);
        }
        assert!(result.fitness >= 0.0);
    }
}

#[test]
fn test_run_summary_rebuilds_course_for_replay() {
    let mut sim = Simulation::with_sink(small_config(), 4242, NullSink).unwrap();
    sim.run_generations(2).unwrap();

    let path = std::env::temp_dir().join("strider_integration_run_summary.json");
    sim.summary().save(&path).unwrap();
    let loaded = RunSummary::load(&path).unwrap();

    let replay = Simulation::with_sink(small_config(), loaded.seed, NullSink).unwrap();
    assert_eq!(replay.course.obstacles(), sim.course.obstacles());
    if let Some(best) = loaded.best_genome {
        assert_eq!(replay.evaluate(&best).fitness, sim.ga.best_fitness());
    }

    std::fs::remove_file(path).ok();
}

#[test]
fn test_invalid_config_fails_fast() {
    let mut config = small_config();
    config.attempt.tick_ms = 0;

    assert!(Simulation::with_sink(config.clone(), 1, NullSink).is_err());
    assert!(sweep(&config, &[1], 1).iter().all(|r| r.is_err()));
}
