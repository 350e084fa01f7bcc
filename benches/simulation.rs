//! Performance benchmarks for STRIDER

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use strider::character::Character;
use strider::config::GenomeConfig;
use strider::events::NullSink;
use strider::legs::LegSystem;
use strider::physics::PhysicsEngine;
use strider::{Config, Genome, GeneticAlgorithm, Simulation};

fn benchmark_physics_step(c: &mut Criterion) {
    let config = Config::default();
    let sim = Simulation::with_sink(config.clone(), 42, NullSink).unwrap();
    let engine = PhysicsEngine::new(config.physics.clone());

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let legs = LegSystem::new(Genome::generate_random(&GenomeConfig::default(), &mut rng));
    let mut character = Character::from_config(&config.attempt);

    c.bench_function("physics_step", |b| {
        b.iter(|| {
            legs.update(&mut character);
            let segments = legs.legs(&character);
            engine.step(black_box(&mut character), sim.course.obstacles(), &segments)
        });
    });
}

fn benchmark_attempt(c: &mut Criterion) {
    let mut sim = Simulation::with_sink(Config::default(), 42, NullSink).unwrap();

    c.bench_function("run_attempt", |b| {
        b.iter(|| sim.run_attempt().unwrap());
    });
}

fn benchmark_evolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve");

    for population in [6, 30, 120].iter() {
        let mut config = Config::default();
        config.evolution.population_size = *population;

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut ga = GeneticAlgorithm::from_config(&config);
        ga.initialize(&mut rng);

        group.bench_with_input(
            BenchmarkId::new("population", population),
            population,
            |b, _| {
                b.iter(|| ga.evolve(&mut rng));
            },
        );
    }

    group.finish();
}

fn benchmark_genome_ops(c: &mut Criterion) {
    let bounds = GenomeConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let a = Genome::generate_random(&bounds, &mut rng);
    let b = Genome::generate_random(&bounds, &mut rng);

    c.bench_function("genome_crossover_mutate", |bench| {
        bench.iter(|| {
            Genome::crossover(black_box(&a), black_box(&b), &mut rng).mutate(0.4, 20.0, &bounds, &mut rng)
        });
    });
}

criterion_group!(
    benches,
    benchmark_physics_step,
    benchmark_attempt,
    benchmark_evolve,
    benchmark_genome_ops,
);

criterion_main!(benches);
