//! Leg genome: a polyline anchored at the body centre plus a rotation speed.

use crate::config::GenomeConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 2D point in leg-local coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Componentwise midpoint
    pub fn midpoint(self, other: Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Clamp into the genome rectangle
    pub fn clamped(self, bounds: &GenomeConfig) -> Point {
        Point {
            x: self.x.clamp(bounds.min_x, bounds.max_x),
            y: self.y.clamp(bounds.min_y, bounds.max_y),
        }
    }
}

/// Rejected genome constructions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenomeError {
    #[error("genome has no points")]
    Empty,
    #[error("first genome point must be the origin, found ({x}, {y})")]
    OriginMoved { x: f32, y: f32 },
}

/// Candidate leg design.
///
/// The point sequence is private so the origin invariant (`points[0] == (0, 0)`)
/// cannot be broken from outside; all constructors check or establish it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGenome")]
pub struct Genome {
    points: Vec<Point>,
    /// Radians added to the leg assembly angle per step
    pub rotation_speed: f32,
    /// Last recorded score
    pub fitness: f32,
    /// Whether `fitness` is valid for the current generation
    pub tested: bool,
}

#[derive(Deserialize)]
struct RawGenome {
    points: Vec<Point>,
    rotation_speed: f32,
    #[serde(default)]
    fitness: f32,
    #[serde(default)]
    tested: bool,
}

impl TryFrom<RawGenome> for Genome {
    type Error = GenomeError;

    fn try_from(raw: RawGenome) -> Result<Self, Self::Error> {
        let mut genome = Genome::new(raw.points, raw.rotation_speed)?;
        genome.fitness = raw.fitness;
        genome.tested = raw.tested;
        Ok(genome)
    }
}

impl Genome {
    /// Build an untested genome, checking the origin invariant
    pub fn new(points: Vec<Point>, rotation_speed: f32) -> Result<Self, GenomeError> {
        match points.first() {
            None => Err(GenomeError::Empty),
            Some(&p) if p != Point::ORIGIN => Err(GenomeError::OriginMoved { x: p.x, y: p.y }),
            Some(_) => Ok(Self::from_points_unchecked(points, rotation_speed)),
        }
    }

    fn from_points_unchecked(points: Vec<Point>, rotation_speed: f32) -> Self {
        debug_assert!(points.first() == Some(&Point::ORIGIN));
        Self {
            points,
            rotation_speed,
            fitness: 0.0,
            tested: false,
        }
    }

    /// Random genome: origin plus `min_points..=max_points - 1` points in the bounds
    pub fn generate_random(bounds: &GenomeConfig, rng: &mut impl Rng) -> Self {
        let count = rng.gen_range(bounds.min_points..=bounds.max_points);
        let mut points = Vec::with_capacity(count);
        points.push(Point::ORIGIN);

        for _ in 1..count {
            points.push(Point {
                x: rng.gen_range(bounds.min_x..=bounds.max_x),
                y: rng.gen_range(bounds.min_y..=bounds.max_y),
            });
        }

        let rotation_speed = rng.gen_range(-bounds.initial_speed..=bounds.initial_speed);
        Self::from_points_unchecked(points, rotation_speed)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Produce a mutated copy.
    ///
    /// Each non-origin point is displaced by up to `amount` on both axes with
    /// probability `rate`; the rotation speed is nudged by up to
    /// `bounds.speed_step` with probability `rate`. Points are clamped into the
    /// bounds afterwards and the speed into `[-max_speed, max_speed]`.
    /// The result is untested; `self` is left untouched.
    pub fn mutate(
        &self,
        rate: f32,
        amount: f32,
        bounds: &GenomeConfig,
        rng: &mut impl Rng,
    ) -> Genome {
        let points = self
            .points
            .iter()
            .enumerate()
            .map(|(i, &point)| {
                if i == 0 {
                    return Point::ORIGIN;
                }
                let moved = if rng.gen::<f32>() < rate {
                    Point {
                        x: point.x + rng.gen_range(-amount..=amount),
                        y: point.y + rng.gen_range(-amount..=amount),
                    }
                } else {
                    point
                };
                moved.clamped(bounds)
            })
            .collect();

        let mut rotation_speed = self.rotation_speed;
        if rng.gen::<f32>() < rate {
            rotation_speed += rng.gen_range(-bounds.speed_step..=bounds.speed_step);
            rotation_speed = rotation_speed.clamp(-bounds.max_speed, bounds.max_speed);
        }

        Self::from_points_unchecked(points, rotation_speed)
    }

    /// Blend two parents into an untested child.
    ///
    /// The child length is drawn uniformly between the parents' lengths.
    /// Shared indices take the midpoint, the rest come from the longer parent.
    pub fn crossover(a: &Genome, b: &Genome, rng: &mut impl Rng) -> Genome {
        let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        let child_len = rng.gen_range(short.len()..=long.len());

        let points = long.points[..child_len]
            .iter()
            .enumerate()
            .map(|(i, &p)| match short.points.get(i) {
                _ if i == 0 => Point::ORIGIN,
                Some(&q) => p.midpoint(q),
                None => p,
            })
            .collect();

        let rotation_speed = (a.rotation_speed + b.rotation_speed) / 2.0;
        Self::from_points_unchecked(points, rotation_speed)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON, enforcing the origin invariant
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
