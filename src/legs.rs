//! Leg geometry derived from a genome and the current assembly angle.

use crate::character::Character;
use crate::genome::{Genome, Point};
use serde::{Deserialize, Serialize};

/// Line segment relative to the body centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl LegSegment {
    /// Far endpoint, the one that touches surfaces
    #[inline]
    pub fn tip(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn length(&self) -> f32 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }
}

/// Rotate `p` about the origin by the angle with the given sine/cosine
#[inline]
fn rotate(p: Point, sin: f32, cos: f32) -> Point {
    Point::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

/// Drives the leg assembly of one genome
#[derive(Debug, Clone)]
pub struct LegSystem {
    genome: Genome,
}

impl LegSystem {
    pub fn new(genome: Genome) -> Self {
        Self { genome }
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Advance the assembly angle by one step of the genome's rotation speed
    pub fn update(&self, character: &mut Character) {
        character.rotation += self.genome.rotation_speed;
        character.angular_velocity = self.genome.rotation_speed;
    }

    /// Segments between consecutive genome points, rotated by the current angle
    pub fn legs(&self, character: &Character) -> Vec<LegSegment> {
        let (sin, cos) = character.rotation.sin_cos();

        self.genome
            .points()
            .windows(2)
            .map(|pair| {
                let a = rotate(pair[0], sin, cos);
                let b = rotate(pair[1], sin, cos);
                LegSegment {
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn straight_down() -> Genome {
        Genome::new(vec![Point::ORIGIN, Point::new(0.0, 20.0), Point::new(0.0, 40.0)], 0.1).unwrap()
    }

    #[test]
    fn test_segment_count() {
        let legs = LegSystem::new(straight_down());
        let character = Character::default();

        let segments = legs.legs(&character);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].tip(), Point::new(0.0, 20.0));
        assert_eq!(segments[1].x1, 0.0);
        assert_eq!(segments[1].y1, 20.0);
        assert_eq!(segments[1].length(), 20.0);
    }

    #[test]
    fn test_rotation_applied() {
        let legs = LegSystem::new(straight_down());
        let mut character = Character::default();
        character.rotation = FRAC_PI_2;

        let tip = legs.legs(&character)[1].tip();

        // (0, 40) rotated a quarter turn lands on (-40, 0)
        assert!((tip.x + 40.0).abs() < 1e-4);
        assert!(tip.y.abs() < 1e-4);
    }

    #[test]
    fn test_update_accumulates_without_wrapping() {
        let legs = LegSystem::new(straight_down());
        let mut character = Character::default();

        for _ in 0..100 {
            legs.update(&mut character);
        }

        assert!((character.rotation - 10.0).abs() < 1e-3);
        assert_eq!(character.angular_velocity, 0.1);
    }

    #[test]
    fn test_legs_is_a_pure_query() {
        let legs = LegSystem::new(straight_down());
        let character = Character::default();
        let before = character.clone();

        let first = legs.legs(&character);
        let second = legs.legs(&character);

        assert_eq!(first, second);
        assert_eq!(character, before);
    }

    #[test]
    fn test_single_point_genome_has_no_legs() {
        let legs = LegSystem::new(Genome::new(vec![Point::ORIGIN], 0.0).unwrap());
        assert!(legs.legs(&Character::default()).is_empty());
    }
}
