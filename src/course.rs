//! Obstacle course: a fixed row of rectangular blocks standing on the ground.

use crate::config::CourseConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle; `y` is the top edge (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether `x` lies within the horizontal span
    #[inline]
    pub fn spans(&self, x: f32) -> bool {
        x >= self.left() && x <= self.right()
    }
}

/// Ordered, immutable obstacle sequence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Course {
    obstacles: Vec<Obstacle>,
}

impl Course {
    /// Generate a course: evenly spaced blocks with random heights resting on `ground_y`
    pub fn generate(config: &CourseConfig, ground_y: f32, rng: &mut impl Rng) -> Self {
        let obstacles = (0..config.count)
            .map(|i| {
                let height = rng.gen_range(config.min_height..config.max_height) as f32;
                Obstacle::new(
                    config.first_x + i as f32 * config.spacing,
                    ground_y - height,
                    config.width,
                    height,
                )
            })
            .collect();

        Self { obstacles }
    }

    /// Course from explicit obstacles
    pub fn from_obstacles(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    /// Course with no obstacles
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Right edge of the last obstacle
    pub fn extent(&self) -> f32 {
        self.obstacles.last().map(Obstacle::right).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generated_layout() {
        let config = CourseConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let course = Course::generate(&config, 530.0, &mut rng);

        assert_eq!(course.len(), 50);
        for (i, obs) in course.obstacles().iter().enumerate() {
            assert_eq!(obs.x, 250.0 + i as f32 * 180.0);
            assert_eq!(obs.width, 100.0);
            assert!(obs.height >= 30.0 && obs.height < 90.0);
            assert_eq!(obs.bottom(), 530.0);
        }
    }

    #[test]
    fn test_same_seed_same_course() {
        let config = CourseConfig::default();
        let a = Course::generate(&config, 530.0, &mut ChaCha8Rng::seed_from_u64(1));
        let b = Course::generate(&config, 530.0, &mut ChaCha8Rng::seed_from_u64(1));

        assert_eq!(a.obstacles(), b.obstacles());
    }

    #[test]
    fn test_extent() {
        assert_eq!(Course::flat().extent(), 0.0);

        let course = Course::from_obstacles(vec![Obstacle::new(10.0, 500.0, 20.0, 30.0)]);
        assert_eq!(course.extent(), 30.0);
        assert!(course.obstacles()[0].spans(15.0));
        assert!(!course.obstacles()[0].spans(31.0));
    }
}
