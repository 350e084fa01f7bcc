//! The simulated body carried by the evolved legs.

use crate::config::AttemptConfig;
use serde::{Deserialize, Serialize};

/// Square rigid body with a rotating leg assembly.
///
/// Screen coordinates: x grows forward, y grows downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Edge length of the body
    pub size: f32,
    /// Accumulated leg assembly angle (radians, unwrapped)
    pub rotation: f32,
    /// Leg assembly angular velocity (radians per step)
    pub angular_velocity: f32,
    /// x at attempt start
    pub start_x: f32,
}

impl Character {
    /// Body at rest at `(x, y)`
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            size,
            rotation: 0.0,
            angular_velocity: 0.0,
            start_x: x,
        }
    }

    /// Body in the starting pose described by the attempt config
    pub fn from_config(config: &AttemptConfig) -> Self {
        Self::new(config.start_x, config.start_y, config.body_size)
    }

    /// Return to the initial pose at `(x, y)`
    pub fn reset(&mut self, x: f32, y: f32) {
        *self = Self::new(x, y, self.size);
    }

    /// Net forward distance since the attempt started
    pub fn distance(&self) -> f32 {
        self.x - self.start_x
    }

    #[inline]
    pub fn half_size(&self) -> f32 {
        self.size / 2.0
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x - self.half_size()
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.half_size()
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y - self.half_size()
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.half_size()
    }
}

impl Default for Character {
    fn default() -> Self {
        Self::from_config(&AttemptConfig::default())
    }
}
