//! Per-step kinematics for the body: gravity, leg thrust, damping and
//! axis-aligned collision against the ground and obstacles.

use crate::character::Character;
use crate::config::PhysicsConfig;
use crate::course::Obstacle;
use crate::legs::LegSegment;

/// Surface a leg tip is touching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Ground,
    Obstacle,
}

/// Side of an obstacle the body was pushed out through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Legs touching the ground
    pub ground_contacts: usize,
    /// Legs touching an obstacle
    pub obstacle_contacts: usize,
    /// Horizontal velocity gained from leg thrust
    pub thrust: f32,
    /// Body rests on the ground after the step
    pub grounded: bool,
}

/// Single-body physics stepper
#[derive(Debug, Clone, Default)]
pub struct PhysicsEngine {
    config: PhysicsConfig,
}

impl PhysicsEngine {
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Advance the body by one step
    pub fn step(
        &self,
        character: &mut Character,
        obstacles: &[Obstacle],
        legs: &[LegSegment],
    ) -> StepReport {
        let cfg = &self.config;
        let mut report = StepReport::default();

        // Phase 1: gravity
        character.vy += cfg.gravity;

        // Phase 2: leg thrust
        self.apply_leg_forces(character, obstacles, legs, &mut report);

        // Phase 3: baseline forward bias
        character.vx += cfg.forward_bias;

        // Phase 4: damping
        character.vx *= cfg.friction;
        character.vy *= cfg.friction;

        // Phase 5: integrate
        character.x += character.vx;
        character.y += character.vy;

        // Phase 6: ground
        if character.bottom() >= cfg.ground_y {
            character.y = cfg.ground_y - character.half_size();
            character.vy = cfg.bounce_velocity;
            report.grounded = true;
        }

        // Phase 7: obstacles
        for obstacle in obstacles {
            Self::resolve_obstacle(character, obstacle);
        }

        report
    }

    /// Surface touched by a tip at world position `(x, y)`, if any
    pub fn contact_at(&self, x: f32, y: f32, obstacles: &[Obstacle]) -> Option<Contact> {
        let tol = self.config.contact_tolerance;

        let on_obstacle = obstacles
            .iter()
            .any(|o| o.spans(x) && y >= o.top() - tol && y <= o.bottom());
        if on_obstacle {
            Some(Contact::Obstacle)
        } else if y >= self.config.ground_y - tol {
            Some(Contact::Ground)
        } else {
            None
        }
    }

    fn apply_leg_forces(
        &self,
        character: &mut Character,
        obstacles: &[Obstacle],
        legs: &[LegSegment],
        report: &mut StepReport,
    ) {
        let omega = character.angular_velocity;

        for leg in legs {
            let tip = leg.tip();
            let contact = match self.contact_at(character.x + tip.x, character.y + tip.y, obstacles) {
                Some(contact) => contact,
                None => continue,
            };

            match contact {
                Contact::Ground => report.ground_contacts += 1,
                Contact::Obstacle => report.obstacle_contacts += 1,
            }

            // Tangential tip velocity about the body centre; negative means sweeping backward
            let tip_vx = -tip.y * omega;
            if tip_vx >= 0.0 {
                continue;
            }

            let thrust = self.config.leg_thrust * tip_vx.abs();
            character.vx += thrust;
            report.thrust += thrust;

            if contact == Contact::Obstacle {
                character.vy -= self.config.climb_assist * thrust;
            }
        }
    }

    /// Push the body out of `obstacle` along the dominant side, if overlapping
    pub fn resolve_obstacle(character: &mut Character, obstacle: &Obstacle) -> Option<Side> {
        let overlapping = character.right() > obstacle.left()
            && character.left() < obstacle.right()
            && character.bottom() > obstacle.top()
            && character.top() < obstacle.bottom();
        if !overlapping {
            return None;
        }

        let (pen_x, side_x) = if character.vx >= 0.0 {
            (character.right() - obstacle.left(), Side::Left)
        } else {
            (obstacle.right() - character.left(), Side::Right)
        };
        let (pen_y, side_y) = if character.vy >= 0.0 {
            (character.bottom() - obstacle.top(), Side::Top)
        } else {
            (obstacle.bottom() - character.top(), Side::Bottom)
        };

        let half = character.half_size();
        let side = if pen_y <= pen_x { side_y } else { side_x };
        match side {
            Side::Top => {
                character.y = obstacle.top() - half;
                character.vy = 0.0;
            }
            Side::Bottom => {
                character.y = obstacle.bottom() + half;
                character.vy = 0.0;
            }
            Side::Left => {
                character.x = obstacle.left() - half;
                character.vx = 0.0;
            }
            Side::Right => {
                character.x = obstacle.right() + half;
                character.vx = 0.0;
            }
        }

        Some(side)
    }

    /// Body has dropped past the fall threshold
    pub fn check_failure(&self, character: &Character) -> bool {
        character.y > self.config.fall_y
    }

    /// Body has barely moved from `start_x` after the stall timeout
    pub fn check_stuck(&self, character: &Character, start_x: f32, elapsed_ms: u64) -> bool {
        let distance = character.x - start_x;
        distance < self.config.stuck_distance && elapsed_ms > self.config.stuck_timeout_ms
    }
}
