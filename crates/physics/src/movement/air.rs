//! Airborne movement.
//!
//! Runs whenever no higher-priority module takes the tick: gravity pulls
//! the character down (capped at terminal speed), input adds limited air
//! control, and the capsule slides off whatever it hits.

use glam::Vec3;

use super::config::AirConfig;
use super::module::{ModuleContext, MovementModule};
use super::slide::project_on_plane;
use crate::capsule::{MOVE_THRESHOLD, PENETRATION_OFFSET};

/// Sweep-and-clip iterations per tick.
const MAX_AIR_ITERATIONS: usize = 4;

/// Ballistic movement with air control.
#[derive(Debug, Clone)]
pub struct AirModule {
    config: AirConfig,
}

impl AirModule {
    pub fn new(config: AirConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AirConfig {
        &self.config
    }

    /// Add speed toward `direction` without exceeding `max_speed` along it.
    fn accelerate(&self, velocity: Vec3, direction: Vec3, delta_time: f32) -> Vec3 {
        if direction.length_squared() < 0.0001 {
            return velocity;
        }

        let current_speed = velocity.dot(direction);
        let add_speed = self.config.air_speed - current_speed;
        if add_speed <= 0.0 {
            return velocity;
        }

        let accel_speed = (self.config.air_acceleration * delta_time).min(add_speed);
        velocity + direction * accel_speed
    }
}

impl MovementModule for AirModule {
    fn name(&self) -> &'static str {
        "air"
    }

    fn should_run(&mut self, _ctx: &mut ModuleContext<'_>) -> bool {
        true
    }

    fn run_physics(&mut self, ctx: &mut ModuleContext<'_>) {
        let delta_time = ctx.delta_time;
        let up = ctx.capsule.up();
        let velocity = ctx.capsule.velocity();

        let vertical = (velocity.dot(up) - self.config.gravity * delta_time)
            .max(-self.config.terminal_speed);
        let horizontal = self.accelerate(
            project_on_plane(velocity, up),
            ctx.input.world_direction(ctx.capsule.rotation()),
            delta_time,
        );

        let mut remaining = (horizontal + up * vertical) * delta_time;
        for _ in 0..MAX_AIR_ITERATIONS {
            let outcome = ctx.capsule.capsule_move(ctx.world, remaining);
            remaining -= outcome.moved;

            let Some(hit) = outcome.hit else {
                break;
            };
            remaining = project_on_plane(remaining, hit.normal);
            if remaining.length() < MOVE_THRESHOLD {
                break;
            }
        }

        ctx.capsule.resolve_penetration(ctx.world, PENETRATION_OFFSET);
    }
}

// ============================================================================
// Tests
// ============================================================================
