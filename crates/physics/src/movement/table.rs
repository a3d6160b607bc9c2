//! Locomotion parameter table.
//!
//! The ground module never reads stance profiles directly. At construction
//! the profiles are flattened into a table indexed by
//! `(LocomotionState, MovementState)` so each tick resolves its parameters
//! with one lookup.

use glam::Vec3;

use super::config::{GaitProfile, GroundConfig, StanceProfile};
use super::state::{LocomotionState, MovementInput, MovementState};

/// Steepest slope angle any stance may stand on (degrees).
pub const MAX_SLOPE_ANGLE: f32 = 89.9;

/// Shallowest slope angle limit (degrees).
pub const MIN_SLOPE_ANGLE: f32 = 0.0;

/// Parameters for one (locomotion, movement) state pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocomotionParams {
    /// Horizontal speed the character accelerates toward.
    pub target_speed: f32,
    /// Rate of approach toward the target speed.
    pub acceleration: f32,
    /// Upward speed applied while the state runs.
    pub jump_power: f32,
    /// Tallest step that can be climbed (meters).
    pub step_up_height: f32,
    /// Deepest drop the character snaps down to (meters).
    pub step_down_depth: f32,
    /// Steepest standable slope (degrees, within `0..=89.9`).
    pub max_slope_up_angle: f32,
    /// Steepest slope walked down (degrees).
    pub slope_down_angle: f32,
    pub maintain_velocity_on_surface: bool,
    pub maintain_velocity_along_surface: bool,
}

/// Capsule dimensions a locomotion state interpolates toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleTarget {
    pub center: Vec3,
    pub height: f32,
    pub radius: f32,
    pub transition_speed: f32,
}

/// Input cone, in degrees either side of forward, that allows sprinting.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SprintCone {
    left: f32,
    right: f32,
}

impl SprintCone {
    fn allows(&self, input: &MovementInput) -> bool {
        match input.heading_degrees() {
            Some(heading) if heading < 0.0 => -heading <= self.left,
            Some(heading) => heading <= self.right,
            None => true,
        }
    }
}

/// Parameters for every state pair, resolved from a [`GroundConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct LocomotionTable {
    params: [[LocomotionParams; 4]; 4],
    capsules: [CapsuleTarget; 4],
    sprint_cones: [SprintCone; 4],
}

impl LocomotionTable {
    pub fn new(config: &GroundConfig) -> Self {
        let prone = config.prone.as_ref().unwrap_or(&config.crouch);

        let profile = |locomotion: LocomotionState| -> &StanceProfile {
            match locomotion {
                // Jumping keeps the standing profile and adds jump force
                LocomotionState::Standing | LocomotionState::Jumping => &config.stand,
                LocomotionState::Crouching => &config.crouch,
                LocomotionState::Proning => prone,
            }
        };

        let mut params = [[LocomotionParams::default(); 4]; 4];
        let mut capsules = [capsule_target(&config.stand); 4];
        let mut sprint_cones = [SprintCone {
            left: 0.0,
            right: 0.0,
        }; 4];

        for locomotion in LocomotionState::ALL {
            let stance = profile(locomotion);
            let jump_power = if locomotion == LocomotionState::Jumping {
                stance.jump_force
            } else {
                0.0
            };

            for movement in MovementState::ALL {
                params[locomotion.index()][movement.index()] =
                    resolve_params(stance, movement, jump_power);
            }
            capsules[locomotion.index()] = capsule_target(stance);
            sprint_cones[locomotion.index()] = SprintCone {
                left: stance.sprint_left_angle_max,
                right: stance.sprint_right_angle_max,
            };
        }

        Self {
            params,
            capsules,
            sprint_cones,
        }
    }

    /// Parameters for a state pair.
    #[inline]
    pub fn params(&self, locomotion: LocomotionState, movement: MovementState) -> LocomotionParams {
        self.params[locomotion.index()][movement.index()]
    }

    /// Parameters for a state pair given this tick's input.
    ///
    /// Sprinting with input outside the stance's sprint cone resolves to
    /// running.
    pub fn resolve(
        &self,
        locomotion: LocomotionState,
        movement: MovementState,
        input: &MovementInput,
    ) -> LocomotionParams {
        let movement = match movement {
            MovementState::Sprinting if !self.sprint_cones[locomotion.index()].allows(input) => {
                MovementState::Running
            }
            other => other,
        };
        self.params(locomotion, movement)
    }

    /// Capsule dimensions for a locomotion state.
    #[inline]
    pub fn capsule_target(&self, locomotion: LocomotionState) -> CapsuleTarget {
        self.capsules[locomotion.index()]
    }
}

fn capsule_target(stance: &StanceProfile) -> CapsuleTarget {
    CapsuleTarget {
        center: stance.capsule_center,
        height: stance.capsule_height,
        radius: stance.capsule_radius,
        transition_speed: stance.transition_speed,
    }
}

fn resolve_params(stance: &StanceProfile, movement: MovementState, jump_power: f32) -> LocomotionParams {
    let (target_speed, acceleration) = match movement {
        MovementState::Idle => (0.0, stance.idle_deceleration),
        MovementState::Walking => gait(stance.walk),
        MovementState::Running => gait(stance.run),
        MovementState::Sprinting => gait(stance.sprint.unwrap_or(stance.run)),
    };

    LocomotionParams {
        target_speed,
        acceleration,
        jump_power,
        step_up_height: stance.capsule_height * stance.step_up_percent / 100.0,
        step_down_depth: stance.capsule_height * stance.step_down_percent / 100.0,
        max_slope_up_angle: stance.slope_up_angle.clamp(MIN_SLOPE_ANGLE, MAX_SLOPE_ANGLE),
        slope_down_angle: stance.slope_down_angle.clamp(MIN_SLOPE_ANGLE, MAX_SLOPE_ANGLE),
        maintain_velocity_on_surface: stance.maintain_velocity_on_surface,
        maintain_velocity_along_surface: stance.maintain_velocity_along_surface,
    }
}

#[inline]
fn gait(profile: GaitProfile) -> (f32, f32) {
    (profile.speed, profile.acceleration)
}

// ============================================================================
// Tests
// ============================================================================
