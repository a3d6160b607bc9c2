//! Player input handling.
//!
//! This module converts raw input (keyboard, mouse, gamepad) into the
//! movement input and locomotion commands the physics side consumes.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use strider_physics::movement::{LocomotionState, MovementInput, MovementState};

/// Radians of yaw per pixel of mouse motion at sensitivity 1.
const RADIANS_PER_PIXEL: f32 = 0.001;

/// Raw player input for a single frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys pressed.
    pub movement: MoveKeys,

    /// Mouse delta this frame (pixels).
    pub mouse_delta: (f32, f32),

    /// Action buttons pressed.
    pub actions: ActionInput,

    /// Frame number this input was generated.
    pub frame: u32,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MoveKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Action button states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActionInput {
    pub jump: bool,
    pub crouch: bool,
    pub prone: bool,
    pub sprint: bool,
    /// Hold to walk instead of run.
    pub walk: bool,
}

impl PlayerInput {
    /// Move axis: x = right, y = forward, normalized on diagonals.
    pub fn move_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;

        if self.movement.forward {
            axis.y += 1.0;
        }
        if self.movement.backward {
            axis.y -= 1.0;
        }
        if self.movement.right {
            axis.x += 1.0;
        }
        if self.movement.left {
            axis.x -= 1.0;
        }

        if axis.length_squared() > 1.0 {
            axis.normalize()
        } else {
            axis
        }
    }

    /// Yaw change this frame in radians. Moving the mouse right turns right.
    pub fn yaw_delta(&self, mouse_sensitivity: f32) -> f32 {
        self.mouse_delta.0 * mouse_sensitivity * RADIANS_PER_PIXEL
    }

    /// Input for the movement modules. The character turns with the view,
    /// so the view yaw relative to it is zero.
    pub fn to_movement_input(&self) -> MovementInput {
        MovementInput::new(self.move_axis(), 0.0)
    }

    /// Gait requested by the held keys.
    pub fn requested_gait(&self) -> MovementState {
        if !self.has_movement() {
            MovementState::Idle
        } else if self.actions.sprint {
            MovementState::Sprinting
        } else if self.actions.walk {
            MovementState::Walking
        } else {
            MovementState::Running
        }
    }

    /// Stance requested by the held keys, ignoring jump.
    pub fn requested_stance(&self) -> LocomotionState {
        if self.actions.prone {
            LocomotionState::Proning
        } else if self.actions.crouch {
            LocomotionState::Crouching
        } else {
            LocomotionState::Standing
        }
    }

    /// Check if any movement input is active.
    pub fn has_movement(&self) -> bool {
        self.move_axis() != Vec2::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_is_normalized() {
        let mut input = PlayerInput::default();
        input.movement.forward = true;
        input.movement.right = true;

        let axis = input.move_axis();
        assert!((axis.length() - 1.0).abs() < 1e-6);
        assert!(axis.x > 0.0 && axis.y > 0.0);
    }

    #[test]
    fn test_straight_movement_not_normalized() {
        let mut input = PlayerInput::default();
        input.movement.forward = true;

        assert_eq!(input.move_axis(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut input = PlayerInput::default();
        input.movement.left = true;
        input.movement.right = true;

        assert!(!input.has_movement());
        assert_eq!(input.requested_gait(), MovementState::Idle);
    }

    #[test]
    fn test_requested_gait() {
        let mut input = PlayerInput::default();
        assert_eq!(input.requested_gait(), MovementState::Idle);

        input.movement.forward = true;
        assert_eq!(input.requested_gait(), MovementState::Running);

        input.actions.walk = true;
        assert_eq!(input.requested_gait(), MovementState::Walking);

        input.actions.sprint = true;
        assert_eq!(input.requested_gait(), MovementState::Sprinting);
    }

    #[test]
    fn test_requested_stance() {
        let mut input = PlayerInput::default();
        assert_eq!(input.requested_stance(), LocomotionState::Standing);

        input.actions.crouch = true;
        assert_eq!(input.requested_stance(), LocomotionState::Crouching);

        input.actions.prone = true;
        assert_eq!(input.requested_stance(), LocomotionState::Proning);
    }

    #[test]
    fn test_yaw_delta() {
        let input = PlayerInput {
            mouse_delta: (100.0, 40.0),
            ..Default::default()
        };
        assert!((input.yaw_delta(2.0) - 0.2).abs() < 1e-6);
    }
}
