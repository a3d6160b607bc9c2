//! Locomotion state machine and per-tick input.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Gait the character is asked to move with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementState {
    #[default]
    Idle,
    Walking,
    Running,
    Sprinting,
}

impl MovementState {
    pub const ALL: [Self; 4] = [Self::Idle, Self::Walking, Self::Running, Self::Sprinting];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Body posture of the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LocomotionState {
    #[default]
    Standing,
    Crouching,
    Proning,
    Jumping,
}

impl LocomotionState {
    pub const ALL: [Self; 4] = [Self::Standing, Self::Crouching, Self::Proning, Self::Jumping];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// A state value with its history.
///
/// - `current`: the commanded value, applied at the next physics step
/// - `last`: the value the last physics step ran with
/// - `previous`: the value before the most recent change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateHistory<T> {
    current: T,
    last: T,
    previous: T,
}

impl<T: Copy + PartialEq> StateHistory<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: value,
            last: value,
            previous: value,
        }
    }

    #[inline]
    pub fn current(&self) -> T {
        self.current
    }

    #[inline]
    pub fn last(&self) -> T {
        self.last
    }

    #[inline]
    pub fn previous(&self) -> T {
        self.previous
    }

    /// Command a new value. Repeating the current value is a no-op.
    pub fn set(&mut self, value: T) {
        if value != self.current {
            self.previous = self.current;
            self.current = value;
        }
    }

    /// Whether the commanded value differs from what last ran.
    #[inline]
    pub fn changed(&self) -> bool {
        self.current != self.last
    }

    /// Mark the current value as processed.
    pub fn commit(&mut self) {
        self.last = self.current;
    }
}

/// Both locomotion state variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocomotionStates {
    pub movement: StateHistory<MovementState>,
    pub locomotion: StateHistory<LocomotionState>,
}

impl LocomotionStates {
    pub fn idle(&mut self) {
        self.movement.set(MovementState::Idle);
    }

    pub fn walk(&mut self) {
        self.movement.set(MovementState::Walking);
    }

    pub fn run(&mut self) {
        self.movement.set(MovementState::Running);
    }

    pub fn sprint(&mut self) {
        self.movement.set(MovementState::Sprinting);
    }

    pub fn stand(&mut self) {
        self.locomotion.set(LocomotionState::Standing);
    }

    pub fn crouch(&mut self) {
        self.locomotion.set(LocomotionState::Crouching);
    }

    pub fn prone(&mut self) {
        self.locomotion.set(LocomotionState::Proning);
    }

    pub fn jump(&mut self) {
        self.locomotion.set(LocomotionState::Jumping);
    }

    /// Mark both commanded values as processed.
    pub fn commit(&mut self) {
        self.movement.commit();
        self.locomotion.commit();
    }
}

/// Input gathered for one physics step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementInput {
    /// Move intent: x = right, y = forward. Only the direction is used.
    pub move_axis: Vec2,

    /// View yaw relative to the character, radians. Positive turns right.
    pub view_yaw: f32,
}

impl MovementInput {
    pub fn new(move_axis: Vec2, view_yaw: f32) -> Self {
        Self {
            move_axis,
            view_yaw,
        }
    }

    /// Input angle from forward in degrees, positive to the right.
    ///
    /// `None` when there is no input.
    pub fn heading_degrees(&self) -> Option<f32> {
        if self.move_axis.length_squared() <= f32::EPSILON {
            return None;
        }
        Some(self.move_axis.x.atan2(self.move_axis.y).to_degrees())
    }

    /// Unit move direction in world space: the input turned by the view
    /// yaw, then by the character's rotation. Zero without input.
    pub fn world_direction(&self, rotation: Quat) -> Vec3 {
        let local = Vec3::new(self.move_axis.x, 0.0, self.move_axis.y).normalize_or_zero();
        rotation * (Quat::from_rotation_y(self.view_yaw) * local)
    }
}

// ============================================================================
// Tests
// ============================================================================
