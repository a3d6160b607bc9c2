//! Character entity driven by player input.

use glam::Vec3;
use strider_physics::collision::CollisionBackend;
use strider_physics::movement::{LocomotionSnapshot, LocomotionState, MovementInput};
use strider_physics::{CharacterConfig, CharacterMovement, ConfigError};

use crate::input::PlayerInput;
use crate::level::SpawnPoint;

/// Unique identifier for entities.
pub type EntityId = u32;

/// A character in the game.
#[derive(Debug)]
pub struct Character {
    /// Unique character ID.
    pub id: EntityId,

    /// Character name/handle.
    pub name: String,

    /// Capsule, movement modules and locomotion state.
    pub movement: CharacterMovement,
}

impl Character {
    /// Spawn a character at `spawn`.
    pub fn spawn(
        id: EntityId,
        name: &str,
        config: &CharacterConfig,
        spawn: &SpawnPoint,
    ) -> Result<Self, ConfigError> {
        let movement = CharacterMovement::from_config(config, spawn.pose())?;
        log::debug!("spawned character {id} ({name}) at {}", spawn.position);

        Ok(Self {
            id,
            name: name.to_string(),
            movement,
        })
    }

    /// Turn and issue locomotion commands for this frame.
    ///
    /// Jumping is only requested while the last tick ended grounded.
    pub fn apply_input(&mut self, input: &PlayerInput, mouse_sensitivity: f32) -> MovementInput {
        let yaw = input.yaw_delta(mouse_sensitivity);
        if yaw != 0.0 {
            self.movement.rotate(Vec3::new(0.0, yaw, 0.0));
        }

        let grounded = self.movement.snapshot().grounded;
        let states = self.movement.states_mut();
        states.movement.set(input.requested_gait());
        if input.actions.jump && grounded {
            states.jump();
        } else {
            states.locomotion.set(input.requested_stance());
        }

        input.to_movement_input()
    }

    /// Apply `input` and advance one tick. Returns the module that ran.
    pub fn tick(
        &mut self,
        world: &dyn CollisionBackend,
        input: &PlayerInput,
        mouse_sensitivity: f32,
        delta_time: f32,
    ) -> Option<&'static str> {
        let movement_input = self.apply_input(input, mouse_sensitivity);
        self.movement.tick(world, &movement_input, delta_time)
    }

    /// Return to `spawn` standing still.
    pub fn respawn(&mut self, spawn: &SpawnPoint) {
        self.movement.teleport(spawn.pose());
        self.movement.states_mut().stand();
        self.movement.states_mut().idle();
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.movement.capsule().position()
    }

    #[inline]
    pub fn snapshot(&self) -> &LocomotionSnapshot {
        self.movement.snapshot()
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.movement.snapshot().grounded
    }

    #[inline]
    pub fn stance(&self) -> LocomotionState {
        self.movement.states().locomotion.current()
    }
}
