//! Strider Game Logic
//!
//! This crate drives strider characters from player input:
//!
//! - Input mapping (keys and mouse to gait, stance and move direction)
//! - Characters wrapping a [`CharacterMovement`]
//! - Levels with static geometry, spawn points and moving platforms
//! - A fixed-step simulation loop
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Simulation tick                         │
//! │  ┌─────────┐    ┌──────────────┐    ┌────────────────────┐  │
//! │  │ Level   │───►│ Characters   │───►│ Snapshots          │  │
//! │  │ (moving │    │ (input, then │    │ (speed, grounded,  │  │
//! │  │ bases)  │    │ ground / air)│    │  slope, stance)    │  │
//! │  └─────────┘    └──────────────┘    └────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod character;
pub mod input;
pub mod level;
pub mod simulation;

// Re-export main types
pub use character::{Character, EntityId};
pub use input::PlayerInput;
pub use level::{Level, MovingPlatform, SpawnPoint};
pub use simulation::{Simulation, SimulationConfig};

// Re-export physics types for convenience
pub use strider_physics::{
    CharacterConfig, CharacterMovement, CollisionWorld, LocomotionSnapshot, LocomotionState,
    MovementInput, MovementState,
};
