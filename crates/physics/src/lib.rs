//! Strider Physics
//!
//! A kinematic character controller: a capsule-shaped agent moved through a
//! collision world by sweeping, sliding and stepping instead of by forces.
//!
//! # Architecture
//!
//! - **Collision**: the [`CollisionBackend`] query trait and its parry3d
//!   implementation, [`CollisionWorld`]
//! - **Capsule**: capsule geometry and the [`CharacterCapsule`], the only
//!   thing that changes a character's position
//! - **Movement**: ground and air modules that turn input and locomotion
//!   state into collision-aware capsule moves
//!
//! # Design Principles
//!
//! 1. **Kinematic**: the solver never integrates forces; velocity is derived
//!    from how far the capsule actually moved
//! 2. **Bounded**: every iterative loop has a fixed iteration cap, and a
//!    partial move is an accepted outcome
//! 3. **Backend-agnostic**: movement code only sees [`CollisionBackend`]

pub mod capsule;
pub mod collision;
pub mod error;
pub mod movement;

// Re-export commonly used types
pub use capsule::{CapsuleConfig, CapsuleShape, CharacterCapsule};
pub use collision::{
    ColliderHandle, CollisionBackend, CollisionWorld, Layer, LayerMask, Pose, QueryFilter,
    SweepHit,
};
pub use error::{ConfigError, WorldError};
pub use movement::{
    CharacterConfig, CharacterMovement, GroundResult, LocomotionSnapshot, LocomotionState,
    MovementInput, MovementState,
};
