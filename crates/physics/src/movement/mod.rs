//! Character movement.
//!
//! Movement is split into modules that take turns owning the tick:
//!
//! - [`GroundModule`]: walking, running and sprinting on walkable ground,
//!   with slope sliding, step-up, step-down and moving-platform following
//! - [`AirModule`]: gravity and air control when nothing supports the
//!   character
//!
//! [`CharacterMovement`] owns the capsule, the module list and the
//! locomotion state. Commands (`walk`, `sprint`, `crouch`, `jump`, ...) go
//! through [`LocomotionStates`] and apply on the next tick.
//!
//! All parameters come from a [`CharacterConfig`] resolved once into a
//! [`LocomotionTable`]; nothing reads configuration during a tick.

mod air;
mod config;
mod ground;
mod module;
mod slide;
mod snapshot;
mod state;
mod table;

pub use air::AirModule;
pub use config::{
    default_layers, AirConfig, CharacterConfig, GaitProfile, GroundConfig, StanceProfile,
};
pub use ground::{GroundModule, GroundResult, SurfaceCheck, MAX_MOVE_ITERATIONS};
pub use module::{CharacterMovement, ModuleContext, MovementModule};
pub use slide::{
    angle_between_deg, move_towards, project_on_plane, slide_along_surface, slide_on_surface,
    MIN_MOVE_ALONG_SURFACE,
};
pub use snapshot::{LocomotionSnapshot, SpeedBands};
pub use state::{LocomotionState, LocomotionStates, MovementInput, MovementState, StateHistory};
pub use table::{CapsuleTarget, LocomotionParams, LocomotionTable, MAX_SLOPE_ANGLE, MIN_SLOPE_ANGLE};
