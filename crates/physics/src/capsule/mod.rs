//! The character's capsule.
//!
//! - [`CapsuleShape`]: dimensions and the pure geometry derived from them
//! - [`CharacterCapsule`]: authoritative pose, the only position mutator
//! - queries: overlap, sweep, move and penetration recovery issued from the
//!   capsule's current geometry

mod controller;
mod geometry;
mod queries;

pub use controller::{CapsuleBody, CapsuleConfig, CharacterCapsule};
pub use geometry::{CapsuleAxis, CapsuleGeometry, CapsuleShape};
pub use queries::{
    CapsuleHits, CapsuleOverlaps, CapsulePart, Extent, MoveOutcome, MOVE_THRESHOLD,
    PENETRATION_OFFSET,
};
