//! Query shapes and query results.

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Real};
use parry3d::shape::SharedShape;
use serde::{Deserialize, Serialize};

use super::convert::{to_isometry, to_point};

/// Squared segment length below which a capsule is queried as a sphere.
const DEGENERATE_SEGMENT_SQ: f32 = 1e-10;

/// Identifies a collider inside a collision backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderHandle(pub u32);

/// World-space position and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose with identity rotation.
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    pub(crate) fn to_isometry(self) -> Isometry<Real> {
        to_isometry(self.position, self.rotation)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A shape placed in world space, used as the moving/probing side of a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryShape {
    /// A sphere (also used for sphere-shaped capsules).
    Sphere { center: Vec3, radius: f32 },
    /// A capsule spanning two sphere centres.
    Capsule { a: Vec3, b: Vec3, radius: f32 },
}

impl QueryShape {
    /// Build a capsule query, collapsing to a sphere when both centres coincide.
    pub fn capsule(a: Vec3, b: Vec3, radius: f32) -> Self {
        if a.distance_squared(b) <= DEGENERATE_SEGMENT_SQ {
            Self::Sphere { center: a, radius }
        } else {
            Self::Capsule { a, b, radius }
        }
    }

    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere { center, radius }
    }

    pub fn radius(&self) -> f32 {
        match *self {
            Self::Sphere { radius, .. } | Self::Capsule { radius, .. } => radius,
        }
    }

    /// Same shape moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Self {
        match *self {
            Self::Sphere { center, radius } => Self::Sphere {
                center: center + offset,
                radius,
            },
            Self::Capsule { a, b, radius } => Self::Capsule {
                a: a + offset,
                b: b + offset,
                radius,
            },
        }
    }

    /// parry3d representation: placement plus shape.
    pub(crate) fn to_parry(&self) -> (Isometry<Real>, SharedShape) {
        match *self {
            Self::Sphere { center, radius } => (
                to_isometry(center, Quat::IDENTITY),
                SharedShape::ball(radius),
            ),
            Self::Capsule { a, b, radius } => (
                Isometry::identity(),
                SharedShape::capsule(to_point(a), to_point(b), radius),
            ),
        }
    }

    /// parry3d core plus the margin around it, for overlap and penetration.
    ///
    /// Capsules become their inner segment with the radius as margin;
    /// spheres stay balls with no margin.
    pub(crate) fn to_parry_core(&self) -> (Isometry<Real>, SharedShape, f32) {
        match *self {
            Self::Sphere { center, radius } => (
                to_isometry(center, Quat::IDENTITY),
                SharedShape::ball(radius),
                0.0,
            ),
            Self::Capsule { a, b, radius } => (
                Isometry::identity(),
                SharedShape::segment(to_point(a), to_point(b)),
                radius,
            ),
        }
    }
}

/// Nearest-contact result of a sweep or ray query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepHit {
    /// Collider that was hit.
    pub collider: ColliderHandle,
    /// Distance travelled along the query direction before contact.
    pub distance: f32,
    /// Contact point in world space.
    pub point: Vec3,
    /// Surface normal at the contact, pointing away from the hit collider.
    pub normal: Vec3,
}

/// Minimal translation separating two overlapping shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Penetration {
    /// Unit direction to move the query shape along.
    pub direction: Vec3,
    /// Depth of the overlap.
    pub distance: f32,
}

impl Penetration {
    /// Separation vector (`direction * distance`).
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.direction * self.distance
    }
}
