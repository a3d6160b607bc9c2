//! Authoritative capsule state.
//!
//! [`CharacterCapsule`] owns the agent's position, rotation and scale. It is
//! the single place displacement happens: the movement solver composes
//! collision-aware motion out of queries plus [`CharacterCapsule::move_by`]
//! and never writes the pose directly.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::geometry::{CapsuleAxis, CapsuleGeometry, CapsuleShape};
use crate::collision::{LayerMask, Pose, QueryFilter, TriggerInteraction};

/// Capsule construction parameters as found in a configuration asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapsuleConfig {
    /// Capsule dimensions.
    pub shape: CapsuleShape,

    /// Layers the capsule collides with.
    pub layer_mask: LayerMask,

    /// Whether trigger volumes block the capsule.
    #[serde(default)]
    pub triggers: TriggerInteraction,
}

impl Default for CapsuleConfig {
    fn default() -> Self {
        Self {
            shape: CapsuleShape::default(),
            layer_mask: LayerMask::ALL,
            triggers: TriggerInteraction::Ignore,
        }
    }
}

/// Snapshot of the capsule published to collaborators after each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsuleBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub center: Vec3,
    pub axis: CapsuleAxis,
    pub height: f32,
    pub radius: f32,
}

/// Kinematic capsule: pose, shape and derived velocity.
#[derive(Debug, Clone)]
pub struct CharacterCapsule {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    shape: CapsuleShape,
    filter: QueryFilter,

    last_position: Vec3,
    last_rotation: Quat,
    velocity: Vec3,

    body: CapsuleBody,
}

impl CharacterCapsule {
    /// Create a capsule at `pose` with unit scale.
    pub fn new(shape: CapsuleShape, filter: QueryFilter, pose: Pose) -> Self {
        let mut capsule = Self {
            position: pose.position,
            rotation: pose.rotation,
            scale: Vec3::ONE,
            shape,
            filter,
            last_position: pose.position,
            last_rotation: pose.rotation,
            velocity: Vec3::ZERO,
            body: CapsuleBody {
                position: pose.position,
                rotation: pose.rotation,
                scale: Vec3::ONE,
                center: shape.center,
                axis: shape.axis,
                height: shape.height,
                radius: shape.radius,
            },
        };
        capsule.publish();
        capsule
    }

    /// Create a capsule from configuration.
    pub fn from_config(config: &CapsuleConfig, pose: Pose) -> Self {
        let filter = QueryFilter::new(config.layer_mask).with_triggers(config.triggers);
        Self::new(config.shape, filter, pose)
    }

    /// Reset the capsule to a transform, discarding motion history.
    pub fn initialize(&mut self, pose: Pose, scale: Vec3) {
        self.position = pose.position;
        self.rotation = pose.rotation;
        self.scale = scale;
        self.last_position = pose.position;
        self.last_rotation = pose.rotation;
        self.velocity = Vec3::ZERO;
        self.publish();
    }

    /// Publish the current state and derive velocity from the last
    /// synchronized position.
    ///
    /// A non-positive `delta_time` keeps the previous velocity.
    pub fn synchronize(&mut self, delta_time: f32) {
        if delta_time > 0.0 {
            self.velocity = (self.position - self.last_position) / delta_time;
        }
        self.last_position = self.position;
        self.last_rotation = self.rotation;
        self.publish();
    }

    fn publish(&mut self) {
        self.body = CapsuleBody {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            center: self.shape.center,
            axis: self.shape.axis,
            height: self.shape.height,
            radius: self.shape.radius,
        };
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Displace the capsule. No collision check.
    #[inline]
    pub fn move_by(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Compose an Euler delta (radians, applied Y then X then Z) onto the
    /// current rotation.
    pub fn rotate(&mut self, euler: Vec3) {
        let delta = Quat::from_euler(EulerRot::YXZ, euler.y, euler.x, euler.z);
        self.rotation = (self.rotation * delta).normalize();
    }

    /// Displace the capsule to an absolute position, used to undo a
    /// tentative move exactly.
    #[inline]
    pub fn move_to(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Change the capsule's centre offset, height and radius.
    pub fn reshape(&mut self, center: Vec3, height: f32, radius: f32) {
        self.shape.center = center;
        self.shape.height = height.max(0.0);
        self.shape.radius = radius.max(0.0);
    }

    // ========================================================================
    // State
    // ========================================================================

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    #[inline]
    pub fn shape(&self) -> &CapsuleShape {
        &self.shape
    }

    #[inline]
    pub fn filter(&self) -> &QueryFilter {
        &self.filter
    }

    /// Velocity derived at the last [`synchronize`](Self::synchronize).
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn last_position(&self) -> Vec3 {
        self.last_position
    }

    #[inline]
    pub fn last_rotation(&self) -> Quat {
        self.last_rotation
    }

    /// State published at the last synchronize.
    #[inline]
    pub fn body(&self) -> &CapsuleBody {
        &self.body
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    pub fn radius(&self) -> f32 {
        self.shape.scaled_radius(self.scale)
    }

    pub fn height(&self) -> f32 {
        self.shape.scaled_height(self.scale)
    }

    pub fn cylinder_height(&self) -> f32 {
        self.shape.cylinder_height(self.scale)
    }

    pub fn is_sphere_shaped(&self) -> bool {
        self.shape.is_sphere_shaped(self.scale)
    }

    pub fn volume(&self) -> f32 {
        self.shape.volume(self.scale)
    }

    pub fn up(&self) -> Vec3 {
        self.shape.up(&self.pose())
    }

    pub fn down(&self) -> Vec3 {
        -self.up()
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn back(&self) -> Vec3 {
        -self.forward()
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn left(&self) -> Vec3 {
        -self.right()
    }

    /// Capsule centre in world space.
    pub fn center(&self) -> Vec3 {
        self.shape.world_center(&self.pose(), self.scale)
    }

    pub fn top_sphere(&self) -> Vec3 {
        self.shape.top_sphere(&self.pose(), self.scale)
    }

    pub fn base_sphere(&self) -> Vec3 {
        self.shape.base_sphere(&self.pose(), self.scale)
    }

    pub fn top_point(&self) -> Vec3 {
        self.shape.top_point(&self.pose(), self.scale)
    }

    pub fn base_point(&self) -> Vec3 {
        self.shape.base_point(&self.pose(), self.scale)
    }

    /// Geometry as configured.
    pub fn small_geometry(&self) -> CapsuleGeometry {
        self.shape.small(&self.pose(), self.scale)
    }

    /// Geometry inflated by the skin width.
    pub fn big_geometry(&self) -> CapsuleGeometry {
        self.shape.big(&self.pose(), self.scale)
    }
}

// ============================================================================
// Tests
// ============================================================================
