//! Collision query backend.
//!
//! The movement code never talks to parry3d directly. It goes through the
//! [`CollisionBackend`] trait, which exposes the handful of queries a
//! kinematic character needs:
//!
//! - overlap tests (which colliders intersect a shape)
//! - sweeps (where does a shape first touch something along a direction)
//! - rays
//! - penetration depth against one collider
//!
//! [`CollisionWorld`] is the parry3d implementation.
//!
//! All query results are plain data. "Nothing found" is `None` or an empty
//! set, never an error: a backend may miss a touching pair and callers are
//! expected to tolerate that.

mod convert;
mod hit;
mod layers;
mod world;

use glam::Vec3;

pub use hit::{ColliderHandle, Penetration, Pose, QueryShape, SweepHit};
pub use layers::{Layer, LayerMask, QueryFilter, TriggerInteraction};
pub use world::{Collider, CollisionWorld};

/// Spatial queries against a collision world.
///
/// Implementors provide the visitor primitives; the collecting and
/// buffer-filling variants are derived from them.
pub trait CollisionBackend {
    /// Visit every collider intersecting `shape`.
    ///
    /// The visitor returns `false` to stop the iteration early.
    fn for_each_overlap(
        &self,
        shape: &QueryShape,
        filter: &QueryFilter,
        visitor: &mut dyn FnMut(ColliderHandle) -> bool,
    );

    /// Visit every collider touched when sweeping `shape` along the unit
    /// vector `direction` for at most `max_distance`.
    ///
    /// Colliders already overlapping the shape and not in the way of the
    /// motion are skipped. Visit order is unspecified.
    fn for_each_cast_hit(
        &self,
        shape: &QueryShape,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
        visitor: &mut dyn FnMut(SweepHit) -> bool,
    );

    /// Nearest ray intersection.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<SweepHit>;

    /// Translation needed to push `shape` out of `collider` placed at `pose`.
    ///
    /// Returns `None` when the shapes are separated or the backend cannot
    /// tell.
    fn compute_penetration(
        &self,
        shape: &QueryShape,
        collider: ColliderHandle,
        pose: Pose,
    ) -> Option<Penetration>;

    /// Current pose of a collider.
    fn collider_pose(&self, collider: ColliderHandle) -> Option<Pose>;

    /// Layer a collider lives on.
    fn collider_layer(&self, collider: ColliderHandle) -> Option<Layer>;

    /// All colliders intersecting `shape`.
    fn overlap(&self, shape: &QueryShape, filter: &QueryFilter) -> Vec<ColliderHandle> {
        let mut found = Vec::new();
        self.for_each_overlap(shape, filter, &mut |handle| {
            found.push(handle);
            true
        });
        found
    }

    /// Write overlapping colliders into `results`, returning how many were
    /// written. An empty buffer yields 0.
    fn overlap_into(
        &self,
        shape: &QueryShape,
        filter: &QueryFilter,
        results: &mut [ColliderHandle],
    ) -> usize {
        if results.is_empty() {
            return 0;
        }
        let mut count = 0;
        self.for_each_overlap(shape, filter, &mut |handle| {
            results[count] = handle;
            count += 1;
            count < results.len()
        });
        count
    }

    /// Nearest sweep hit.
    fn cast(
        &self,
        shape: &QueryShape,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<SweepHit> {
        let mut nearest: Option<SweepHit> = None;
        self.for_each_cast_hit(shape, direction, max_distance, filter, &mut |hit| {
            if nearest.map_or(true, |best| hit.distance < best.distance) {
                nearest = Some(hit);
            }
            true
        });
        nearest
    }

    /// Every sweep hit, nearest first.
    fn cast_all(
        &self,
        shape: &QueryShape,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Vec<SweepHit> {
        let mut hits = Vec::new();
        self.for_each_cast_hit(shape, direction, max_distance, filter, &mut |hit| {
            hits.push(hit);
            true
        });
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Write sweep hits into `results`, nearest first, returning the count.
    /// An empty buffer yields 0.
    fn cast_all_into(
        &self,
        shape: &QueryShape,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
        results: &mut [SweepHit],
    ) -> usize {
        if results.is_empty() {
            return 0;
        }
        let mut count = 0;
        self.for_each_cast_hit(shape, direction, max_distance, filter, &mut |hit| {
            results[count] = hit;
            count += 1;
            count < results.len()
        });
        results[..count].sort_unstable_by(|a, b| a.distance.total_cmp(&b.distance));
        count
    }
}
