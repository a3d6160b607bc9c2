//! Collision world containing static and kinematic geometry.
//!
//! The world stores every collider with its pose, layer and trigger flag and
//! answers the [`CollisionBackend`] queries with parry3d. Kinematic colliders
//! (moving platforms) are repositioned with [`CollisionWorld::set_pose`].

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{self, Ray, ShapeCastOptions};
use parry3d::shape::SharedShape;

use super::convert::{from_point, from_vector, to_point, to_vector};
use super::hit::{ColliderHandle, Penetration, Pose, QueryShape, SweepHit};
use super::layers::{Layer, QueryFilter};
use super::CollisionBackend;
use crate::error::WorldError;

/// A piece of collision geometry in the world.
#[derive(Clone)]
pub struct Collider {
    /// Handle returned when the collider was added.
    pub handle: ColliderHandle,
    /// The collision shape, in its local frame.
    pub shape: SharedShape,
    /// Position and orientation in world space.
    pub pose: Pose,
    /// Layer used for query filtering.
    pub layer: Layer,
    /// Trigger volumes are skipped by queries that ignore triggers.
    pub is_trigger: bool,
}

impl std::fmt::Debug for Collider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collider")
            .field("handle", &self.handle)
            .field("shape", &self.shape.shape_type())
            .field("pose", &self.pose)
            .field("layer", &self.layer)
            .field("is_trigger", &self.is_trigger)
            .finish()
    }
}

/// The collision world containing all geometry.
///
/// Supports:
/// - Box colliders (axis-aligned and oriented)
/// - Spheres
/// - Convex hulls
/// - Triangle meshes
#[derive(Debug, Default)]
pub struct CollisionWorld {
    colliders: Vec<Collider>,
    next_id: u32,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            colliders: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an arbitrary parry3d shape at `pose`.
    pub fn add_shape(&mut self, shape: SharedShape, pose: Pose, layer: Layer) -> ColliderHandle {
        let handle = ColliderHandle(self.next_id);
        self.next_id += 1;

        self.colliders.push(Collider {
            handle,
            shape,
            pose,
            layer,
            is_trigger: false,
        });

        handle
    }

    /// Add an axis-aligned box to the world.
    ///
    /// # Arguments
    ///
    /// * `center` - Center position of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    /// * `layer` - Layer for query filtering
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, layer: Layer) -> ColliderHandle {
        self.add_box_rotated(center, half_extents, Quat::IDENTITY, layer)
    }

    /// Add an oriented box to the world (ramps, tilted props).
    pub fn add_box_rotated(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        layer: Layer,
    ) -> ColliderHandle {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.add_shape(shape, Pose::new(center, rotation), layer)
    }

    /// Add a sphere to the world.
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, layer: Layer) -> ColliderHandle {
        self.add_shape(SharedShape::ball(radius), Pose::from_position(center), layer)
    }

    /// Add a convex hull built from world-space points.
    pub fn add_convex_hull(
        &mut self,
        points: &[Vec3],
        layer: Layer,
    ) -> Result<ColliderHandle, WorldError> {
        let parry_points: Vec<Point<Real>> = points.iter().copied().map(to_point).collect();

        let shape = SharedShape::convex_hull(&parry_points)
            .ok_or(WorldError::DegenerateHull(points.len()))?;

        Ok(self.add_shape(shape, Pose::IDENTITY, layer))
    }

    /// Add a triangle mesh built from world-space vertices.
    ///
    /// # Arguments
    ///
    /// * `vertices` - Mesh vertex positions
    /// * `indices` - Triangle indices (3 per triangle)
    /// * `layer` - Layer for query filtering
    pub fn add_triangle_mesh(
        &mut self,
        vertices: &[Vec3],
        indices: &[[u32; 3]],
        layer: Layer,
    ) -> Result<ColliderHandle, WorldError> {
        let parry_vertices: Vec<Point<Real>> = vertices.iter().copied().map(to_point).collect();

        let shape = SharedShape::trimesh(parry_vertices, indices.to_vec())
            .map_err(|err| WorldError::InvalidMesh(format!("{err:?}")))?;

        Ok(self.add_shape(shape, Pose::IDENTITY, layer))
    }

    /// Mark a collider as a trigger volume (or back to solid).
    pub fn set_trigger(&mut self, handle: ColliderHandle, is_trigger: bool) -> Result<(), WorldError> {
        self.get_mut(handle)?.is_trigger = is_trigger;
        Ok(())
    }

    /// Reposition a kinematic collider.
    pub fn set_pose(&mut self, handle: ColliderHandle, pose: Pose) -> Result<(), WorldError> {
        self.get_mut(handle)?.pose = pose;
        Ok(())
    }

    /// Move a kinematic collider by `offset`.
    pub fn translate(&mut self, handle: ColliderHandle, offset: Vec3) -> Result<(), WorldError> {
        self.get_mut(handle)?.pose.position += offset;
        Ok(())
    }

    /// Remove a collider. Returns `false` if it was not present.
    pub fn remove(&mut self, handle: ColliderHandle) -> bool {
        let before = self.colliders.len();
        self.colliders.retain(|c| c.handle != handle);
        before != self.colliders.len()
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    /// Number of colliders.
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Look up a collider.
    pub fn get(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.handle == handle)
    }

    fn get_mut(&mut self, handle: ColliderHandle) -> Result<&mut Collider, WorldError> {
        self.colliders
            .iter_mut()
            .find(|c| c.handle == handle)
            .ok_or(WorldError::UnknownCollider(handle))
    }

    fn filtered<'a>(&'a self, filter: &'a QueryFilter) -> impl Iterator<Item = &'a Collider> + 'a {
        self.colliders
            .iter()
            .filter(move |c| filter.accepts(c.layer, c.is_trigger))
    }
}

impl CollisionBackend for CollisionWorld {
    fn for_each_overlap(
        &self,
        shape: &QueryShape,
        filter: &QueryFilter,
        visitor: &mut dyn FnMut(ColliderHandle) -> bool,
    ) {
        let (core_pos, core, margin) = shape.to_parry_core();

        for collider in self.filtered(filter) {
            let intersects = core_contact(
                &core_pos,
                &core,
                margin,
                &collider.pose.to_isometry(),
                &collider.shape,
            )
            .is_some();

            if intersects && !visitor(collider.handle) {
                return;
            }
        }
    }

    fn for_each_cast_hit(
        &self,
        shape: &QueryShape,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
        visitor: &mut dyn FnMut(SweepHit) -> bool,
    ) {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return;
        }

        let (query_pos, query_shape) = shape.to_parry();
        let velocity = to_vector(dir);
        let options = ShapeCastOptions {
            max_time_of_impact: max_distance,
            target_distance: 0.0,
            stop_at_penetration: false,
            compute_impact_geometry_on_penetration: true,
        };

        for collider in self.filtered(filter) {
            let collider_pos = collider.pose.to_isometry();
            let hit = match query::cast_shapes(
                &query_pos,
                &velocity,
                query_shape.as_ref(),
                &collider_pos,
                &Vector::zeros(),
                collider.shape.as_ref(),
                options,
            ) {
                Ok(Some(hit)) => hit,
                Ok(None) => continue,
                Err(_) => {
                    log::trace!("shape cast unsupported against {:?}", collider.handle);
                    continue;
                }
            };

            let sweep_hit = SweepHit {
                collider: collider.handle,
                distance: hit.time_of_impact,
                point: from_point(&collider_pos.transform_point(&hit.witness2)),
                normal: from_vector(&collider_pos.transform_vector(&hit.normal2)),
            };

            if !visitor(sweep_hit) {
                return;
            }
        }
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<SweepHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let ray = Ray::new(to_point(origin), to_vector(dir));
        let mut closest: Option<SweepHit> = None;

        for collider in self.filtered(filter) {
            let Some(intersection) = collider.shape.cast_ray_and_get_normal(
                &collider.pose.to_isometry(),
                &ray,
                max_distance,
                true,
            ) else {
                continue;
            };

            let toi = intersection.time_of_impact;
            if closest.map_or(true, |best| toi < best.distance) {
                closest = Some(SweepHit {
                    collider: collider.handle,
                    distance: toi,
                    point: from_point(&ray.point_at(toi)),
                    normal: from_vector(&intersection.normal),
                });
            }
        }

        closest
    }

    fn compute_penetration(
        &self,
        shape: &QueryShape,
        collider: ColliderHandle,
        pose: Pose,
    ) -> Option<Penetration> {
        let target = self.get(collider)?;
        let (core_pos, core, margin) = shape.to_parry_core();

        let (depth, normal) =
            core_contact(&core_pos, &core, margin, &pose.to_isometry(), &target.shape)?;

        let direction = normal.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        Some(Penetration {
            direction,
            distance: depth,
        })
    }

    fn collider_pose(&self, collider: ColliderHandle) -> Option<Pose> {
        self.get(collider).map(|c| c.pose)
    }

    fn collider_layer(&self, collider: ColliderHandle) -> Option<Layer> {
        self.get(collider).map(|c| c.layer)
    }
}

/// Overlap depth and separating normal (out of the target) between a query
/// core inflated by `margin` and a target shape.
///
/// `None` when the inflated core does not reach into the target.
fn core_contact(
    core_pos: &Isometry<Real>,
    core: &SharedShape,
    margin: f32,
    target_pos: &Isometry<Real>,
    target: &SharedShape,
) -> Option<(f32, Vec3)> {
    let contact = match query::contact(core_pos, core.as_ref(), target_pos, target.as_ref(), margin) {
        Ok(contact) => contact?,
        Err(_) => {
            log::trace!("contact unsupported for {:?}", target.shape_type());
            return None;
        }
    };

    // Negative distance means the cores themselves intersect.
    let depth = margin - contact.dist;
    if depth <= 0.0 {
        return None;
    }

    Some((depth, from_vector(&contact.normal2)))
}

// ============================================================================
// Tests
// ============================================================================
