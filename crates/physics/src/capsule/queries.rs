//! Collision queries issued from the capsule's current geometry.
//!
//! Every query is available for the whole capsule or one of its end spheres,
//! and for the configured ("small") or skin-inflated ("big") extent. The big
//! extent sees surfaces the capsule is about to touch; the small extent sees
//! what it actually overlaps.

use glam::Vec3;

use super::controller::CharacterCapsule;
use crate::collision::{ColliderHandle, CollisionBackend, Penetration, Pose, QueryShape, SweepHit};

/// Moves shorter than this are treated as no move.
pub const MOVE_THRESHOLD: f32 = 0.00001;

/// Extra push applied along each separation direction when resolving overlaps.
pub const PENETRATION_OFFSET: f32 = 0.001;

/// Which part of the capsule a query uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapsulePart {
    Whole,
    TopSphere,
    BaseSphere,
}

/// Configured extent or skin-inflated extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extent {
    Small,
    Big,
}

/// Overlaps of both extents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapsuleOverlaps {
    /// Colliders the capsule actually intersects.
    pub small: Vec<ColliderHandle>,
    /// Colliders within the skin; when filtered, excludes anything in `small`.
    pub big: Vec<ColliderHandle>,
}

impl CapsuleOverlaps {
    pub fn count(&self) -> usize {
        self.small.len() + self.big.len()
    }
}

/// Nearest sweep hits of both extents.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CapsuleHits {
    pub small: Option<SweepHit>,
    pub big: Option<SweepHit>,
}

impl CapsuleHits {
    pub fn any(&self) -> bool {
        self.small.is_some() || self.big.is_some()
    }
}

/// Result of a collision-aware move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// Displacement actually applied.
    pub moved: Vec3,
    /// Blocking hit, if the sweep touched something.
    pub hit: Option<SweepHit>,
}

impl MoveOutcome {
    pub const NONE: Self = Self {
        moved: Vec3::ZERO,
        hit: None,
    };
}

/// Split a motion vector into unit direction and length.
fn split_motion(motion: Vec3) -> Option<(Vec3, f32)> {
    let distance = motion.length();
    if distance > 0.0 && distance.is_finite() {
        Some((motion / distance, distance))
    } else {
        None
    }
}

impl CharacterCapsule {
    /// World-space shape for a capsule part.
    pub fn query_shape(&self, part: CapsulePart, extent: Extent) -> QueryShape {
        let geometry = match extent {
            Extent::Small => self.small_geometry(),
            Extent::Big => self.big_geometry(),
        };
        match part {
            CapsulePart::Whole => geometry.shape(),
            CapsulePart::TopSphere => geometry.top_sphere(),
            CapsulePart::BaseSphere => geometry.base_sphere(),
        }
    }

    // ========================================================================
    // Overlap
    // ========================================================================

    /// Colliders intersecting a capsule part.
    pub fn overlap(
        &self,
        world: &dyn CollisionBackend,
        part: CapsulePart,
        extent: Extent,
    ) -> Vec<ColliderHandle> {
        world.overlap(&self.query_shape(part, extent), self.filter())
    }

    /// Buffer variant of [`overlap`](Self::overlap). Returns the number of
    /// colliders written; 0 for an empty buffer.
    pub fn overlap_into(
        &self,
        world: &dyn CollisionBackend,
        part: CapsulePart,
        extent: Extent,
        results: &mut [ColliderHandle],
    ) -> usize {
        world.overlap_into(&self.query_shape(part, extent), self.filter(), results)
    }

    /// Overlaps of both extents of the whole capsule.
    ///
    /// With `filter` set, the big set only keeps colliders that are within
    /// the skin but not yet intersecting.
    pub fn capsule_overlap(&self, world: &dyn CollisionBackend, filter: bool) -> CapsuleOverlaps {
        let small = self.overlap(world, CapsulePart::Whole, Extent::Small);
        let mut big = self.overlap(world, CapsulePart::Whole, Extent::Big);

        if filter {
            big.retain(|handle| !small.contains(handle));
        }

        CapsuleOverlaps { small, big }
    }

    // ========================================================================
    // Sweep
    // ========================================================================

    /// Nearest hit when sweeping a capsule part by `motion`.
    pub fn cast(
        &self,
        world: &dyn CollisionBackend,
        part: CapsulePart,
        extent: Extent,
        motion: Vec3,
    ) -> Option<SweepHit> {
        let (direction, distance) = split_motion(motion)?;
        world.cast(&self.query_shape(part, extent), direction, distance, self.filter())
    }

    /// Every hit when sweeping a capsule part by `motion`, nearest first.
    pub fn cast_all(
        &self,
        world: &dyn CollisionBackend,
        part: CapsulePart,
        extent: Extent,
        motion: Vec3,
    ) -> Vec<SweepHit> {
        match split_motion(motion) {
            Some((direction, distance)) => world.cast_all(
                &self.query_shape(part, extent),
                direction,
                distance,
                self.filter(),
            ),
            None => Vec::new(),
        }
    }

    /// Buffer variant of [`cast_all`](Self::cast_all).
    pub fn cast_all_into(
        &self,
        world: &dyn CollisionBackend,
        part: CapsulePart,
        extent: Extent,
        motion: Vec3,
        results: &mut [SweepHit],
    ) -> usize {
        match split_motion(motion) {
            Some((direction, distance)) => world.cast_all_into(
                &self.query_shape(part, extent),
                direction,
                distance,
                self.filter(),
                results,
            ),
            None => 0,
        }
    }

    /// Sweep both extents of a capsule part.
    pub fn cast_both(
        &self,
        world: &dyn CollisionBackend,
        part: CapsulePart,
        motion: Vec3,
    ) -> CapsuleHits {
        CapsuleHits {
            small: self.cast(world, part, Extent::Small, motion),
            big: self.cast(world, part, Extent::Big, motion),
        }
    }

    // ========================================================================
    // Move
    // ========================================================================

    /// Sweep the capsule by `motion` and advance as far as it can go.
    ///
    /// - No hit: the full motion is applied.
    /// - Hit: the capsule stops one skin width short of the contact. If that
    ///   leaves less than [`MOVE_THRESHOLD`] to travel, it does not move.
    ///
    /// Motions shorter than the threshold are skipped without querying.
    pub fn capsule_move(&mut self, world: &dyn CollisionBackend, motion: Vec3) -> MoveOutcome {
        let Some((direction, distance)) = split_motion(motion) else {
            return MoveOutcome::NONE;
        };
        if distance < MOVE_THRESHOLD {
            return MoveOutcome::NONE;
        }

        let shape = self.query_shape(CapsulePart::Whole, Extent::Small);
        let Some(hit) = world.cast(&shape, direction, distance, self.filter()) else {
            self.move_by(motion);
            return MoveOutcome {
                moved: motion,
                hit: None,
            };
        };

        let advance = (hit.distance - self.shape().skin_width).max(0.0);
        if advance < MOVE_THRESHOLD {
            return MoveOutcome {
                moved: Vec3::ZERO,
                hit: Some(hit),
            };
        }

        let moved = direction * advance;
        self.move_by(moved);
        MoveOutcome {
            moved,
            hit: Some(hit),
        }
    }

    /// Apply `motion` only if the sweep is completely clear.
    pub fn capsule_move_no_hit(&mut self, world: &dyn CollisionBackend, motion: Vec3) -> Option<SweepHit> {
        let hit = self.cast(world, CapsulePart::Whole, Extent::Small, motion);
        if hit.is_none() && motion != Vec3::ZERO {
            self.move_by(motion);
        }
        hit
    }

    // ========================================================================
    // Penetration
    // ========================================================================

    /// Minimal translation separating the capsule from `collider` at `pose`.
    ///
    /// `None` also covers backend false negatives on touching shapes.
    pub fn compute_penetration(
        &self,
        world: &dyn CollisionBackend,
        extent: Extent,
        collider: ColliderHandle,
        pose: Pose,
    ) -> Option<Penetration> {
        world.compute_penetration(&self.query_shape(CapsulePart::Whole, extent), collider, pose)
    }

    /// Push the capsule out of everything it overlaps.
    ///
    /// Separation vectors for all overlapping colliders are computed from the
    /// same starting pose, each extended by `offset`, and applied as one
    /// summed move. Returns the applied correction.
    pub fn resolve_penetration(&mut self, world: &dyn CollisionBackend, offset: f32) -> Vec3 {
        let shape = self.query_shape(CapsulePart::Whole, Extent::Small);
        let overlaps = world.overlap(&shape, self.filter());

        let mut correction = Vec3::ZERO;
        for collider in overlaps {
            let Some(pose) = world.collider_pose(collider) else {
                continue;
            };
            if let Some(penetration) = world.compute_penetration(&shape, collider, pose) {
                correction += penetration.translation() + penetration.direction * offset;
            }
        }

        if correction != Vec3::ZERO {
            log::trace!("resolving penetration by {correction:?}");
            self.move_by(correction);
        }

        correction
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsule::CapsuleShape;
    use crate::collision::{CollisionWorld, Layer, LayerMask, QueryFilter};

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();

        // Floor at y=0
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            Layer::GROUND,
        );

        // Wall with its face at x=5
        world.add_box(
            Vec3::new(5.5, 2.5, 0.0),
            Vec3::new(0.5, 2.5, 10.0),
            Layer::DEFAULT,
        );

        world
    }

    /// Capsule with its feet `gap` above the floor at x.
    fn capsule_at(x: f32, gap: f32) -> CharacterCapsule {
        CharacterCapsule::new(
            CapsuleShape::default(),
            QueryFilter::new(LayerMask::ALL),
            Pose::from_position(Vec3::new(x, gap, 0.0)),
        )
    }

    #[test]
    fn test_move_without_hit_applies_full_motion() {
        let world = create_test_world();
        let mut capsule = capsule_at(0.0, 0.25);

        let outcome = capsule.capsule_move(&world, Vec3::new(1.0, 0.0, 0.5));
        assert!(outcome.hit.is_none());
        assert_eq!(outcome.moved, Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(capsule.position(), Vec3::new(1.0, 0.25, 0.5));
    }

    #[test]
    fn test_move_then_reverse_is_identity() {
        let world = create_test_world();
        let mut capsule = capsule_at(0.0, 0.25);
        let start = capsule.position();

        let v = Vec3::new(0.75, 0.5, -1.25);
        capsule.capsule_move(&world, v);
        capsule.capsule_move(&world, -v);

        assert_eq!(capsule.position(), start);
    }

    #[test]
    fn test_move_never_passes_blocking_hit() {
        let world = create_test_world();

        for distance in [4.6, 5.0, 8.0, 50.0] {
            let mut capsule = capsule_at(0.0, 0.25);
            let outcome = capsule.capsule_move(&world, Vec3::new(distance, 0.0, 0.0));

            let hit = outcome.hit.expect("wall is in the way");
            assert!(hit.distance >= 0.0);
            // Capsule surface must stay in front of the wall face at x=5
            let front = capsule.position().x + capsule.radius();
            assert!(front <= 5.0 + 1e-4, "tunneled: front={front} distance={distance}");
            assert!(capsule
                .overlap(&world, CapsulePart::Whole, Extent::Small)
                .iter()
                .all(|&h| h != ColliderHandle(1)));
        }
    }

    #[test]
    fn test_move_stops_skin_width_short() {
        let world = create_test_world();
        let mut capsule = capsule_at(0.0, 0.25);

        capsule.capsule_move(&world, Vec3::new(10.0, 0.0, 0.0));

        let gap = 5.0 - (capsule.position().x + capsule.radius());
        let skin = capsule.shape().skin_width;
        assert!((gap - skin).abs() < 1e-3, "gap = {gap}");
    }

    #[test]
    fn test_move_below_threshold_is_skipped() {
        let world = create_test_world();
        let mut capsule = capsule_at(0.0, 0.25);

        let outcome = capsule.capsule_move(&world, Vec3::new(MOVE_THRESHOLD * 0.5, 0.0, 0.0));
        assert_eq!(outcome, MoveOutcome::NONE);
        assert_eq!(capsule.position(), Vec3::new(0.0, 0.25, 0.0));

        let outcome = capsule.capsule_move(&world, Vec3::ZERO);
        assert_eq!(outcome, MoveOutcome::NONE);
    }

    #[test]
    fn test_move_against_touching_wall_reports_hit_without_moving() {
        let world = create_test_world();
        // Front of the capsule half a skin width from the wall
        let mut capsule = capsule_at(5.0 - 0.5 - 0.005, 0.25);
        let start = capsule.position();

        let outcome = capsule.capsule_move(&world, Vec3::new(1.0, 0.0, 0.0));
        assert!(outcome.hit.is_some());
        assert_eq!(outcome.moved, Vec3::ZERO);
        assert_eq!(capsule.position(), start);
    }

    #[test]
    fn test_move_no_hit_only_moves_when_clear() {
        let world = create_test_world();
        let mut capsule = capsule_at(0.0, 0.25);

        let hit = capsule.capsule_move_no_hit(&world, Vec3::new(10.0, 0.0, 0.0));
        assert!(hit.is_some());
        assert_eq!(capsule.position(), Vec3::new(0.0, 0.25, 0.0));

        let hit = capsule.capsule_move_no_hit(&world, Vec3::new(-1.0, 0.0, 0.0));
        assert!(hit.is_none());
        assert_eq!(capsule.position(), Vec3::new(-1.0, 0.25, 0.0));
    }

    #[test]
    fn test_resolve_penetration_lifts_out_of_floor() {
        let world = create_test_world();
        let mut capsule = capsule_at(0.0, -0.1);

        let correction = capsule.resolve_penetration(&world, PENETRATION_OFFSET);

        assert!((correction.y - 0.101).abs() < 1e-3, "correction = {correction:?}");
        assert!(capsule
            .overlap(&world, CapsulePart::Whole, Extent::Small)
            .is_empty());
    }

    #[test]
    fn test_resolve_penetration_sums_corrections() {
        let world = create_test_world();
        // Sunk into the floor and pressed into the wall at once
        let mut capsule = capsule_at(5.0 - 0.45, -0.05);

        let correction = capsule.resolve_penetration(&world, PENETRATION_OFFSET);

        assert!(correction.x < -0.04, "{correction:?}");
        assert!(correction.y > 0.04, "{correction:?}");
    }

    #[test]
    fn test_resolve_penetration_without_overlap_is_noop() {
        let world = create_test_world();
        let mut capsule = capsule_at(0.0, 0.25);

        assert_eq!(capsule.resolve_penetration(&world, PENETRATION_OFFSET), Vec3::ZERO);
        assert_eq!(capsule.position(), Vec3::new(0.0, 0.25, 0.0));
    }

    #[test]
    fn test_capsule_overlap_separates_touching_from_penetrating() {
        let world = create_test_world();

        // Within the skin of the floor but not intersecting it
        let capsule = capsule_at(0.0, 0.005);
        let overlaps = capsule.capsule_overlap(&world, true);
        assert!(overlaps.small.is_empty());
        assert_eq!(overlaps.big, vec![ColliderHandle(0)]);
        assert_eq!(overlaps.count(), 1);

        // Sunk into the floor: filtering removes it from the big set
        let capsule = capsule_at(0.0, -0.05);
        let filtered = capsule.capsule_overlap(&world, true);
        assert_eq!(filtered.small, vec![ColliderHandle(0)]);
        assert!(filtered.big.is_empty());

        let unfiltered = capsule.capsule_overlap(&world, false);
        assert_eq!(unfiltered.count(), 2);
    }

    #[test]
    fn test_base_sphere_cast_finds_floor() {
        let world = create_test_world();
        let capsule = capsule_at(0.0, 0.25);

        let hit = capsule
            .cast(&world, CapsulePart::BaseSphere, Extent::Small, Vec3::new(0.0, -1.0, 0.0))
            .expect("floor below");
        assert!((hit.distance - 0.25).abs() < 5e-3, "distance = {}", hit.distance);
        assert!((hit.normal - Vec3::Y).length() < 1e-3);

        let hits = capsule.cast_both(&world, CapsulePart::BaseSphere, Vec3::new(0.0, -1.0, 0.0));
        assert!(hits.any());
        let big = hits.big.unwrap();
        assert!(big.distance < hit.distance);

        // Top sphere sweeping up sees nothing
        assert!(capsule
            .cast(&world, CapsulePart::TopSphere, Extent::Small, Vec3::Y)
            .is_none());
    }

    #[test]
    fn test_cast_all_buffer() {
        let world = create_test_world();
        let capsule = capsule_at(0.0, 0.25);

        let motion = Vec3::new(10.0, -0.5, 0.0);
        let all = capsule.cast_all(&world, CapsulePart::Whole, Extent::Small, motion);
        assert_eq!(all.len(), 2);

        let mut empty: [SweepHit; 0] = [];
        assert_eq!(
            capsule.cast_all_into(&world, CapsulePart::Whole, Extent::Small, motion, &mut empty),
            0
        );
        assert!(capsule
            .cast_all(&world, CapsulePart::Whole, Extent::Small, Vec3::ZERO)
            .is_empty());
    }

    #[test]
    fn test_big_penetration_is_deeper() {
        let world = create_test_world();
        let capsule = capsule_at(0.0, -0.05);
        let floor = ColliderHandle(0);
        let pose = world.collider_pose(floor).unwrap();

        let small = capsule
            .compute_penetration(&world, Extent::Small, floor, pose)
            .unwrap();
        let big = capsule
            .compute_penetration(&world, Extent::Big, floor, pose)
            .unwrap();
        assert!(big.distance > small.distance);
    }

    #[test]
    fn test_sphere_shaped_capsule_queries() {
        let world = create_test_world();
        let shape = CapsuleShape {
            center: Vec3::new(0.0, 0.5, 0.0),
            height: 0.8,
            ..Default::default()
        };
        let mut capsule = CharacterCapsule::new(
            shape,
            QueryFilter::new(LayerMask::ALL),
            Pose::from_position(Vec3::new(0.0, 0.25, 0.0)),
        );

        assert!(capsule.is_sphere_shaped());
        assert!(matches!(
            capsule.query_shape(CapsulePart::Whole, Extent::Small),
            QueryShape::Sphere { .. }
        ));

        let outcome = capsule.capsule_move(&world, Vec3::new(0.0, -1.0, 0.0));
        assert!(outcome.hit.is_some());
        assert!(capsule.base_point().y >= 0.0);
    }
}
