//! Ground movement.
//!
//! Each tick the ground module:
//!
//! 1. Follows the surface it stands on if that surface moved (platforms)
//! 2. Resolves locomotion parameters for the current state pair
//! 3. Blends the horizontal velocity toward the input direction
//! 4. Resizes the capsule toward the stance's dimensions and applies any
//!    vertical motion as one sweep
//! 5. Resolves the horizontal motion iteratively: slide up walkable slopes,
//!    step over small ledges, graze along walls
//! 6. Snaps down onto ground below when not moving vertically
//! 7. Pushes the capsule out of anything it still overlaps
//!
//! and finally checks the ground again for the next tick.

use glam::{EulerRot, Quat, Vec3};

use super::config::GroundConfig;
use super::module::{ModuleContext, MovementModule};
use super::slide::{angle_between_deg, move_towards, project_on_plane, slide_along_surface, slide_on_surface};
use super::state::{LocomotionState, MovementState};
use super::table::{CapsuleTarget, LocomotionParams, LocomotionTable, MIN_SLOPE_ANGLE};
use crate::capsule::{CapsulePart, CharacterCapsule, Extent, MOVE_THRESHOLD, PENETRATION_OFFSET};
use crate::collision::{ColliderHandle, CollisionBackend, Layer, LayerMask, QueryFilter, SweepHit};
use crate::error::ConfigError;

/// Upper bound on horizontal resolution iterations per tick.
pub const MAX_MOVE_ITERATIONS: usize = 10;

/// Vertical motion below this counts as none.
const VERTICAL_EPSILON: f32 = 1e-6;

/// Slopes flatter than this (degrees) do not redirect a move.
const FLAT_ANGLE: f32 = 0.01;

/// Offset of the ray used to read the surface under a contact.
const NORMAL_RAY_OFFSET: f32 = 0.01;

/// Base pose changes below this are ignored.
const BASE_DELTA_EPSILON: f32 = 1e-8;

// ============================================================================
// Ground result
// ============================================================================

/// What the character stands on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundResult {
    pub collider: Option<ColliderHandle>,
    pub layer: Option<Layer>,
    /// Check direction (the capsule's down).
    pub direction: Vec3,
    /// Gap between the base sphere and the ground.
    pub distance: f32,
    /// Slope angle in degrees.
    pub angle: f32,
    /// Horizontal offset of the contact from the base sphere centre.
    pub edge_distance: f32,
    /// Ground collider pose when checked.
    pub base_position: Vec3,
    pub base_rotation: Quat,
}

impl GroundResult {
    pub const INVALID: Self = Self {
        collider: None,
        layer: None,
        direction: Vec3::NEG_Y,
        distance: 0.0,
        angle: 0.0,
        edge_distance: 0.0,
        base_position: Vec3::ZERO,
        base_rotation: Quat::IDENTITY,
    };

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.collider.is_some()
    }
}

impl Default for GroundResult {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Standability of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceCheck {
    pub standable: bool,
    /// Slope angle in degrees.
    pub angle: f32,
    /// Normal the angle was measured from.
    pub normal: Vec3,
}

/// State recorded before a step-up so it can be undone.
#[derive(Debug, Clone, Copy)]
struct StepUp {
    position: Vec3,
    remaining: Vec3,
    height: f32,
}

// ============================================================================
// Ground module
// ============================================================================

/// Movement while supported by walkable ground.
#[derive(Debug, Clone)]
pub struct GroundModule {
    table: LocomotionTable,
    check_depth: f32,
    ground_layers: LayerMask,
    min_move_distance: f32,

    params: LocomotionParams,
    ground: GroundResult,
    previous_ground: GroundResult,

    base_delta_position: Vec3,
    /// Euler delta (radians) of the ground since the last check. Tracked
    /// but not applied to the character.
    base_delta_rotation: Vec3,
    /// Velocity the base imparted on the last ground tick.
    carried_velocity: Vec3,
}

impl GroundModule {
    pub fn new(config: &GroundConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let table = LocomotionTable::new(config);
        let params = table.params(LocomotionState::Standing, MovementState::Idle);

        Ok(Self {
            table,
            check_depth: config.check_depth,
            ground_layers: config.ground_layers,
            min_move_distance: config.min_move_distance,
            params,
            ground: GroundResult::INVALID,
            previous_ground: GroundResult::INVALID,
            base_delta_position: Vec3::ZERO,
            base_delta_rotation: Vec3::ZERO,
            carried_velocity: Vec3::ZERO,
        })
    }

    #[inline]
    pub fn ground(&self) -> &GroundResult {
        &self.ground
    }

    #[inline]
    pub fn previous_ground(&self) -> &GroundResult {
        &self.previous_ground
    }

    /// Parameters used by the last tick.
    #[inline]
    pub fn params(&self) -> &LocomotionParams {
        &self.params
    }

    #[inline]
    pub fn table(&self) -> &LocomotionTable {
        &self.table
    }

    /// Rotation of the ground since it was checked, as Euler angles.
    #[inline]
    pub fn base_delta_rotation(&self) -> Vec3 {
        self.base_delta_rotation
    }

    /// Whether a surface with `normal` on `collider` can be stood on.
    ///
    /// Requires a collider on a ground layer and a slope within
    /// `[0, max_slope_up_angle]` measured against `up`.
    pub fn can_stand_on(
        &self,
        world: &dyn CollisionBackend,
        collider: Option<ColliderHandle>,
        normal: Vec3,
        up: Vec3,
    ) -> SurfaceCheck {
        let angle = angle_between_deg(normal, up);
        let on_ground_layer = collider
            .and_then(|collider| world.collider_layer(collider))
            .is_some_and(|layer| self.ground_layers.contains(layer));

        SurfaceCheck {
            standable: on_ground_layer
                && (MIN_SLOPE_ANGLE..=self.params.max_slope_up_angle).contains(&angle),
            angle,
            normal,
        }
    }

    fn check_hit(&self, world: &dyn CollisionBackend, capsule: &CharacterCapsule, hit: &SweepHit) -> SurfaceCheck {
        let up = capsule.up();
        let normal = surface_normal(world, capsule.filter(), up, hit);
        self.can_stand_on(world, Some(hit.collider), normal, up)
    }

    // ========================================================================
    // Ground probing
    // ========================================================================

    fn cast_for_ground(&self, capsule: &CharacterCapsule, world: &dyn CollisionBackend) -> GroundResult {
        let down = capsule.down();
        let Some(hit) = capsule.cast(world, CapsulePart::BaseSphere, Extent::Small, down * self.check_depth) else {
            return GroundResult::INVALID;
        };

        let surface = self.check_hit(world, capsule, &hit);
        if !surface.standable {
            return GroundResult::INVALID;
        }
        let Some(pose) = world.collider_pose(hit.collider) else {
            return GroundResult::INVALID;
        };

        GroundResult {
            collider: Some(hit.collider),
            layer: world.collider_layer(hit.collider),
            direction: down,
            distance: hit.distance,
            angle: surface.angle,
            edge_distance: project_on_plane(hit.point - capsule.base_sphere(), down).length(),
            base_position: pose.position,
            base_rotation: pose.rotation,
        }
    }

    fn update_ground_result(&mut self, capsule: &CharacterCapsule, world: &dyn CollisionBackend) {
        self.previous_ground = self.ground;
        self.ground = self.cast_for_ground(capsule, world);
    }

    /// Measure how far the ground moved since it was checked.
    fn update_base_delta(&mut self, world: &dyn CollisionBackend) -> bool {
        self.base_delta_position = Vec3::ZERO;
        self.base_delta_rotation = Vec3::ZERO;

        let Some(pose) = self.ground.collider.and_then(|collider| world.collider_pose(collider)) else {
            return false;
        };

        let position_delta = pose.position - self.ground.base_position;
        let rotation_delta = pose.rotation * self.ground.base_rotation.inverse();
        let (yaw, pitch, roll) = rotation_delta.to_euler(EulerRot::YXZ);

        self.base_delta_position = position_delta;
        self.base_delta_rotation = Vec3::new(pitch, yaw, roll);

        position_delta.length_squared() > BASE_DELTA_EPSILON
            || self.base_delta_rotation.length_squared() > BASE_DELTA_EPSILON
    }

    // ========================================================================
    // Movement
    // ========================================================================

    fn update_capsule_size(&self, capsule: &mut CharacterCapsule, target: CapsuleTarget, delta_time: f32) {
        let t = (target.transition_speed * delta_time).clamp(0.0, 1.0);
        let shape = *capsule.shape();

        capsule.reshape(
            shape.center.lerp(target.center, t),
            lerp(shape.height, target.height, t),
            lerp(shape.radius, target.radius, t),
        );
    }

    fn ground_move(
        &mut self,
        capsule: &mut CharacterCapsule,
        world: &dyn CollisionBackend,
        motion: Vec3,
        target: CapsuleTarget,
        delta_time: f32,
    ) {
        self.update_capsule_size(capsule, target, delta_time);

        let up = capsule.up();
        let vertical = up * motion.dot(up);
        let horizontal = motion - vertical;
        let moving_vertically = vertical.length() > VERTICAL_EPSILON;

        if moving_vertically {
            capsule.capsule_move(world, vertical);
        }

        if horizontal.length() > self.min_move_distance {
            self.move_horizontal(capsule, world, horizontal, !moving_vertically);
        }

        if !moving_vertically {
            self.step_down(capsule, world);
        }

        capsule.resolve_penetration(world, PENETRATION_OFFSET);
    }

    fn move_horizontal(
        &self,
        capsule: &mut CharacterCapsule,
        world: &dyn CollisionBackend,
        motion: Vec3,
        allow_step_up: bool,
    ) {
        let up = capsule.up();
        capsule.resolve_penetration(world, PENETRATION_OFFSET);

        let mut remaining = motion;
        let mut can_step_up = allow_step_up && self.params.step_up_height > 0.0;
        let mut pending: Option<StepUp> = None;

        for _ in 0..MAX_MOVE_ITERATIONS {
            let outcome = capsule.capsule_move(world, remaining);
            remaining -= outcome.moved;

            // Settle after a step-up; undo it if it landed on a steep ledge
            if let Some(step) = pending.take() {
                let settle = capsule.capsule_move(world, -up * step.height);
                if let Some(hit) = settle.hit {
                    let surface = self.check_hit(world, capsule, &hit);
                    if !surface.standable && surface.angle < 90.0 {
                        log::debug!("step-up onto {:.1} degree surface reverted", surface.angle);
                        capsule.move_to(step.position);
                        remaining = step.remaining;
                        can_step_up = false;
                        continue;
                    }
                }
            }

            let Some(hit) = outcome.hit else {
                break;
            };
            if remaining.length() < MOVE_THRESHOLD {
                break;
            }

            let surface = self.check_hit(world, capsule, &hit);
            if surface.standable && surface.angle > FLAT_ANGLE {
                if let Some(slid) = slide_on_surface(
                    remaining,
                    up,
                    surface.normal,
                    self.params.maintain_velocity_on_surface,
                ) {
                    remaining = slid;
                    continue;
                }
            }

            if can_step_up {
                can_step_up = false;
                let position = capsule.position();
                let lifted = capsule.capsule_move(world, up * self.params.step_up_height);
                let height = lifted.moved.length();
                if height > 0.0 {
                    log::trace!("stepping up {height:.3}");
                    pending = Some(StepUp {
                        position,
                        remaining,
                        height,
                    });
                    continue;
                }
            }

            remaining = slide_along_surface(
                remaining,
                up,
                hit.normal,
                self.params.maintain_velocity_along_surface,
            );
            if remaining.length() < MOVE_THRESHOLD {
                break;
            }
        }
    }

    fn step_down(&self, capsule: &mut CharacterCapsule, world: &dyn CollisionBackend) {
        let depth = self.params.step_down_depth;
        if depth <= 0.0 {
            return;
        }

        capsule.resolve_penetration(world, PENETRATION_OFFSET);

        let before = capsule.position();
        let outcome = capsule.capsule_move(world, capsule.down() * depth);
        let standable = outcome
            .hit
            .is_some_and(|hit| self.check_hit(world, capsule, &hit).standable);

        if !standable {
            capsule.move_to(before);
        }
    }
}

impl MovementModule for GroundModule {
    fn name(&self) -> &'static str {
        "ground"
    }

    fn should_run(&mut self, ctx: &mut ModuleContext<'_>) -> bool {
        if self.update_base_delta(ctx.world) {
            return true;
        }
        if !self.ground.is_valid() {
            self.update_ground_result(ctx.capsule, ctx.world);
        }
        if !self.ground.is_valid() {
            self.carried_velocity = Vec3::ZERO;
        }
        self.ground.is_valid()
    }

    fn run_physics(&mut self, ctx: &mut ModuleContext<'_>) {
        let delta_time = ctx.delta_time;

        let carried = self.base_delta_position;
        if carried != Vec3::ZERO {
            ctx.capsule.move_by(carried);
            self.base_delta_position = Vec3::ZERO;
        }

        let locomotion = ctx.states.locomotion.current();
        let movement = ctx.states.movement.current();
        self.params = self.table.resolve(locomotion, movement, ctx.input);

        let up = ctx.capsule.up();
        let direction = ctx.input.world_direction(ctx.capsule.rotation());
        // The synchronized velocity includes last tick's base motion
        let own_velocity = ctx.capsule.velocity() - self.carried_velocity;
        self.carried_velocity = carried / delta_time;
        let velocity = move_towards(
            project_on_plane(own_velocity, up),
            direction * self.params.target_speed,
            self.params.acceleration * delta_time,
        );
        let motion = velocity * delta_time + up * (self.params.jump_power * delta_time);

        let target = self.table.capsule_target(locomotion);
        self.ground_move(ctx.capsule, ctx.world, motion, target, delta_time);
        self.update_ground_result(ctx.capsule, ctx.world);
    }

    fn ground(&self) -> Option<&GroundResult> {
        Some(&self.ground)
    }
}

/// Normal of the surface under a contact.
///
/// A short ray is cast down just inside the contact point so edge and
/// corner hits report the face the character would stand on. When the ray
/// finds nothing (walls, ceilings, starting inside a solid) the sweep
/// normal is used.
fn surface_normal(world: &dyn CollisionBackend, filter: &QueryFilter, up: Vec3, hit: &SweepHit) -> Vec3 {
    let inward = -project_on_plane(hit.normal, up).normalize_or_zero();
    let origin = hit.point + (up + inward) * NORMAL_RAY_OFFSET;

    match world.raycast(origin, -up, NORMAL_RAY_OFFSET * 2.0, filter) {
        Some(ray) if ray.distance > 0.0 && ray.normal != Vec3::ZERO => ray.normal,
        _ => hit.normal,
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsule::CapsuleConfig;
    use crate::collision::{CollisionWorld, Pose};
    use crate::movement::state::{LocomotionStates, MovementInput};

    const DT: f32 = 1.0 / 60.0;

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();

        // Floor at y=0
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            Layer::GROUND,
        );

        world
    }

    /// Ramp rising toward +X from the floor at `start_x`.
    fn add_ramp(world: &mut CollisionWorld, start_x: f32, degrees: f32) -> ColliderHandle {
        let half = Vec3::new(4.0, 0.5, 4.0);
        let rotation = Quat::from_rotation_z(degrees.to_radians());
        let low_edge = Vec3::new(start_x, 0.0, 0.0);
        let center = low_edge + rotation * Vec3::new(half.x, -half.y, 0.0);
        world.add_box_rotated(center, half, rotation, Layer::GROUND)
    }

    /// Height of a ramp surface at `x`.
    fn ramp_height(start_x: f32, degrees: f32, x: f32) -> f32 {
        (x - start_x) * degrees.to_radians().tan()
    }

    fn capsule_at(position: Vec3) -> CharacterCapsule {
        CharacterCapsule::from_config(&CapsuleConfig::default(), Pose::from_position(position))
    }

    fn ground_module() -> GroundModule {
        let mut module = GroundModule::new(&GroundConfig::default()).unwrap();
        module.params = module.table.params(LocomotionState::Standing, MovementState::Running);
        module
    }

    fn stand_target(module: &GroundModule) -> CapsuleTarget {
        module.table.capsule_target(LocomotionState::Standing)
    }

    /// Capsule whose base sphere hovers `gap` above a ramp surface at `x`.
    fn capsule_over_ramp(start_x: f32, degrees: f32, x: f32, gap: f32) -> CharacterCapsule {
        let surface = ramp_height(start_x, degrees, x);
        let lift = 0.5 / degrees.to_radians().cos() - 0.5;
        capsule_at(Vec3::new(x, surface + lift + gap, 0.0))
    }

    #[test]
    fn test_check_flat_ground_is_valid() {
        let world = create_test_world();
        let module = ground_module();

        for gap in [0.01, 0.05, 0.09] {
            let capsule = capsule_at(Vec3::new(0.0, gap, 0.0));
            let ground = module.cast_for_ground(&capsule, &world);

            assert!(ground.is_valid(), "gap {gap}");
            assert!(ground.angle.abs() < 0.01, "angle {}", ground.angle);
            assert_eq!(ground.layer, Some(Layer::GROUND));
            assert!(ground.edge_distance < 1e-3);
        }
    }

    #[test]
    fn test_check_out_of_range_is_invalid() {
        let world = create_test_world();
        let module = ground_module();

        let capsule = capsule_at(Vec3::new(0.0, 0.5, 0.0));
        assert!(!module.cast_for_ground(&capsule, &world).is_valid());
    }

    #[test]
    fn test_check_slopes() {
        let mut world = create_test_world();
        add_ramp(&mut world, 2.0, 20.0);
        add_ramp(&mut world, 20.0, 60.0);
        let module = ground_module();

        let capsule = capsule_over_ramp(2.0, 20.0, 4.0, 0.02);
        let ground = module.cast_for_ground(&capsule, &world);
        assert!(ground.is_valid());
        assert!((ground.angle - 20.0).abs() < 0.5, "angle {}", ground.angle);

        let capsule = capsule_over_ramp(20.0, 60.0, 21.0, 0.02);
        assert!(!module.cast_for_ground(&capsule, &world).is_valid());
    }

    #[test]
    fn test_check_ignores_non_ground_layers() {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            Layer::PROPS,
        );
        let config = GroundConfig {
            ground_layers: Layer::GROUND.mask(),
            ..Default::default()
        };
        let module = GroundModule::new(&config).unwrap();

        let capsule = capsule_at(Vec3::new(0.0, 0.01, 0.0));
        assert!(!module.cast_for_ground(&capsule, &world).is_valid());
    }

    #[test]
    fn test_can_stand_on() {
        let world = create_test_world();
        let module = ground_module();
        let floor = Some(ColliderHandle(0));

        let flat = module.can_stand_on(&world, floor, Vec3::Y, Vec3::Y);
        assert!(flat.standable);

        let steep = Quat::from_rotation_z(50f32.to_radians()) * Vec3::Y;
        let check = module.can_stand_on(&world, floor, steep, Vec3::Y);
        assert!(!check.standable);
        assert!((check.angle - 50.0).abs() < 1e-3);

        assert!(!module.can_stand_on(&world, None, Vec3::Y, Vec3::Y).standable);
        assert!(!module.can_stand_on(&world, floor, Vec3::X, Vec3::Y).standable);
    }

    #[test]
    fn test_step_up_in_one_move() {
        let mut world = create_test_world();
        // 0.3m step with its face at z=1
        world.add_box(
            Vec3::new(0.0, 0.15, 6.0),
            Vec3::new(5.0, 0.15, 5.0),
            Layer::GROUND,
        );

        let mut module = ground_module();
        let target = stand_target(&module);
        let mut capsule = capsule_at(Vec3::new(0.0, 0.01, 0.3));

        module.ground_move(&mut capsule, &world, Vec3::new(0.0, 0.0, 1.0), target, DT);

        let position = capsule.position();
        assert!(position.z > 1.0, "blocked at z={}", position.z);
        assert!((position.y - 0.31).abs() < 0.02, "y={}", position.y);
    }

    #[test]
    fn test_step_up_onto_steep_surface_is_reverted() {
        let mut world = create_test_world();
        add_ramp(&mut world, 1.0, 60.0);

        let mut module = ground_module();
        let target = stand_target(&module);
        let mut capsule = capsule_at(Vec3::new(0.0, 0.01, 0.0));

        // Walk into contact first
        module.ground_move(&mut capsule, &world, Vec3::new(2.0, 0.0, 0.0), target, DT);
        let contact = capsule.position();
        assert!(contact.x < 1.0);

        module.ground_move(&mut capsule, &world, Vec3::new(0.5, 0.0, 0.0), target, DT);
        let drift = capsule.position() - contact;
        assert!(drift.length() < 1e-4, "moved {drift:?} into the slope");
    }

    #[test]
    fn test_walkable_ramp_is_climbed() {
        let mut world = create_test_world();
        add_ramp(&mut world, 1.0, 20.0);

        let mut module = ground_module();
        let target = stand_target(&module);
        let mut capsule = capsule_at(Vec3::new(0.0, 0.01, 0.0));

        for _ in 0..30 {
            module.ground_move(&mut capsule, &world, Vec3::new(0.1, 0.0, 0.0), target, DT);
        }

        let position = capsule.position();
        assert!(position.x > 2.5, "x={}", position.x);
        let surface = ramp_height(1.0, 20.0, position.x);
        assert!(position.y > surface - 0.1, "below ramp: y={} surface={surface}", position.y);
        assert!(capsule
            .overlap(&world, CapsulePart::Whole, Extent::Small)
            .is_empty());
    }

    #[test]
    fn test_maintain_velocity_on_surface_keeps_horizontal_progress() {
        let mut world = create_test_world();
        add_ramp(&mut world, 1.0, 20.0);

        let mut keep = ground_module();
        keep.params.maintain_velocity_on_surface = true;
        let mut rescale = ground_module();
        rescale.params.maintain_velocity_on_surface = false;
        let target = stand_target(&keep);

        let climb = |module: &mut GroundModule| {
            let mut capsule = capsule_over_ramp(1.0, 20.0, 2.0, 0.01);
            for _ in 0..10 {
                module.ground_move(&mut capsule, &world, Vec3::new(0.1, 0.0, 0.0), target, DT);
            }
            capsule.position().x
        };

        let kept = climb(&mut keep);
        let rescaled = climb(&mut rescale);

        assert!(kept > 2.9, "kept x={kept}");
        assert!(kept > rescaled + 0.03, "kept x={kept} rescaled x={rescaled}");
    }

    #[test]
    fn test_step_down_follows_ledge() {
        let mut world = create_test_world();
        // 0.2m platform the capsule starts on, ending at x=1
        world.add_box(
            Vec3::new(-4.0, 0.1, 0.0),
            Vec3::new(5.0, 0.1, 5.0),
            Layer::GROUND,
        );

        let mut module = ground_module();
        let target = stand_target(&module);
        let mut capsule = capsule_at(Vec3::new(0.0, 0.21, 0.0));

        module.ground_move(&mut capsule, &world, Vec3::new(2.0, 0.0, 0.0), target, DT);

        let position = capsule.position();
        assert!(position.x > 1.5);
        assert!((position.y - 0.01).abs() < 0.02, "did not step down: y={}", position.y);
    }

    #[test]
    fn test_no_step_down_over_cliff() {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(-4.0, -0.5, 0.0),
            Vec3::new(5.0, 0.5, 5.0),
            Layer::GROUND,
        );

        let mut module = ground_module();
        let target = stand_target(&module);
        let mut capsule = capsule_at(Vec3::new(0.0, 0.01, 0.0));

        module.ground_move(&mut capsule, &world, Vec3::new(3.0, 0.0, 0.0), target, DT);
        assert_eq!(capsule.position().y, 0.01);
    }

    #[test]
    fn test_moving_base_carries_character() {
        let mut world = create_test_world();
        let platform = world.add_box(
            Vec3::new(0.0, 0.25, 0.0),
            Vec3::new(2.0, 0.25, 2.0),
            Layer::GROUND,
        );

        let mut module = GroundModule::new(&GroundConfig::default()).unwrap();
        let mut capsule = capsule_at(Vec3::new(0.0, 0.51, 0.0));
        let states = LocomotionStates::default();
        let input = MovementInput::default();

        {
            let mut ctx = ModuleContext {
                capsule: &mut capsule,
                world: &world,
                states: &states,
                input: &input,
                delta_time: DT,
            };
            assert!(module.should_run(&mut ctx));
            module.run_physics(&mut ctx);
        }
        assert_eq!(module.ground().collider, Some(platform));
        capsule.synchronize(DT);
        let start = capsule.position();

        world.translate(platform, Vec3::new(0.5, 0.0, 0.0)).unwrap();

        let mut ctx = ModuleContext {
            capsule: &mut capsule,
            world: &world,
            states: &states,
            input: &input,
            delta_time: DT,
        };
        assert!(module.should_run(&mut ctx));
        module.run_physics(&mut ctx);

        let moved = capsule.position() - start;
        assert!((moved.x - 0.5).abs() < 1e-3, "moved {moved:?}");
        assert!(moved.y.abs() < 1e-3);
        assert_eq!(module.base_delta_rotation(), Vec3::ZERO);
    }

    #[test]
    fn test_rotating_base_is_tracked_but_not_applied() {
        let mut world = create_test_world();
        let platform = world.add_box(
            Vec3::new(0.0, 0.25, 0.0),
            Vec3::new(2.0, 0.25, 2.0),
            Layer::GROUND,
        );

        let mut module = GroundModule::new(&GroundConfig::default()).unwrap();
        let capsule = capsule_at(Vec3::new(0.0, 0.51, 0.0));
        module.update_ground_result(&capsule, &world);
        assert!(module.ground().is_valid());

        world
            .set_pose(
                platform,
                Pose::new(Vec3::new(0.0, 0.25, 0.0), Quat::from_rotation_y(0.5)),
            )
            .unwrap();

        assert!(module.update_base_delta(&world));
        assert!((module.base_delta_rotation().y - 0.5).abs() < 1e-4);
        assert_eq!(module.base_delta_position, Vec3::ZERO);
    }

    #[test]
    fn test_previous_ground_is_kept() {
        let world = create_test_world();
        let mut module = ground_module();

        let capsule = capsule_at(Vec3::new(0.0, 0.01, 0.0));
        module.update_ground_result(&capsule, &world);
        let capsule = capsule_at(Vec3::new(0.0, 3.0, 0.0));
        module.update_ground_result(&capsule, &world);

        assert!(!module.ground().is_valid());
        assert!(module.previous_ground().is_valid());
    }
}
