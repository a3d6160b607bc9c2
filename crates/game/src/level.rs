//! Level geometry, spawn points and moving platforms.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use strider_physics::collision::{ColliderHandle, CollisionWorld, Layer, Pose};
use strider_physics::WorldError;

/// A game level containing collision geometry and spawn points.
#[derive(Debug)]
pub struct Level {
    /// Level identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Collision world for physics.
    pub collision: CollisionWorld,

    /// Character spawn points.
    pub spawn_points: Vec<SpawnPoint>,

    /// Kinematic platforms moved every tick.
    pub platforms: Vec<MovingPlatform>,
}

/// A spawn point for characters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Position in world space (capsule feet).
    pub position: Vec3,

    /// Initial facing direction (yaw in radians).
    pub facing: f32,
}

impl SpawnPoint {
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, Quat::from_rotation_y(self.facing))
    }
}

/// A collider oscillating between its origin and `origin + travel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub collider: ColliderHandle,

    pub origin: Vec3,

    /// Offset of the far end of the path.
    pub travel: Vec3,

    /// Seconds for a full round trip.
    pub period: f32,

    /// Seconds since the platform started.
    pub elapsed: f32,
}

impl MovingPlatform {
    /// Position along the path at `time`, easing in and out at both ends.
    pub fn position_at(&self, time: f32) -> Vec3 {
        if self.period <= 0.0 {
            return self.origin;
        }
        let phase = (time / self.period).fract();
        let blend = 0.5 - 0.5 * (phase * TAU).cos();
        self.origin + self.travel * blend
    }

    /// Advance the platform and move its collider.
    pub fn advance(&mut self, world: &mut CollisionWorld, delta_time: f32) -> Result<(), WorldError> {
        self.elapsed += delta_time;
        world.set_pose(self.collider, Pose::from_position(self.position_at(self.elapsed)))
    }
}

impl Level {
    /// Create an empty level.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            collision: CollisionWorld::new(),
            spawn_points: Vec::new(),
            platforms: Vec::new(),
        }
    }

    /// Add a ramp whose low edge lies on `low_edge`, rising toward +X.
    pub fn add_ramp(&mut self, low_edge: Vec3, degrees: f32, half_extents: Vec3) -> ColliderHandle {
        let rotation = Quat::from_rotation_z(degrees.to_radians());
        let center = low_edge + rotation * Vec3::new(half_extents.x, -half_extents.y, 0.0);
        self.collision
            .add_box_rotated(center, half_extents, rotation, Layer::GROUND)
    }

    /// Add a box platform that oscillates along `travel`.
    pub fn add_platform(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        travel: Vec3,
        period: f32,
    ) -> ColliderHandle {
        let collider = self.collision.add_box(center, half_extents, Layer::GROUND);
        self.platforms.push(MovingPlatform {
            collider,
            origin: center,
            travel,
            period,
            elapsed: 0.0,
        });
        collider
    }

    /// Create a test level exercising steps, walls, slopes and platforms.
    pub fn test_arena() -> Self {
        let mut level = Self::new("test_arena", "Test Arena");

        // Floor
        level.collision.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            Layer::GROUND,
        );

        // Perimeter walls
        let wall_height = 5.0;
        let wall_thickness = 0.5;
        let arena_size = 50.0;
        for (center, half_extents) in [
            (
                Vec3::new(0.0, wall_height / 2.0, -arena_size),
                Vec3::new(arena_size, wall_height / 2.0, wall_thickness),
            ),
            (
                Vec3::new(0.0, wall_height / 2.0, arena_size),
                Vec3::new(arena_size, wall_height / 2.0, wall_thickness),
            ),
            (
                Vec3::new(arena_size, wall_height / 2.0, 0.0),
                Vec3::new(wall_thickness, wall_height / 2.0, arena_size),
            ),
            (
                Vec3::new(-arena_size, wall_height / 2.0, 0.0),
                Vec3::new(wall_thickness, wall_height / 2.0, arena_size),
            ),
        ] {
            level.collision.add_box(center, half_extents, Layer::DEFAULT);
        }

        // Short step, face at z=5
        level.collision.add_box(
            Vec3::new(0.0, 0.15, 8.0),
            Vec3::new(3.0, 0.15, 3.0),
            Layer::GROUND,
        );

        // Tall wall, face at z=-10
        level.collision.add_box(
            Vec3::new(0.0, 1.5, -10.5),
            Vec3::new(4.0, 1.5, 0.5),
            Layer::DEFAULT,
        );

        // Walkable and too-steep ramps
        level.add_ramp(Vec3::new(10.0, 0.0, 0.0), 20.0, Vec3::new(4.0, 0.5, 2.0));
        level.add_ramp(Vec3::new(10.0, 0.0, 10.0), 60.0, Vec3::new(3.0, 0.5, 2.0));

        // Crate that blocks but cannot be stood on
        level.collision.add_box(
            Vec3::new(-10.0, 0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.5),
            Layer::PROPS,
        );

        // Platform sliding back and forth along X
        level.add_platform(
            Vec3::new(-20.0, 0.25, -20.0),
            Vec3::new(2.0, 0.25, 2.0),
            Vec3::new(8.0, 0.0, 0.0),
            8.0,
        );

        // Spawn points
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(0.0, 0.01, 0.0),
            facing: 0.0,
        });
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(-20.0, 0.51, -20.0),
            facing: std::f32::consts::FRAC_PI_2,
        });

        level
    }

    /// Get a spawn point, wrapping around the list.
    pub fn spawn_point(&self, index: usize) -> Option<&SpawnPoint> {
        if self.spawn_points.is_empty() {
            return None;
        }
        self.spawn_points.get(index % self.spawn_points.len())
    }

    /// Advance all moving platforms.
    pub fn advance(&mut self, delta_time: f32) -> Result<(), WorldError> {
        for platform in &mut self.platforms {
            platform.advance(&mut self.collision, delta_time)?;
        }
        Ok(())
    }
}
