//! Per-tick locomotion snapshot for animation and debugging.

use glam::{Vec2, Vec3};

use super::config::GroundConfig;
use super::ground::GroundResult;
use super::state::{LocomotionState, LocomotionStates, MovementState};
use crate::capsule::CharacterCapsule;

/// Reference speeds mapping a raw speed onto the 0..3 locomotion scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedBands {
    pub walk: f32,
    pub run: f32,
    pub sprint: f32,
}

impl SpeedBands {
    /// Bands from the standing profile.
    pub fn from_config(config: &GroundConfig) -> Self {
        let stand = &config.stand;
        Self {
            walk: stand.walk.speed,
            run: stand.run.speed,
            sprint: stand.sprint.unwrap_or(stand.run).speed,
        }
    }

    /// Map a speed to 0 (idle), 1 (walk), 2 (run) or 3 (sprint), linear in
    /// between. The speed is rounded to centimeters per second first.
    pub fn normalize(&self, speed: f32) -> f32 {
        let speed = (speed * 100.0).round() / 100.0;

        if speed <= 0.0 {
            0.0
        } else if speed <= self.walk {
            ratio(speed, self.walk)
        } else if speed <= self.run {
            1.0 + ratio(speed - self.walk, self.run - self.walk)
        } else if speed <= self.sprint {
            2.0 + ratio(speed - self.run, self.sprint - self.run)
        } else {
            3.0
        }
    }
}

fn ratio(value: f32, range: f32) -> f32 {
    if range > f32::EPSILON {
        (value / range).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// What the character did on the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocomotionSnapshot {
    /// Normalized speed, see [`SpeedBands::normalize`].
    pub speed: f32,
    /// Local move direction scaled by the normalized speed (capped at run).
    pub blend: Vec2,
    /// Local horizontal velocity: x = right, y = forward.
    pub velocity_2d: Vec2,
    pub grounded: bool,
    /// Ground slope in degrees, 0 when airborne.
    pub slope_angle: f32,
    pub movement: MovementState,
    pub locomotion: LocomotionState,
    /// Module that ran the tick.
    pub module: Option<&'static str>,
}

impl LocomotionSnapshot {
    pub fn capture(
        capsule: &CharacterCapsule,
        states: &LocomotionStates,
        bands: &SpeedBands,
        ground: Option<&GroundResult>,
        module: Option<&'static str>,
    ) -> Self {
        let local = capsule.rotation().inverse() * capsule.velocity();
        let velocity_2d = Vec2::new(local.x, local.z);
        let speed = bands.normalize(velocity_2d.length());

        let ground = ground.filter(|ground| ground.is_valid());

        Self {
            speed,
            blend: velocity_2d.normalize_or_zero() * speed.clamp(0.0, 2.0),
            velocity_2d,
            grounded: ground.is_some(),
            slope_angle: ground.map_or(0.0, |ground| ground.angle),
            movement: states.movement.current(),
            locomotion: states.locomotion.current(),
            module,
        }
    }

    /// Horizontal velocity in world space for the given capsule.
    pub fn world_velocity(&self, capsule: &CharacterCapsule) -> Vec3 {
        capsule.rotation() * Vec3::new(self.velocity_2d.x, 0.0, self.velocity_2d.y)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsule::CapsuleConfig;
    use crate::collision::{ColliderHandle, Pose};
    use glam::Quat;

    fn bands() -> SpeedBands {
        SpeedBands {
            walk: 2.0,
            run: 4.0,
            sprint: 6.0,
        }
    }

    #[test]
    fn test_normalize_bands() {
        let bands = bands();
        assert_eq!(bands.normalize(0.0), 0.0);
        assert_eq!(bands.normalize(1.0), 0.5);
        assert_eq!(bands.normalize(2.0), 1.0);
        assert_eq!(bands.normalize(3.0), 1.5);
        assert_eq!(bands.normalize(4.0), 2.0);
        assert_eq!(bands.normalize(5.0), 2.5);
        assert_eq!(bands.normalize(6.0), 3.0);
        assert_eq!(bands.normalize(9.0), 3.0);
    }

    #[test]
    fn test_normalize_rounds_jitter() {
        let bands = bands();
        assert_eq!(bands.normalize(0.004), 0.0);
        assert_eq!(bands.normalize(1.999_9), 1.0);
    }

    #[test]
    fn test_normalize_degenerate_bands() {
        let bands = SpeedBands {
            walk: 2.0,
            run: 2.0,
            sprint: 2.0,
        };
        assert_eq!(bands.normalize(2.0), 1.0);
        assert_eq!(bands.normalize(2.5), 3.0);
        assert!(bands.normalize(1.0).is_finite());
    }

    #[test]
    fn test_capture_uses_local_velocity() {
        let mut capsule = CharacterCapsule::from_config(&CapsuleConfig::default(), Pose::IDENTITY);
        capsule.initialize(
            Pose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
            Vec3::ONE,
        );
        // Moving along world +X is forward for a character facing +X
        capsule.move_by(Vec3::new(0.04, 0.0, 0.0));
        capsule.synchronize(0.01);

        let ground = GroundResult {
            collider: Some(ColliderHandle(0)),
            angle: 12.0,
            ..GroundResult::INVALID
        };
        let snapshot = LocomotionSnapshot::capture(
            &capsule,
            &LocomotionStates::default(),
            &bands(),
            Some(&ground),
            Some("ground"),
        );

        assert!((snapshot.velocity_2d - Vec2::new(0.0, 4.0)).length() < 1e-4);
        assert_eq!(snapshot.speed, 2.0);
        assert!((snapshot.blend - Vec2::new(0.0, 2.0)).length() < 1e-4);
        assert!(snapshot.grounded);
        assert_eq!(snapshot.slope_angle, 12.0);
        assert!((snapshot.world_velocity(&capsule) - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_capture_airborne() {
        let capsule = CharacterCapsule::from_config(&CapsuleConfig::default(), Pose::IDENTITY);
        let snapshot = LocomotionSnapshot::capture(
            &capsule,
            &LocomotionStates::default(),
            &bands(),
            Some(&GroundResult::INVALID),
            Some("air"),
        );

        assert!(!snapshot.grounded);
        assert_eq!(snapshot.slope_angle, 0.0);
        assert_eq!(snapshot.speed, 0.0);
        assert_eq!(snapshot.blend, Vec2::ZERO);
    }
}
