//! Capsule shape description and derived world-space geometry.
//!
//! Nothing here is cached. Every getter recomputes from the current
//! description, pose and scale, so values can never go stale after a move.

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{Pose, QueryShape};

/// Local axis the capsule is aligned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CapsuleAxis {
    X,
    #[default]
    Y,
    Z,
}

impl CapsuleAxis {
    /// Unit vector of the axis in local space.
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }

    /// Scale along the axis.
    fn along(self, scale: Vec3) -> f32 {
        match self {
            Self::X => scale.x,
            Self::Y => scale.y,
            Self::Z => scale.z,
        }
    }

    /// Largest scale orthogonal to the axis.
    fn across(self, scale: Vec3) -> f32 {
        match self {
            Self::X => scale.y.max(scale.z),
            Self::Y => scale.x.max(scale.z),
            Self::Z => scale.x.max(scale.y),
        }
    }
}

/// Unscaled capsule dimensions in the character's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsuleShape {
    /// Offset of the capsule centre from the character position.
    pub center: Vec3,
    /// Long axis.
    pub axis: CapsuleAxis,
    /// Total height, caps included.
    pub height: f32,
    /// Hemisphere radius.
    pub radius: f32,
    /// Inflation used by the "big" geometry variant.
    pub skin_width: f32,
}

impl Default for CapsuleShape {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 1.0, 0.0),
            axis: CapsuleAxis::Y,
            height: 2.0,
            radius: 0.5,
            skin_width: 0.01,
        }
    }
}

impl CapsuleShape {
    /// Radius after scale: `radius * max(scale across the axis)`.
    #[inline]
    pub fn scaled_radius(&self, scale: Vec3) -> f32 {
        self.radius * self.axis.across(scale)
    }

    /// Height after scale: `height * scale along the axis`.
    #[inline]
    pub fn scaled_height(&self, scale: Vec3) -> f32 {
        self.height * self.axis.along(scale)
    }

    /// Length of the straight section between the two sphere centres.
    ///
    /// Never negative.
    #[inline]
    pub fn cylinder_height(&self, scale: Vec3) -> f32 {
        (self.scaled_height(scale) - 2.0 * self.scaled_radius(scale)).max(0.0)
    }

    /// A capsule no taller than its diameter is a sphere.
    #[inline]
    pub fn is_sphere_shaped(&self, scale: Vec3) -> bool {
        self.scaled_height(scale) <= 2.0 * self.scaled_radius(scale)
    }

    /// Volume of the two hemispheres.
    pub fn sphere_volume(&self, scale: Vec3) -> f32 {
        let r = self.scaled_radius(scale);
        4.0 / 3.0 * PI * r * r * r
    }

    /// Volume of the straight section.
    pub fn cylinder_volume(&self, scale: Vec3) -> f32 {
        let r = self.scaled_radius(scale);
        PI * r * r * self.cylinder_height(scale)
    }

    pub fn volume(&self, scale: Vec3) -> f32 {
        self.sphere_volume(scale) + self.cylinder_volume(scale)
    }

    /// Capsule up direction in world space.
    #[inline]
    pub fn up(&self, pose: &Pose) -> Vec3 {
        pose.rotation * self.axis.unit()
    }

    /// Capsule centre in world space.
    #[inline]
    pub fn world_center(&self, pose: &Pose, scale: Vec3) -> Vec3 {
        pose.position + pose.rotation * (self.center * scale)
    }

    /// Centre of the upper sphere.
    pub fn top_sphere(&self, pose: &Pose, scale: Vec3) -> Vec3 {
        self.world_center(pose, scale) + self.up(pose) * (self.cylinder_height(scale) * 0.5)
    }

    /// Centre of the lower sphere.
    pub fn base_sphere(&self, pose: &Pose, scale: Vec3) -> Vec3 {
        self.world_center(pose, scale) - self.up(pose) * (self.cylinder_height(scale) * 0.5)
    }

    /// Highest point on the capsule surface along its axis.
    pub fn top_point(&self, pose: &Pose, scale: Vec3) -> Vec3 {
        self.top_sphere(pose, scale) + self.up(pose) * self.scaled_radius(scale)
    }

    /// Lowest point on the capsule surface along its axis.
    pub fn base_point(&self, pose: &Pose, scale: Vec3) -> Vec3 {
        self.base_sphere(pose, scale) - self.up(pose) * self.scaled_radius(scale)
    }

    /// Geometry as configured.
    pub fn small(&self, pose: &Pose, scale: Vec3) -> CapsuleGeometry {
        self.geometry(pose, scale, 0.0)
    }

    /// Geometry inflated by the skin width.
    pub fn big(&self, pose: &Pose, scale: Vec3) -> CapsuleGeometry {
        self.geometry(pose, scale, self.skin_width)
    }

    fn geometry(&self, pose: &Pose, scale: Vec3, inflate: f32) -> CapsuleGeometry {
        CapsuleGeometry {
            top: self.top_sphere(pose, scale),
            base: self.base_sphere(pose, scale),
            radius: self.scaled_radius(scale) + inflate,
        }
    }
}

/// World-space capsule: two sphere centres and a radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleGeometry {
    pub top: Vec3,
    pub base: Vec3,
    pub radius: f32,
}

impl CapsuleGeometry {
    /// Whole capsule as a query shape.
    pub fn shape(&self) -> QueryShape {
        QueryShape::capsule(self.top, self.base, self.radius)
    }

    /// Upper sphere as a query shape.
    pub fn top_sphere(&self) -> QueryShape {
        QueryShape::sphere(self.top, self.radius)
    }

    /// Lower sphere as a query shape.
    pub fn base_sphere(&self) -> QueryShape {
        QueryShape::sphere(self.base, self.radius)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn pose_at(position: Vec3) -> Pose {
        Pose::from_position(position)
    }

    #[test]
    fn test_default_dimensions() {
        let shape = CapsuleShape::default();
        let scale = Vec3::ONE;

        assert_eq!(shape.scaled_radius(scale), 0.5);
        assert_eq!(shape.scaled_height(scale), 2.0);
        assert_eq!(shape.cylinder_height(scale), 1.0);
        assert!(!shape.is_sphere_shaped(scale));
    }

    #[test]
    fn test_sphere_shaped_has_no_cylinder() {
        for (height, radius) in [(1.0, 0.5), (0.5, 0.5), (0.0, 0.3), (0.99, 0.5)] {
            let shape = CapsuleShape {
                height,
                radius,
                ..Default::default()
            };
            assert!(shape.is_sphere_shaped(Vec3::ONE), "h={height} r={radius}");
            assert_eq!(shape.cylinder_height(Vec3::ONE), 0.0);

            let pose = pose_at(Vec3::ZERO);
            assert_eq!(shape.top_sphere(&pose, Vec3::ONE), shape.base_sphere(&pose, Vec3::ONE));
        }
    }

    #[test]
    fn test_cylinder_height_never_negative() {
        let scales = [
            Vec3::ONE,
            Vec3::new(2.0, 0.5, 1.0),
            Vec3::new(0.5, 3.0, 0.25),
            Vec3::new(1.0, 0.1, 4.0),
        ];
        for scale in scales {
            for height in [0.0, 0.5, 1.0, 2.0, 3.5] {
                for radius in [0.0, 0.25, 0.5, 1.0] {
                    let shape = CapsuleShape {
                        height,
                        radius,
                        ..Default::default()
                    };
                    let expected =
                        (height * scale.y - 2.0 * radius * scale.x.max(scale.z)).max(0.0);
                    let actual = shape.cylinder_height(scale);
                    assert!(actual >= 0.0);
                    assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
                }
            }
        }
    }

    #[test]
    fn test_scale_uses_widest_horizontal_axis() {
        let shape = CapsuleShape::default();
        let scale = Vec3::new(1.5, 2.0, 0.5);

        assert_eq!(shape.scaled_radius(scale), 0.75);
        assert_eq!(shape.scaled_height(scale), 4.0);
    }

    #[test]
    fn test_sphere_centres_and_outer_points() {
        let shape = CapsuleShape::default();
        let pose = pose_at(Vec3::new(1.0, 0.0, 2.0));

        assert_eq!(shape.world_center(&pose, Vec3::ONE), Vec3::new(1.0, 1.0, 2.0));
        assert_eq!(shape.top_sphere(&pose, Vec3::ONE), Vec3::new(1.0, 1.5, 2.0));
        assert_eq!(shape.base_sphere(&pose, Vec3::ONE), Vec3::new(1.0, 0.5, 2.0));
        assert_eq!(shape.top_point(&pose, Vec3::ONE), Vec3::new(1.0, 2.0, 2.0));
        assert_eq!(shape.base_point(&pose, Vec3::ONE), Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_rotation_tilts_axis() {
        let shape = CapsuleShape {
            center: Vec3::ZERO,
            ..Default::default()
        };
        let pose = Pose::new(Vec3::ZERO, Quat::from_rotation_z(-std::f32::consts::FRAC_PI_2));

        let top = shape.top_sphere(&pose, Vec3::ONE);
        assert!((top - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5, "top = {top:?}");
    }

    #[test]
    fn test_big_geometry_inflates_radius_only() {
        let shape = CapsuleShape::default();
        let pose = pose_at(Vec3::ZERO);

        let small = shape.small(&pose, Vec3::ONE);
        let big = shape.big(&pose, Vec3::ONE);

        assert_eq!(small.top, big.top);
        assert_eq!(small.base, big.base);
        assert!((big.radius - small.radius - shape.skin_width).abs() < 1e-6);
    }

    #[test]
    fn test_volume() {
        let sphere = CapsuleShape {
            height: 1.0,
            radius: 0.5,
            ..Default::default()
        };
        let expected = 4.0 / 3.0 * PI * 0.125;
        assert!((sphere.volume(Vec3::ONE) - expected).abs() < 1e-5);

        let capsule = CapsuleShape::default();
        let expected = 4.0 / 3.0 * PI * 0.125 + PI * 0.25 * 1.0;
        assert!((capsule.volume(Vec3::ONE) - expected).abs() < 1e-5);
    }
}
