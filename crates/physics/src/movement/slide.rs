//! Vector math for redirecting a blocked move.
//!
//! Two redirections are used by the ground solver:
//!
//! - **Slide on surface**: the move is bent onto a walkable slope by
//!   shifting it along the capsule's up axis, so horizontal progress is
//!   kept and the character climbs or descends the slope.
//! - **Slide along surface**: the move is projected onto the plane of a
//!   wall (the surface normal flattened against up), so the character
//!   grazes along it instead of stopping.

use glam::Vec3;

/// Slid moves shorter than this are not rescaled.
pub const MIN_MOVE_ALONG_SURFACE: f32 = 0.0001;

/// Remove the component of `vector` along `normal`.
///
/// `normal` does not need to be unit length. A near-zero normal returns
/// `vector` unchanged.
pub fn project_on_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    let length_sq = normal.length_squared();
    if length_sq < f32::EPSILON {
        return vector;
    }
    vector - normal * (vector.dot(normal) / length_sq)
}

/// Move `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance < f32::EPSILON {
        target
    } else {
        current + delta / distance * max_delta
    }
}

/// Angle between two vectors in degrees. Zero if either is zero length.
pub fn angle_between_deg(a: Vec3, b: Vec3) -> f32 {
    let denominator = (a.length_squared() * b.length_squared()).sqrt();
    if denominator < f32::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denominator).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Bend `remaining` onto the plane with `normal` by moving it along `up`.
///
/// With `maintain_velocity` the full horizontal progress of `remaining` is
/// kept (the move gets longer on steeper slopes), otherwise the result is
/// rescaled to the length of `remaining`.
///
/// Returns `None` for a zero move or a surface parallel to `up`.
pub fn slide_on_surface(
    remaining: Vec3,
    up: Vec3,
    normal: Vec3,
    maintain_velocity: bool,
) -> Option<Vec3> {
    let length = remaining.length();
    if length < f32::EPSILON {
        return None;
    }

    let lift = normal.dot(up);
    if lift.abs() < f32::EPSILON {
        return None;
    }

    let along = -normal.dot(remaining) / lift;
    let slid = remaining + up * along;

    if maintain_velocity {
        Some(slid)
    } else {
        Some(slid.normalize_or_zero() * length)
    }
}

/// Project `remaining` onto the wall plane of `normal` flattened against `up`.
///
/// With `maintain_velocity` a slid vector longer than
/// [`MIN_MOVE_ALONG_SURFACE`] is rescaled to the length of `remaining`.
pub fn slide_along_surface(remaining: Vec3, up: Vec3, normal: Vec3, maintain_velocity: bool) -> Vec3 {
    let wall = project_on_plane(normal, up);
    let slid = project_on_plane(remaining, wall);

    let slid_length = slid.length();
    if maintain_velocity && slid_length > MIN_MOVE_ALONG_SURFACE {
        slid / slid_length * remaining.length()
    } else {
        slid
    }
}

// ============================================================================
// Tests
// ============================================================================
