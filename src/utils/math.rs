//! # Game Mathematics
//!
//! Helpers for the horizontal (x/z) plane that all movement and AI math
//! happens in. The y axis is vertical and only matters for projectiles.

use crate::config::DEGENERATE_LENGTH;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Direction used when a flat vector is too short to normalize.
pub const DEFAULT_FACING: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Projects a vector onto the horizontal plane.
pub fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Length of a vector ignoring its vertical component.
///
/// # Examples
///
/// ```
/// use delve::flat_length;
/// use glam::Vec3;
///
/// assert_eq!(flat_length(Vec3::new(3.0, 10.0, 4.0)), 5.0);
/// ```
pub fn flat_length(v: Vec3) -> f32 {
    (v.x * v.x + v.z * v.z).sqrt()
}

/// Unit vector on the horizontal plane, or [`DEFAULT_FACING`] when degenerate.
pub fn flat_normalize(v: Vec3) -> Vec3 {
    let length = flat_length(v);
    if length <= DEGENERATE_LENGTH {
        return DEFAULT_FACING;
    }
    Vec3::new(v.x / length, 0.0, v.z / length)
}

/// Full 3D normalization, zero when degenerate.
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let length = v.length();
    if length <= DEGENERATE_LENGTH {
        return Vec3::ZERO;
    }
    v / length
}

/// Heading of a flat direction, with -z as angle 0.
pub fn heading(direction: Vec3) -> f32 {
    (-direction.x).atan2(-direction.z)
}

/// Wraps an angle into `[-π, π]`.
pub fn wrap_angle(mut angle: f32) -> f32 {
    while angle > PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}

/// Absolute angle between two flat directions, in `[0, π]`.
pub fn heading_difference(a: Vec3, b: Vec3) -> f32 {
    wrap_angle(heading(a) - heading(b)).abs()
}
