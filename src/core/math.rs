// Math utilities and helper functions

use glam::Vec2;

/// Lengths below this are treated as zero
pub const EPSILON: f32 = 1.0e-6;

/// Axis used whenever a direction cannot be derived from a degenerate vector
pub const FALLBACK_AXIS: Vec2 = Vec2::X;

/// Normalize `v`, or return `fallback` when `v` is too short to have a direction
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let len = v.length();
    if len < EPSILON {
        fallback
    } else {
        v / len
    }
}

/// 2D cross product of two vectors (the z component of the 3D cross)
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.perp_dot(b)
}

/// Rotate `v` counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_normalize_or_fallback() {
        assert_eq!(normalize_or(Vec2::ZERO, FALLBACK_AXIS), Vec2::X);
        assert_eq!(normalize_or(Vec2::splat(1.0e-9), Vec2::Y), Vec2::Y);

        let n = normalize_or(Vec2::new(3.0, 4.0), FALLBACK_AXIS);
        assert_abs_diff_eq!(n.x, 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(n.y, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_cross() {
        assert_eq!(cross(Vec2::X, Vec2::Y), 1.0);
        assert_eq!(cross(Vec2::Y, Vec2::X), -1.0);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let r = rotate(Vec2::X, std::f32::consts::FRAC_PI_2);
        assert_abs_diff_eq!(r.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(r.y, 1.0, epsilon = 1e-6);
    }
}
