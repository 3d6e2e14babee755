//! Small vector helpers the simulation needs on top of `glam`.
//!
//! These are written out rather than delegated to `glam` so the arithmetic is
//! fixed: the replay checkpoints hash raw float bits, and a different but
//! "equivalent" formula would change them.

use glam::Vec2;

/// Normalize `v`, or return zero if it has no length.
///
/// Never produces NaN.
#[inline]
pub fn safe_normalize(v: Vec2) -> Vec2 {
    if v.length_squared() > 0.0 {
        v / v.length()
    } else {
        Vec2::ZERO
    }
}

/// Linear interpolation, `(1 - t) * from + t * to` per component.
#[inline]
pub fn lerp(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    Vec2::new(
        (1.0 - t) * from.x + t * to.x,
        (1.0 - t) * from.y + t * to.y,
    )
}

/// Wrap a coordinate that left `[-bound, bound]` to the opposite edge.
#[inline]
pub fn wrap_axis(value: f32, bound: f32) -> f32 {
    if value < -bound {
        bound
    } else if value > bound {
        -bound
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_normalize_zero_is_zero() {
        let n = safe_normalize(Vec2::ZERO);
        assert_eq!(n, Vec2::ZERO);
        assert!(!n.x.is_nan() && !n.y.is_nan());
    }

    #[test]
    fn safe_normalize_unit_length() {
        let n = safe_normalize(Vec2::new(3.0, -4.0));
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
        assert!((n.y + 0.8).abs() < 1e-6);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Vec2::new(2.0, -2.0);
        let b = Vec2::new(4.0, 8.0);
        assert_eq!(lerp(a, b, 0.0), a);
        assert_eq!(lerp(a, b, 1.0), b);
        assert_eq!(lerp(a, b, 0.5), Vec2::new(3.0, 3.0));
    }

    #[test]
    fn wrap_axis_both_edges() {
        assert_eq!(wrap_axis(6.5, 6.0), -6.0);
        assert_eq!(wrap_axis(-6.5, 6.0), 6.0);
        assert_eq!(wrap_axis(6.0, 6.0), 6.0);
        assert_eq!(wrap_axis(0.25, 6.0), 0.25);
    }
}
