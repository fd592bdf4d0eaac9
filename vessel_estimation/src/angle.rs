use std::f64::consts::{PI, TAU};

/// Wraps an angle in radians to (-pi, pi].
pub fn wrap_to_pi(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Wraps an angle in degrees to (-180, 180].
pub fn wrap_to_180(angle: f64) -> f64 {
    wrap_to_pi(angle.to_radians()).to_degrees()
}

/// # Explanation
/// Interpolates from course `from` to course `to` (radians) along the shorter arc. A weight of
/// zero returns `from`, a weight of one returns `to`, both wrapped to (-pi, pi].
pub fn interpolate_course(from: f64, to: f64, weight: f64) -> f64 {
    let from = wrap_to_pi(from);
    let difference = wrap_to_pi(wrap_to_pi(to) - from);
    wrap_to_pi(from + difference * weight)
}

/// Compass course (radians, clockwise from north) of the displacement (dx, dy).
pub fn course_of(dx: f64, dy: f64) -> f64 {
    dx.atan2(dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_to_pi() {
        assert!((wrap_to_pi(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((wrap_to_pi(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert_eq!(wrap_to_pi(PI), PI);
        assert_eq!(wrap_to_pi(-PI), PI);
        assert!((wrap_to_pi(0.25) - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_interpolate_course_takes_short_arc() {
        let course = interpolate_course(350f64.to_radians(), 10f64.to_radians(), 0.5);
        assert!(course.abs() < 1e-12);

        let course = interpolate_course(170f64.to_radians(), (-170f64).to_radians(), 0.5);
        assert!((course.abs() - PI).abs() < 1e-12);
    }

    #[test]
    fn test_course_of() {
        assert!((course_of(1.0, 0.0) - PI / 2.0).abs() < 1e-12);
        assert!(course_of(0.0, 1.0).abs() < 1e-12);
        assert!((wrap_to_180(350.0) + 10.0).abs() < 1e-9);
    }
}
