use std::f64::consts::FRAC_PI_2;

use crate::angle::wrap_to_pi;
use crate::estimator::EstimationError;
use crate::kinematic::KinematicPredictor;
use crate::polynomial::{interpolate, Polynomial};
use crate::state::{Report, VesselState};

/// # Explanation
/// Quadratic fitted in a frame aligned with the chord from the oldest to the newest of three
/// reports. In that frame the path is a function y = f(x), which does not depend on the report
/// timing, and the vessel advances along x with its reported speed:<br>
/// x' = x + U cos(heading) dt, y' = f(x'), heading' = atan(f'(x'))
///
/// The frame has its origin at the oldest report and is rotated so that the chord lies on +x.
#[derive(Debug, Clone)]
pub struct ChordQuadratic {
    curve: Polynomial<3>,
    origin: (f64, f64),
    rotation: f64,
    local_x: f64,
    heading: f64,
    speed: f64,
}

impl ChordQuadratic {
    /// # Errors
    /// DegenerateGeometry unless the middle report lies strictly between the outer two along the
    /// chord. This includes coinciding outer reports and reversing tracks.
    pub fn new(first: &Report, middle: &Report, last: &Report) -> Result<Self, EstimationError> {
        let chord = (last.pos_x - first.pos_x, last.pos_y - first.pos_y);
        if chord.0 == 0.0 && chord.1 == 0.0 {
            return Err(EstimationError::DegenerateGeometry {
                reason: "first and last report coincide".to_string(),
            });
        }
        let origin = (first.pos_x, first.pos_y);
        let rotation = chord.1.atan2(chord.0);

        let [p1, p2, p3] = [first, middle, last].map(|report| {
            to_local(report.pos_x - origin.0, report.pos_y - origin.1, rotation)
        });
        if !(p1.0 < p2.0 && p2.0 < p3.0) {
            return Err(EstimationError::DegenerateGeometry {
                reason: "middle report does not lie between the outer reports".to_string(),
            });
        }

        let curve = interpolate(&[p1, p2, p3])?;
        Ok(Self {
            curve,
            origin,
            rotation,
            local_x: p3.0,
            heading: curve.derivative(p3.0).atan(),
            speed: last.speed,
        })
    }
}

/// Rotates a world offset into the chord frame.
fn to_local(dx: f64, dy: f64, rotation: f64) -> (f64, f64) {
    let (sin, cos) = rotation.sin_cos();
    (dx * cos + dy * sin, -dx * sin + dy * cos)
}

impl KinematicPredictor for ChordQuadratic {
    fn predict(&mut self, dt: f64) -> VesselState {
        self.local_x += self.speed * self.heading.cos() * dt;
        let local_y = self.curve.evaluate(self.local_x);
        self.heading = self.curve.derivative(self.local_x).atan();

        let (sin, cos) = self.rotation.sin_cos();
        let pos_x = self.origin.0 + self.local_x * cos - local_y * sin;
        let pos_y = self.origin.1 + self.local_x * sin + local_y * cos;
        // mathematical angle of travel to compass course
        let course = wrap_to_pi(FRAC_PI_2 - (self.rotation + self.heading));
        VesselState::new(pos_x, pos_y, self.speed, course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_track_along_north_east() {
        let first = Report::new(0.0, 0.0, 0.0, 1.0, 45.0);
        let middle = Report::new(1.0, 1.0, 1.0, 1.0, 45.0);
        let last = Report::new(2.0, 2.0, 2.0, 2f64.sqrt(), 45.0);
        let mut predictor = ChordQuadratic::new(&first, &middle, &last).unwrap();

        let state = predictor.predict(0.0);
        assert!((state.pos_x - 2.0).abs() < 1e-9);
        assert!((state.pos_y - 2.0).abs() < 1e-9);
        assert!((state.course - 45f64.to_radians()).abs() < 1e-9);

        let state = predictor.predict(1.0);
        assert!((state.pos_x - 3.0).abs() < 1e-9);
        assert!((state.pos_y - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_reversing_track_is_degenerate() {
        let first = Report::new(0.0, 0.0, 0.0, 1.0, 90.0);
        let middle = Report::new(1.0, 10.0, 0.0, 1.0, 90.0);
        let last = Report::new(2.0, 5.0, 0.0, 1.0, 270.0);
        assert!(matches!(
            ChordQuadratic::new(&first, &middle, &last),
            Err(EstimationError::DegenerateGeometry { .. })
        ));
    }
}
