use crate::angle::course_of;
use crate::estimator::EstimationError;
use crate::kinematic::{Interpolant, KinematicPredictor};
use crate::polynomial::{hermite_cubic, hermite_quadratic, interpolate, Polynomial};
use crate::state::{Report, VesselState};

/// # Explanation
/// Position as a polynomial in time for each axis, fitted to a report window. Time is measured
/// from the oldest report of the window to keep the systems well conditioned.
///
/// The course follows the tangent of the curve, the speed is held at the newest report's speed.
///
/// # Type parameters
/// N is the number of coefficients per axis (three for quadratics, four for cubics).
#[derive(Debug, Clone)]
pub struct PolynomialTrack<const N: usize> {
    x: Polynomial<N>,
    y: Polynomial<N>,
    origin: f64,
    newest: f64,
    elapsed: f64,
    speed: f64,
    course: f64,
}

impl<const N: usize> PolynomialTrack<N> {
    /// # Explanation
    /// Fits the polynomial of degree N - 1 through the positions of exactly N reports.
    pub fn through_points(window: &[Report]) -> Result<Self, EstimationError> {
        if window.len() != N {
            return Err(EstimationError::DegenerateGeometry {
                reason: format!("{} reports cannot define {} coefficients", window.len(), N),
            });
        }
        let origin = window[0].time;
        let x = interpolate(&std::array::from_fn(|i| {
            (window[i].time - origin, window[i].pos_x)
        }))?;
        let y = interpolate(&std::array::from_fn(|i| {
            (window[i].time - origin, window[i].pos_y)
        }))?;
        Ok(Self::new(x, y, origin, &window[N - 1]))
    }

    fn new(x: Polynomial<N>, y: Polynomial<N>, origin: f64, newest: &Report) -> Self {
        Self {
            x,
            y,
            origin,
            newest: newest.time - origin,
            elapsed: 0.0,
            speed: newest.speed,
            course: newest.course_rad(),
        }
    }
}

impl PolynomialTrack<3> {
    /// Quadratic per axis matching both positions and both velocity tangents in the least-squares
    /// sense.
    pub fn hermite_quadratic(previous: &Report, newest: &Report) -> Result<Self, EstimationError> {
        let [first, second] = hermite_knots(previous, newest);
        let x = hermite_quadratic(first.0, second.0)?;
        let y = hermite_quadratic(first.1, second.1)?;
        Ok(Self::new(x, y, previous.time, newest))
    }
}

impl PolynomialTrack<4> {
    /// Cubic per axis matching both positions and both velocity tangents exactly.
    pub fn hermite_cubic(previous: &Report, newest: &Report) -> Result<Self, EstimationError> {
        let [first, second] = hermite_knots(previous, newest);
        let x = hermite_cubic(first.0, second.0)?;
        let y = hermite_cubic(first.1, second.1)?;
        Ok(Self::new(x, y, previous.time, newest))
    }
}

type Knot = (f64, f64, f64);

/// (time, position, velocity) knots per axis for both reports.
fn hermite_knots(previous: &Report, newest: &Report) -> [(Knot, Knot); 2] {
    [previous, newest].map(|report| {
        let tau = report.time - previous.time;
        let (vx, vy) = report.velocity();
        ((tau, report.pos_x, vx), (tau, report.pos_y, vy))
    })
}

impl<const N: usize> KinematicPredictor for PolynomialTrack<N> {
    fn predict(&mut self, dt: f64) -> VesselState {
        self.elapsed += dt;
        let tau = self.newest + self.elapsed;
        let (dx, dy) = (self.x.derivative(tau), self.y.derivative(tau));
        if dx != 0.0 || dy != 0.0 {
            self.course = course_of(dx, dy);
        }
        VesselState::new(self.x.evaluate(tau), self.y.evaluate(tau), self.speed, self.course)
    }
}

impl<const N: usize> Interpolant for PolynomialTrack<N> {
    fn position_at(&self, time: f64) -> (f64, f64) {
        let tau = time - self.origin;
        (self.x.evaluate(tau), self.y.evaluate(tau))
    }
}
