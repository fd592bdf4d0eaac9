use nalgebra::{SMatrix, SVector};

use crate::estimator::EstimationError;

/// # Explanation
/// A polynomial of degree N - 1 with coefficients in ascending powers, i.e.
/// p(t) = c0 + c1 t + ... + c(N-1) t^(N-1).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Polynomial<const N: usize> {
    coefficients: SVector<f64, N>,
}

impl<const N: usize> Polynomial<N> {
    pub fn new(coefficients: SVector<f64, N>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &SVector<f64, N> {
        &self.coefficients
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, coefficient| acc * t + coefficient)
    }

    pub fn derivative(&self, t: f64) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .fold(0.0, |acc, (power, coefficient)| {
                acc * t + power as f64 * coefficient
            })
    }
}

/// # Explanation
/// Fits the polynomial that passes exactly through the N given (t, value) points by solving the
/// Vandermonde system.
///
/// # Errors
/// Returns SingularMatrix if two points share the same t.
pub fn interpolate<const N: usize>(
    points: &[(f64, f64); N],
) -> Result<Polynomial<N>, EstimationError> {
    let vandermonde = SMatrix::<f64, N, N>::from_fn(|row, column| points[row].0.powi(column as i32));
    let values = SVector::<f64, N>::from_fn(|row, _| points[row].1);
    solve(vandermonde, values, "vandermonde interpolation").map(Polynomial::new)
}

/// # Explanation
/// Fits the cubic matching position and first derivative at two instants (Hermite interpolation).
/// Each knot is (t, value, derivative).
pub fn hermite_cubic(
    first: (f64, f64, f64),
    second: (f64, f64, f64),
) -> Result<Polynomial<4>, EstimationError> {
    let (t1, p1, v1) = first;
    let (t2, p2, v2) = second;
    let system = SMatrix::<f64, 4, 4>::new(
        1., t1, t1.powi(2), t1.powi(3),
        1., t2, t2.powi(2), t2.powi(3),
        0., 1., 2. * t1, 3. * t1.powi(2),
        0., 1., 2. * t2, 3. * t2.powi(2),
    );
    let values = SVector::<f64, 4>::new(p1, p2, v1, v2);
    solve(system, values, "hermite cubic").map(Polynomial::new)
}

/// # Explanation
/// A quadratic cannot honour two positions and two derivatives at once, so the four constraints
/// are satisfied in the least-squares sense (normal equations of the 4x3 system).
pub fn hermite_quadratic(
    first: (f64, f64, f64),
    second: (f64, f64, f64),
) -> Result<Polynomial<3>, EstimationError> {
    let (t1, p1, v1) = first;
    let (t2, p2, v2) = second;
    let system = SMatrix::<f64, 4, 3>::new(
        1., t1, t1.powi(2),
        1., t2, t2.powi(2),
        0., 1., 2. * t1,
        0., 1., 2. * t2,
    );
    let values = SVector::<f64, 4>::new(p1, p2, v1, v2);
    let normal = system.transpose() * system;
    let projected = system.transpose() * values;
    solve(normal, projected, "hermite quadratic").map(Polynomial::new)
}

fn solve<const N: usize>(
    system: SMatrix<f64, N, N>,
    values: SVector<f64, N>,
    context: &str,
) -> Result<SVector<f64, N>, EstimationError> {
    system
        .try_inverse()
        .map(|inverse| inverse * values)
        .filter(|solution| solution.iter().all(|c| c.is_finite()))
        .ok_or_else(|| EstimationError::SingularMatrix {
            context: context.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_quadratic() {
        // p(t) = 1 + 2t + 3t^2
        let points = [(0.0, 1.0), (1.0, 6.0), (2.0, 17.0)];
        let poly = interpolate(&points).unwrap();
        assert!((poly.evaluate(3.0) - 34.0).abs() < 1e-9);
        assert!((poly.derivative(1.0) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_duplicate_time_is_singular() {
        let points = [(1.0, 1.0), (1.0, 2.0), (2.0, 3.0)];
        assert!(matches!(
            interpolate(&points),
            Err(EstimationError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn test_hermite_cubic_matches_knots() {
        let poly = hermite_cubic((0.0, 1.0, -2.0), (3.0, 4.0, 0.5)).unwrap();
        assert!((poly.evaluate(0.0) - 1.0).abs() < 1e-9);
        assert!((poly.evaluate(3.0) - 4.0).abs() < 1e-9);
        assert!((poly.derivative(0.0) + 2.0).abs() < 1e-9);
        assert!((poly.derivative(3.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_hermite_quadratic_exact_when_consistent() {
        // p(t) = 2 - t + 0.5 t^2 satisfies all four constraints exactly
        let poly = hermite_quadratic((0.0, 2.0, -1.0), (2.0, 2.0, 1.0)).unwrap();
        assert!((poly.evaluate(4.0) - 6.0).abs() < 1e-9);
    }
}
