use nalgebra::{SMatrix, SVector};

use crate::angle::wrap_to_pi;

/// Index of the course in every vessel state vector.
pub const COURSE: usize = 3;

/// # Explanation
/// The TransitionModel propagates a state vector by dt seconds and knows the process noise that is
/// added per propagation step. States containing angles override `state_residual` and `normalize`
/// so that differences and results stay wrapped.
///
/// # Type parameters
/// SD is the dimension of the state (eg four for the speed/course model).
pub trait TransitionModel<const SD: usize> {
    fn transition(&self, state: &SVector<f64, SD>, dt: f64) -> SVector<f64, SD>;

    /// # Returns
    /// Returns the process noise added when the state is propagated by dt.
    fn transition_error(&self, dt: f64) -> SMatrix<f64, SD, SD>;

    fn state_residual(&self, a: &SVector<f64, SD>, b: &SVector<f64, SD>) -> SVector<f64, SD> {
        a - b
    }

    fn normalize(&self, state: SVector<f64, SD>) -> SVector<f64, SD> {
        state
    }
}

/// # Explanation
/// A transition model that can be linearised about a state, as needed by the extended Kalman filter.
pub trait DifferentiableTransitionModel<const SD: usize>: TransitionModel<SD> {
    /// # Returns
    /// Returns the discrete state transition matrix I + A dt, where A is the jacobian of the
    /// continuous dynamics evaluated at `state`.
    fn transition_jacobian(&self, state: &SVector<f64, SD>, dt: f64) -> SMatrix<f64, SD, SD>;
}

/// # Explanation
/// The measurement matrix transforms the state into the measurement space.
/// The measurement error represents the possible error of a report.
///
/// # Type parameters
/// SD is the dimension of the state, MD the dimension of the measurement vectors.
pub trait MeasurementModel<const MD: usize, const SD: usize> {
    fn measurement_matrix(&self) -> SMatrix<f64, MD, SD>;

    fn measurement_error(&self) -> SMatrix<f64, MD, MD>;

    fn measure(&self, state: &SVector<f64, SD>) -> SVector<f64, MD> {
        self.measurement_matrix() * state
    }

    fn measurement_residual(
        &self,
        a: &SVector<f64, MD>,
        b: &SVector<f64, MD>,
    ) -> SVector<f64, MD> {
        a - b
    }
}

/// Wraps the course entry of a state or measurement vector to (-pi, pi].
pub fn wrap_course<const D: usize>(mut vector: SVector<f64, D>) -> SVector<f64, D> {
    vector[COURSE] = wrap_to_pi(vector[COURSE]);
    vector
}
