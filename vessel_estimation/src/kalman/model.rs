use nalgebra::{SMatrix, SVector};

use crate::angle::wrap_to_pi;
use crate::model::{
    wrap_course, DifferentiableTransitionModel, MeasurementModel, TransitionModel, COURSE,
};

/// # Explanation
/// Constant speed and course kinematics. The state vector is (x, y, speed, course) with the course
/// in radians clockwise from north, integrated with one Euler step:<br>
/// x' = x + U sin(chi) dt<br>
/// y' = y + U cos(chi) dt
#[derive(Copy, Clone, Debug)]
pub struct CourseSpeedModel {
    process_noise: SMatrix<f64, 4, 4>,
}

impl CourseSpeedModel {
    pub fn new(diagonal: SVector<f64, 4>) -> Self {
        Self {
            process_noise: SMatrix::<f64, 4, 4>::from_diagonal(&diagonal),
        }
    }
}

impl TransitionModel<4> for CourseSpeedModel {
    fn transition(&self, state: &SVector<f64, 4>, dt: f64) -> SVector<f64, 4> {
        let (speed, course) = (state[2], state[COURSE]);
        SVector::<f64, 4>::new(
            state[0] + dt * speed * course.sin(),
            state[1] + dt * speed * course.cos(),
            speed,
            wrap_to_pi(course),
        )
    }

    fn transition_error(&self, _dt: f64) -> SMatrix<f64, 4, 4> {
        self.process_noise
    }

    fn state_residual(&self, a: &SVector<f64, 4>, b: &SVector<f64, 4>) -> SVector<f64, 4> {
        wrap_course(a - b)
    }

    fn normalize(&self, state: SVector<f64, 4>) -> SVector<f64, 4> {
        wrap_course(state)
    }
}

impl DifferentiableTransitionModel<4> for CourseSpeedModel {
    /// # Returns
    /// | 1.  0.  sin(chi) dt   U cos(chi) dt |<br>
    /// | 0.  1.  cos(chi) dt  -U sin(chi) dt |<br>
    /// | 0.  0.  1.           0.             |<br>
    /// | 0.  0.  0.           1.             |<br>
    fn transition_jacobian(&self, state: &SVector<f64, 4>, dt: f64) -> SMatrix<f64, 4, 4> {
        let (speed, course) = (state[2], state[COURSE]);
        let (sin, cos) = course.sin_cos();
        SMatrix::<f64, 4, 4>::new(
            1., 0., sin * dt, speed * cos * dt,
            0., 1., cos * dt, -speed * sin * dt,
            0., 0., 1., 0.,
            0., 0., 0., 1.,
        )
    }
}

/// # Explanation
/// Kinematics with a constant yaw rate and acceleration. The state vector is
/// (x, y, speed, course, yaw rate, acceleration):<br>
/// x' = x + U sin(chi) dt, y' = y + U cos(chi) dt<br>
/// U' = U + a dt, chi' = chi + r dt
#[derive(Copy, Clone, Debug)]
pub struct TurnRateModel {
    process_noise: SMatrix<f64, 6, 6>,
}

impl TurnRateModel {
    pub fn new(diagonal: SVector<f64, 6>) -> Self {
        Self {
            process_noise: SMatrix::<f64, 6, 6>::from_diagonal(&diagonal),
        }
    }
}

impl TransitionModel<6> for TurnRateModel {
    fn transition(&self, state: &SVector<f64, 6>, dt: f64) -> SVector<f64, 6> {
        let (speed, course, yaw_rate, acceleration) = (state[2], state[3], state[4], state[5]);
        SVector::<f64, 6>::new(
            state[0] + dt * speed * course.sin(),
            state[1] + dt * speed * course.cos(),
            speed + dt * acceleration,
            wrap_to_pi(course + dt * yaw_rate),
            yaw_rate,
            acceleration,
        )
    }

    fn transition_error(&self, _dt: f64) -> SMatrix<f64, 6, 6> {
        self.process_noise
    }

    fn state_residual(&self, a: &SVector<f64, 6>, b: &SVector<f64, 6>) -> SVector<f64, 6> {
        wrap_course(a - b)
    }

    fn normalize(&self, state: SVector<f64, 6>) -> SVector<f64, 6> {
        wrap_course(state)
    }
}

/// # Explanation
/// Measures position, speed and course, i.e. the first four entries of the state vector. The
/// error matrix is a diagonal matrix.
///
/// SD is the dimension of the state vectors.
#[derive(Copy, Clone, Debug)]
pub struct VesselMeasurementModel<const SD: usize> {
    measurement_error: SMatrix<f64, 4, 4>,
}

impl<const SD: usize> VesselMeasurementModel<SD> {
    pub fn new(diagonal: SVector<f64, 4>) -> Self {
        Self {
            measurement_error: SMatrix::<f64, 4, 4>::from_diagonal(&diagonal),
        }
    }
}

impl<const SD: usize> MeasurementModel<4, SD> for VesselMeasurementModel<SD> {
    fn measurement_matrix(&self) -> SMatrix<f64, 4, SD> {
        SMatrix::<f64, 4, SD>::identity()
    }

    fn measurement_error(&self) -> SMatrix<f64, 4, 4> {
        self.measurement_error
    }

    fn measure(&self, state: &SVector<f64, SD>) -> SVector<f64, 4> {
        wrap_course(self.measurement_matrix() * state)
    }

    fn measurement_residual(&self, a: &SVector<f64, 4>, b: &SVector<f64, 4>) -> SVector<f64, 4> {
        wrap_course(a - b)
    }
}
