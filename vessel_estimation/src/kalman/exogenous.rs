use nalgebra::{SMatrix, SVector};

use crate::angle::wrap_to_pi;
use crate::estimator::{EstimationError, Estimator};
use crate::kalman::correct;
use crate::kalman::model::{CourseSpeedModel, VesselMeasurementModel};
use crate::model::{DifferentiableTransitionModel, MeasurementModel, TransitionModel};
use crate::state::{GaussianState, Report, ReportStream};
use crate::track::{SampleGrid, Trajectory};

/// # Explanation
/// Tuning of the exogenous Kalman filter.
///
/// # Parameters
/// gains are the proportional observer gains for (x, y, speed, course).
/// The time constants (s) set how fast acceleration and yaw rate follow their targets.
/// max_yaw_rate (rad/s) and max_acceleration (m/s^2) saturate the targets.
/// Targets are zero when the mean spacing of the last three reports exceeds staleness (s).
#[derive(Debug, Clone, Copy)]
pub struct ExogenousParameters {
    pub gains: [f64; 4],
    pub process_noise: SVector<f64, 4>,
    pub measurement_noise: SVector<f64, 4>,
    pub initial_error: f64,
    pub acceleration_time_constant: f64,
    pub yaw_rate_time_constant: f64,
    pub max_yaw_rate: f64,
    pub max_acceleration: f64,
    pub staleness: f64,
}

impl Default for ExogenousParameters {
    fn default() -> Self {
        Self {
            gains: [10.0, 10.0, 30.0, 50.0],
            process_noise: SVector::<f64, 4>::new(1.0, 1.0, 10.0, 10.0),
            measurement_noise: SVector::<f64, 4>::repeat(1.0),
            initial_error: 1.0,
            acceleration_time_constant: 10.0,
            yaw_rate_time_constant: 50.0,
            max_yaw_rate: 1f64.to_radians(),
            max_acceleration: 1.0,
            staleness: 4.0,
        }
    }
}

/// # Explanation
/// Acceleration and yaw rate targets from a second order backward difference over the newest
/// three reports (oldest first). With h1 and h2 the two newest report spacings and
/// alpha = ((h1 + h2) / h1)^2:<br>
/// v' = ((1 - alpha) v_k + alpha v_k-1 - v_k-2) / ((1 - alpha) h1 + h2)
///
/// Course differences are wrapped before they enter the difference.
///
/// # Returns
/// (acceleration, yaw rate), both unsaturated. Zero with fewer than three reports or when the
/// mean spacing exceeds `staleness`.
pub fn control_targets(reports: &[Report], staleness: f64) -> (f64, f64) {
    let [older, previous, newest] = match reports {
        [.., older, previous, newest] => [older, previous, newest],
        _ => return (0.0, 0.0),
    };
    let h1 = newest.time - previous.time;
    let h2 = previous.time - older.time;
    if (h1 + h2) / 2.0 > staleness {
        return (0.0, 0.0);
    }
    let alpha = ((h1 + h2) / h1).powi(2);
    let denominator = (1.0 - alpha) * h1 + h2;

    let acceleration =
        ((1.0 - alpha) * newest.speed + alpha * previous.speed - older.speed) / denominator;
    let d1 = wrap_to_pi(newest.course_rad() - previous.course_rad());
    let d2 = wrap_to_pi(previous.course_rad() - older.course_rad());
    let yaw_rate = ((1.0 - alpha) * d1 + d2) / denominator;
    (acceleration, yaw_rate)
}

/// Clamps (acceleration, yaw rate) targets to +-max_acceleration and +-max_yaw_rate.
pub fn saturate_targets(
    (acceleration, yaw_rate): (f64, f64),
    max_acceleration: f64,
    max_yaw_rate: f64,
) -> (f64, f64) {
    (
        acceleration.clamp(-max_acceleration, max_acceleration),
        yaw_rate.clamp(-max_yaw_rate, max_yaw_rate),
    )
}

/// # Explanation
/// The exogenous Kalman filter (XKF) runs a nonlinear kinematic observer with fixed gains and
/// linearises a Kalman filter about the observer state instead of about its own estimate. The
/// observer is globally stable, so the linearisation point cannot run away with a poor filter
/// estimate. Acceleration and yaw rate enter both as control inputs.
pub struct ExogenousKalmanFilter {
    parameters: ExogenousParameters,
    kinematics: CourseSpeedModel,
    measurement_model: VesselMeasurementModel<4>,
    step: f64,
}

/// Observer state plus the lagged control inputs and their current targets.
#[derive(Debug, Clone)]
struct Observer {
    state: SVector<f64, 4>,
    acceleration: f64,
    yaw_rate: f64,
    acceleration_target: f64,
    yaw_rate_target: f64,
}

impl ExogenousKalmanFilter {
    pub fn new(parameters: ExogenousParameters, est_freq: f64) -> Result<Self, EstimationError> {
        if !est_freq.is_finite() || est_freq <= 0.0 {
            return Err(EstimationError::Configuration {
                description: format!("sample rate {} Hz is not positive", est_freq),
            });
        }
        if parameters.acceleration_time_constant <= 0.0 || parameters.yaw_rate_time_constant <= 0.0
        {
            return Err(EstimationError::Configuration {
                description: "time constants must be positive".to_string(),
            });
        }
        if parameters.max_yaw_rate < 0.0 || parameters.max_acceleration < 0.0 {
            return Err(EstimationError::Configuration {
                description: "saturation limits must not be negative".to_string(),
            });
        }
        Ok(Self {
            parameters,
            kinematics: CourseSpeedModel::new(parameters.process_noise),
            measurement_model: VesselMeasurementModel::new(parameters.measurement_noise),
            step: 1.0 / est_freq,
        })
    }

    fn measurement(report: &Report) -> SVector<f64, 4> {
        SVector::<f64, 4>::new(report.pos_x, report.pos_y, report.speed, report.course_rad())
    }

    /// Pulls the observer towards the measurement.
    fn correct_observer(&self, observer: &mut Observer, measurement: &SVector<f64, 4>) {
        let residual = self
            .measurement_model
            .measurement_residual(measurement, &observer.state);
        for (index, gain) in self.parameters.gains.iter().enumerate() {
            observer.state[index] += self.step * gain * residual[index];
        }
        observer.state = self.kinematics.normalize(observer.state);
    }

    /// # Explanation
    /// Propagates the filter linearised about the observer state X:<br>
    /// x' = f(X) + PHI (x - X) + h B (a, r), P' = PHI P PHI^T + Q
    fn predict_filter(&self, filter: &GaussianState<4>, observer: &Observer) -> GaussianState<4> {
        let h = self.step;
        let linearisation = observer.state;
        let transition_matrix = self.kinematics.transition_jacobian(&linearisation, h);
        let control = SVector::<f64, 4>::new(0.0, 0.0, observer.acceleration, observer.yaw_rate);

        let deviation = self.kinematics.state_residual(&filter.estimate, &linearisation);
        let estimate = self.kinematics.transition(&linearisation, h)
            + transition_matrix * deviation
            + control * h;

        GaussianState::new(
            self.kinematics.normalize(estimate),
            transition_matrix * filter.error * transition_matrix.transpose()
                + self.kinematics.transition_error(h),
        )
    }

    fn predict_observer(&self, observer: &mut Observer) {
        let h = self.step;
        let mut state = self.kinematics.transition(&observer.state, h);
        state[2] += h * observer.acceleration;
        state[3] += h * observer.yaw_rate;
        observer.state = self.kinematics.normalize(state);

        observer.acceleration += h * (observer.acceleration_target - observer.acceleration)
            / self.parameters.acceleration_time_constant;
        observer.yaw_rate +=
            h * (observer.yaw_rate_target - observer.yaw_rate) / self.parameters.yaw_rate_time_constant;
    }
}

impl Estimator for ExogenousKalmanFilter {
    fn name(&self) -> String {
        "XKF".to_string()
    }

    fn estimate(&self, reports: &ReportStream) -> Result<Trajectory, EstimationError> {
        let grid = SampleGrid::new(reports.duration(), self.step);
        let mut trajectory = Trajectory::with_capacity(grid.len());
        let mut cursor = reports.cursor();

        let initial = Self::measurement(reports.first());
        let mut observer = Observer {
            state: initial,
            acceleration: 0.0,
            yaw_rate: 0.0,
            acceleration_target: 0.0,
            yaw_rate_target: 0.0,
        };
        let mut filter = GaussianState::new(
            initial,
            SMatrix::<f64, 4, 4>::identity() * self.parameters.initial_error,
        );

        for time in grid {
            trajectory.push(time, filter.estimate[0], filter.estimate[1]);

            while let Some((_, report)) = cursor.next_due(time) {
                trajectory.record_error(report);

                let (acceleration, yaw_rate) = saturate_targets(
                    control_targets(cursor.consumed(), self.parameters.staleness),
                    self.parameters.max_acceleration,
                    self.parameters.max_yaw_rate,
                );
                observer.acceleration_target = acceleration;
                observer.yaw_rate_target = yaw_rate;

                let measurement = Self::measurement(report);
                let innovation = self.measurement_model.measurement_residual(
                    &measurement,
                    &self.measurement_model.measure(&filter.estimate),
                );
                let corrected = correct(
                    &filter,
                    &innovation,
                    &self.measurement_model.measurement_matrix(),
                    &self.measurement_model.measurement_error(),
                )?;
                filter = GaussianState::new(
                    self.kinematics.normalize(corrected.estimate),
                    corrected.error,
                );
                self.correct_observer(&mut observer, &measurement);
            }

            filter = self.predict_filter(&filter, &observer);
            self.predict_observer(&mut observer);
        }
        Ok(trajectory)
    }
}
