use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

use crate::angle::course_of;
use crate::estimator::{EstimationError, Estimator, Filter, Predictor};
use crate::state::{GaussianState, Report, ReportStream};
use crate::track::{SampleGrid, Trajectory};

pub mod estimator;
pub mod exogenous;
pub mod model;
pub mod unscented;

pub use estimator::ExtendedKalmanFilter;
pub use exogenous::ExogenousKalmanFilter;
pub use unscented::UnscentedKalmanFilter;

/// # Explanation
/// Kalman correction with the gain computed through a Cholesky solve of the innovation covariance
/// and the covariance updated in Joseph form, which keeps it symmetric and positive semi-definite
/// for any gain. The result is symmetrised to remove rounding asymmetry.
///
/// `innovation` is the (already wrapped) difference between the measurement and the predicted
/// measurement.
///
/// # Errors
/// NotPositiveDefinite if the innovation covariance H P H^T + R cannot be factorised.
pub fn correct<const MD: usize, const SD: usize>(
    prediction: &GaussianState<SD>,
    innovation: &SVector<f64, MD>,
    measurement_matrix: &SMatrix<f64, MD, SD>,
    measurement_error: &SMatrix<f64, MD, MD>,
) -> Result<GaussianState<SD>, EstimationError> {
    let h = measurement_matrix;
    let innovation_error = h * prediction.error * h.transpose() + measurement_error;
    let kalman_gain = innovation_error
        .cholesky()
        .ok_or_else(|| EstimationError::NotPositiveDefinite {
            context: "innovation covariance".to_string(),
        })?
        .solve(&(h * prediction.error))
        .transpose();

    let estimate = prediction.estimate + kalman_gain * innovation;
    let residual = SMatrix::<f64, SD, SD>::identity() - kalman_gain * h;
    let error = residual * prediction.error * residual.transpose()
        + kalman_gain * measurement_error * kalman_gain.transpose();

    Ok(GaussianState::new(estimate, symmetrize(error)))
}

pub fn symmetrize<const D: usize>(matrix: SMatrix<f64, D, D>) -> SMatrix<f64, D, D> {
    (matrix + matrix.transpose()) * 0.5
}

/// # Explanation
/// Where the course measurement of a filter comes from. The reported course is often unreliable
/// on real vessels, so it can be replaced by the direction of travel between consecutive report
/// positions.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CourseSource {
    #[default]
    Reported,
    FromTrack,
}

impl CourseSource {
    /// Course in radians for `report`. Falls back to the reported course for the first report
    /// and when the positions coincide.
    pub fn course(&self, report: &Report, previous: Option<&Report>) -> f64 {
        match (self, previous) {
            (CourseSource::FromTrack, Some(previous)) => {
                let (dx, dy) = (report.pos_x - previous.pos_x, report.pos_y - previous.pos_y);
                if dx == 0.0 && dy == 0.0 {
                    report.course_rad()
                } else {
                    course_of(dx, dy)
                }
            }
            _ => report.course_rad(),
        }
    }
}

/// # Explanation
/// Initialisation and measurement extraction shared by the recursive vessel filters. Every filter
/// state starts with (x, y, speed, course); further entries start at zero.
#[derive(Debug, Copy, Clone)]
pub struct FilterSetup {
    pub initial_error: f64,
    pub course_source: CourseSource,
}

impl FilterSetup {
    pub fn initial_state<const SD: usize>(&self, first: &Report) -> GaussianState<SD> {
        let mut estimate = SVector::<f64, SD>::zeros();
        let measurement = self.measurement(first, None);
        for (index, value) in measurement.iter().enumerate().take(SD) {
            estimate[index] = *value;
        }
        GaussianState::new(
            estimate,
            SMatrix::<f64, SD, SD>::identity() * self.initial_error,
        )
    }

    /// Measurement vector (x, y, speed, course) of a report.
    pub fn measurement(&self, report: &Report, previous: Option<&Report>) -> SVector<f64, 4> {
        SVector::<f64, 4>::new(
            report.pos_x,
            report.pos_y,
            report.speed,
            self.course_source.course(report, previous),
        )
    }
}

/// # Explanation
/// Runs a predict/correct filter on the fixed sample clock. At every sample the current
/// prediction is emitted; reports that are due are then used to correct it (their distance to
/// the prediction is recorded as the report error) and the result is predicted one step ahead.
///
/// # Type parameters
/// SD is the dimension of the filter state. The measurement is always (x, y, speed, course).
pub struct RecursiveEstimator<const SD: usize, F> {
    name: String,
    filter: F,
    setup: FilterSetup,
    step: f64,
}

impl<const SD: usize, F> RecursiveEstimator<SD, F>
where
    F: Predictor<SD> + Filter<4, SD>,
{
    pub fn new(
        name: &str,
        filter: F,
        setup: FilterSetup,
        est_freq: f64,
    ) -> Result<Self, EstimationError> {
        if !est_freq.is_finite() || est_freq <= 0.0 {
            return Err(EstimationError::Configuration {
                description: format!("sample rate {} Hz is not positive", est_freq),
            });
        }
        if !(setup.initial_error.is_finite() && setup.initial_error > 0.0) {
            return Err(EstimationError::Configuration {
                description: format!("initial error {} is not positive", setup.initial_error),
            });
        }
        Ok(Self {
            name: name.to_string(),
            filter,
            setup,
            step: 1.0 / est_freq,
        })
    }

    /// # Explanation
    /// Same loop as `estimate`, but hands every filter state (after correction, before
    /// prediction) to `inspect`.
    pub fn run_inspected(
        &self,
        reports: &ReportStream,
        mut inspect: impl FnMut(&GaussianState<SD>),
    ) -> Result<Trajectory, EstimationError> {
        let grid = SampleGrid::new(reports.duration(), self.step);
        let mut trajectory = Trajectory::with_capacity(grid.len());
        let mut cursor = reports.cursor();
        let mut previous: Option<&Report> = None;
        let mut prediction = self.setup.initial_state::<SD>(reports.first());

        for time in grid {
            trajectory.push(time, prediction.estimate[0], prediction.estimate[1]);

            let mut state = prediction;
            while let Some((_, report)) = cursor.next_due(time) {
                trajectory.record_error(report);
                let measurement = self.setup.measurement(report, previous);
                state = self.filter.filter(&state, &measurement)?;
                previous = Some(report);
            }
            inspect(&state);
            prediction = self.filter.predict(&state, self.step)?;
        }
        Ok(trajectory)
    }
}

impl<const SD: usize, F> Estimator for RecursiveEstimator<SD, F>
where
    F: Predictor<SD> + Filter<4, SD>,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    fn estimate(&self, reports: &ReportStream) -> Result<Trajectory, EstimationError> {
        self.run_inspected(reports, |_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_keeps_covariance_symmetric() {
        let prediction = GaussianState::new(
            SVector::<f64, 2>::new(1.0, 2.0),
            SMatrix::<f64, 2, 2>::new(2.0, 0.3, 0.3, 1.0),
        );
        let h = SMatrix::<f64, 1, 2>::new(1.0, 0.0);
        let r = SMatrix::<f64, 1, 1>::new(0.5);
        let corrected = correct(&prediction, &SVector::<f64, 1>::new(0.4), &h, &r).unwrap();

        // scalar case: gain = P h^T / (h P h^T + r)
        assert!((corrected.estimate[0] - (1.0 + 2.0 / 2.5 * 0.4)).abs() < 1e-12);
        assert!(corrected.asymmetry() < 1e-15);
        assert!(corrected.error[(0, 0)] < prediction.error[(0, 0)]);
    }

    #[test]
    fn test_course_from_track() {
        let previous = Report::new(0.0, 0.0, 0.0, 1.0, 0.0);
        let report = Report::new(1.0, 1.0, 0.0, 1.0, 0.0);
        let course = CourseSource::FromTrack.course(&report, Some(&previous));
        assert!((course - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(CourseSource::Reported.course(&report, Some(&previous)), 0.0);
    }
}
