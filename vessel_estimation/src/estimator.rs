use std::fmt;

use nalgebra::SVector;

use crate::state::{GaussianState, ReportStream};
use crate::track::Trajectory;

/// # Explanation
/// Everything that can go wrong while building or running an estimator. Degenerate geometry and
/// singular matrices are expected while fitting predictors and are recovered by the caller;
/// the rest abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimationError {
    /// The report window cannot be fitted with the requested curve.
    DegenerateGeometry { reason: String },
    /// A linear system had no unique solution.
    SingularMatrix { context: String },
    /// A covariance matrix lost positive definiteness.
    NotPositiveDefinite { context: String },
    /// Report timestamps must be strictly increasing.
    NonMonotonicTime {
        index: usize,
        previous: f64,
        current: f64,
    },
    EmptyReportStream,
    /// A report carried a non-finite field.
    InvalidReport { index: usize },
    Configuration { description: String },
    EmptyTrajectory,
    /// Parallel position and time sequences differ in length.
    MismatchedTrajectory { x: usize, y: usize, t: usize },
}

impl fmt::Display for EstimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimationError::DegenerateGeometry { reason } => {
                write!(f, "Degenerate report geometry: {}", reason)
            }
            EstimationError::SingularMatrix { context } => {
                write!(f, "Singular matrix while solving {}", context)
            }
            EstimationError::NotPositiveDefinite { context } => {
                write!(f, "Matrix is not positive definite: {}", context)
            }
            EstimationError::NonMonotonicTime {
                index,
                previous,
                current,
            } => write!(
                f,
                "Report {} has time {} which does not follow {}",
                index, current, previous
            ),
            EstimationError::EmptyReportStream => write!(f, "The report stream is empty"),
            EstimationError::InvalidReport { index } => {
                write!(f, "Report {} contains a non-finite value", index)
            }
            EstimationError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
            EstimationError::EmptyTrajectory => write!(f, "The trajectory has no samples"),
            EstimationError::MismatchedTrajectory { x, y, t } => write!(
                f,
                "Trajectory sequences differ in length: {} x, {} y and {} t values",
                x, y, t
            ),
        }
    }
}

impl std::error::Error for EstimationError {}

/// # Explanation
/// An estimator consumes a whole report stream and returns the densely sampled trajectory.
/// Every call starts from a fresh state, so one estimator can be run on many streams.
pub trait Estimator {
    fn name(&self) -> String;

    fn estimate(&self, reports: &ReportStream) -> Result<Trajectory, EstimationError>;
}

/// # Explanation
/// Propagates a gaussian state by dt seconds.
///
/// # Type parameters
/// SD is the dimension of the state.
pub trait Predictor<const SD: usize> {
    fn predict(
        &self,
        prior: &GaussianState<SD>,
        dt: f64,
    ) -> Result<GaussianState<SD>, EstimationError>;
}

/// # Explanation
/// Corrects a predicted gaussian state with a measurement.
///
/// # Type parameters
/// MD is the dimension of the measurement, SD the dimension of the state.
pub trait Filter<const MD: usize, const SD: usize> {
    fn filter(
        &self,
        prediction: &GaussianState<SD>,
        measurement: &SVector<f64, MD>,
    ) -> Result<GaussianState<SD>, EstimationError>;
}
