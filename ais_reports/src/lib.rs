use std::fmt;

use chrono::{DateTime, Utc};

use vessel_estimation::estimator::EstimationError;
use vessel_estimation::evaluation::GroundTruth;
use vessel_estimation::state::ReportStream;

pub mod path;
pub mod real;
pub mod trial;

/// Knots per metre per second.
pub const KNOTS_PER_MPS: f64 = 1.94384;

/// # Explanation
/// Errors raised while generating or loading report streams.
#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
    Csv(csv::Error),
    /// The reports were read but do not form a valid stream.
    Estimation(EstimationError),
    /// The trial path cannot produce reports.
    InvalidPath { reason: String },
    /// No row of the file belongs to the requested vessel.
    NoReports { mmsi: Option<u64> },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "I/O error: {}", e),
            ReportError::Csv(e) => write!(f, "CSV error: {}", e),
            ReportError::Estimation(e) => write!(f, "Invalid report stream: {}", e),
            ReportError::InvalidPath { reason } => write!(f, "Invalid trial path: {}", reason),
            ReportError::NoReports { mmsi: Some(mmsi) } => {
                write!(f, "No reports found for MMSI {}", mmsi)
            }
            ReportError::NoReports { mmsi: None } => write!(f, "No reports found"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io(e) => Some(e),
            ReportError::Csv(e) => Some(e),
            ReportError::Estimation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        ReportError::Io(e)
    }
}

impl From<csv::Error> for ReportError {
    fn from(e: csv::Error) -> Self {
        ReportError::Csv(e)
    }
}

impl From<EstimationError> for ReportError {
    fn from(e: EstimationError) -> Self {
        ReportError::Estimation(e)
    }
}

/// # Explanation
/// A named report stream together with the reference track it is scored against.
/// Recorded trials keep the wall-clock time of their first report.
#[derive(Debug, Clone)]
pub struct Trial {
    pub name: String,
    pub reports: ReportStream,
    pub ground_truth: GroundTruth,
    pub origin: Option<DateTime<Utc>>,
}
