use nalgebra::{SMatrix, SVector};

use crate::angle::wrap_to_pi;
use crate::estimator::EstimationError;

/// # Explanation
/// A single AIS position report, already projected to a local plane.
/// The course is given in degrees clockwise from north, as transmitted.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Report {
    pub time: f64,
    pub pos_x: f64,
    pub pos_y: f64,
    pub speed: f64,
    pub course: f64,
}

impl Report {
    pub fn new(time: f64, pos_x: f64, pos_y: f64, speed: f64, course: f64) -> Self {
        Self {
            time,
            pos_x,
            pos_y,
            speed,
            course,
        }
    }

    /// Course in radians, wrapped to (-pi, pi].
    pub fn course_rad(&self) -> f64 {
        wrap_to_pi(self.course.to_radians())
    }

    /// Velocity over ground (east, north) in m/s.
    pub fn velocity(&self) -> (f64, f64) {
        let course = self.course.to_radians();
        (self.speed * course.sin(), self.speed * course.cos())
    }

    fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.pos_x.is_finite()
            && self.pos_y.is_finite()
            && self.speed.is_finite()
            && self.course.is_finite()
    }
}

/// # Explanation
/// The belief of an estimator about the vessel at one instant. The course is in radians,
/// clockwise from north.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VesselState {
    pub pos_x: f64,
    pub pos_y: f64,
    pub speed: f64,
    pub course: f64,
}

impl VesselState {
    pub fn new(pos_x: f64, pos_y: f64, speed: f64, course: f64) -> Self {
        Self {
            pos_x,
            pos_y,
            speed,
            course,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pos_x.is_finite()
            && self.pos_y.is_finite()
            && self.speed.is_finite()
            && self.course.is_finite()
    }
}

impl From<&Report> for VesselState {
    fn from(report: &Report) -> Self {
        VesselState::new(report.pos_x, report.pos_y, report.speed, report.course_rad())
    }
}

/// # Explanation
/// The gaussian state consists of the expected state (vector) and the uncertainty (covariance matrix).
///
/// # Type parameters
/// D is the dimension of the state (eg four for the speed/course model).
#[derive(Debug, Clone)]
pub struct GaussianState<const D: usize> {
    pub estimate: SVector<f64, D>,
    pub error: SMatrix<f64, D, D>,
}

impl<const D: usize> GaussianState<D> {
    pub fn new(estimate: SVector<f64, D>, error: SMatrix<f64, D, D>) -> Self {
        Self { estimate, error }
    }

    /// Largest absolute difference between the covariance and its transpose.
    pub fn asymmetry(&self) -> f64 {
        (self.error - self.error.transpose()).amax()
    }
}

/// # Explanation
/// An ordered, validated sequence of reports. The first report defines the time origin, so
/// report times are re-based to start at zero and the simulation grid spans `duration`.
#[derive(Debug, Clone)]
pub struct ReportStream {
    reports: Vec<Report>,
    duration: f64,
}

impl ReportStream {
    /// # Errors
    /// Fails if there are no reports, if any value is not finite or if the timestamps are not
    /// strictly increasing.
    pub fn new(reports: Vec<Report>) -> Result<Self, EstimationError> {
        let first = reports.first().ok_or(EstimationError::EmptyReportStream)?;
        let origin = first.time;

        for (index, report) in reports.iter().enumerate() {
            if !report.is_finite() {
                return Err(EstimationError::InvalidReport { index });
            }
        }
        for (index, pair) in reports.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(EstimationError::NonMonotonicTime {
                    index: index + 1,
                    previous: pair[0].time,
                    current: pair[1].time,
                });
            }
        }

        let reports: Vec<Report> = reports
            .into_iter()
            .map(|report| Report {
                time: report.time - origin,
                ..report
            })
            .collect();
        let duration = reports.last().map(|last| last.time).unwrap_or(0.0);

        Ok(Self { reports, duration })
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn first(&self) -> &Report {
        // a stream cannot be constructed without reports
        &self.reports[0]
    }

    pub fn cursor(&self) -> ReportCursor<'_> {
        ReportCursor {
            reports: &self.reports,
            next: 0,
        }
    }
}

/// # Explanation
/// Walks through a report stream in step with the simulation clock. `next_due` hands out each
/// report once, as soon as the clock has reached its timestamp.
pub struct ReportCursor<'a> {
    reports: &'a [Report],
    next: usize,
}

impl<'a> ReportCursor<'a> {
    pub fn next_due(&mut self, time: f64) -> Option<(usize, &'a Report)> {
        let report = self.reports.get(self.next)?;
        if time >= report.time {
            let index = self.next;
            self.next += 1;
            Some((index, report))
        } else {
            None
        }
    }

    /// Reports handed out so far, oldest first.
    pub fn consumed(&self) -> &'a [Report] {
        &self.reports[..self.next]
    }
}
