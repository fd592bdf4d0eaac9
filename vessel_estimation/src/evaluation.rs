#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::estimator::EstimationError;
use crate::state::ReportStream;
use crate::track::Trajectory;

/// # Explanation
/// The reference path a trajectory is scored against: the dense true path of a synthetic trial or
/// the report positions of a real one. Times are increasing and x, y and t have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTruth {
    x: Vec<f64>,
    y: Vec<f64>,
    t: Vec<f64>,
}

impl GroundTruth {
    /// # Errors
    /// MismatchedTrajectory if the three sequences differ in length.
    pub fn new(x: Vec<f64>, y: Vec<f64>, t: Vec<f64>) -> Result<Self, EstimationError> {
        if x.len() != t.len() || y.len() != t.len() {
            return Err(EstimationError::MismatchedTrajectory {
                x: x.len(),
                y: y.len(),
                t: t.len(),
            });
        }
        Ok(Self { x, y, t })
    }

    /// Uses the report positions (on the stream's re-based clock) as reference.
    pub fn from_reports(reports: &ReportStream) -> Self {
        let reports = reports.reports();
        Self {
            x: reports.iter().map(|report| report.pos_x).collect(),
            y: reports.iter().map(|report| report.pos_y).collect(),
            t: reports.iter().map(|report| report.time).collect(),
        }
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn t(&self) -> &[f64] {
        &self.t
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// Scores of one trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub rmse: f64,
    pub mae: f64,
    pub teleportation: f64,
    pub smoothness: f64,
}

/// # Explanation
/// Piecewise-linear interpolation of (times, values) at `time`. Outside the sampled range the
/// first or last value is returned.
pub fn interpolate_at(time: f64, times: &[f64], values: &[f64]) -> f64 {
    let upper = times.partition_point(|sample| *sample <= time);
    if upper == 0 {
        return values[0];
    }
    if upper == times.len() {
        return values[times.len() - 1];
    }
    let (t0, t1) = (times[upper - 1], times[upper]);
    let (v0, v1) = (values[upper - 1], values[upper]);
    v0 + (v1 - v0) * (time - t0) / (t1 - t0)
}

/// # Explanation
/// Resamples the candidate at every ground-truth time and averages the per-axis errors.
///
/// # Returns
/// (rmse, mae), where each is the mean of the x-axis and y-axis value.
///
/// # Errors
/// EmptyTrajectory if the candidate or the ground truth has no samples.
pub fn accuracy(candidate: &Trajectory, truth: &GroundTruth) -> Result<(f64, f64), EstimationError> {
    if candidate.is_empty() || truth.is_empty() {
        return Err(EstimationError::EmptyTrajectory);
    }

    let term = |index: usize| {
        let time = truth.t[index];
        let dx = interpolate_at(time, candidate.t(), candidate.x()) - truth.x[index];
        let dy = interpolate_at(time, candidate.t(), candidate.y()) - truth.y[index];
        [dx.abs(), dy.abs(), dx * dx, dy * dy]
    };

    // summed sequentially in sample order in both builds
    #[cfg(feature = "rayon")]
    let terms: Vec<[f64; 4]> = (0..truth.len()).into_par_iter().map(term).collect();
    #[cfg(not(feature = "rayon"))]
    let terms: Vec<[f64; 4]> = (0..truth.len()).map(term).collect();

    let sums = terms.iter().fold([0.0; 4], |mut acc, term| {
        for (sum, value) in acc.iter_mut().zip(term) {
            *sum += value;
        }
        acc
    });

    let count = truth.len() as f64;
    let mae = (sums[0] / count + sums[1] / count) / 2.0;
    let rmse = ((sums[2] / count).sqrt() + (sums[3] / count).sqrt()) / 2.0;
    Ok((rmse, mae))
}

/// Mean per-axis jump at report instants, zero if no report was incorporated after the first
/// sample.
pub fn teleportation(candidate: &Trajectory) -> f64 {
    let errors = candidate.errors();
    if errors.is_empty() {
        return 0.0;
    }
    let (sum_x, sum_y) = errors
        .iter()
        .fold((0.0, 0.0), |(sx, sy), (ex, ey)| (sx + ex, sy + ey));
    let count = errors.len() as f64;
    (sum_x / count + sum_y / count) / 2.0
}

/// # Explanation
/// Number of steps per metre of path: (N - 1) / path length. Positive infinity when the path has
/// no length, which includes trajectories with fewer than two samples.
pub fn smoothness(candidate: &Trajectory) -> f64 {
    let points: Vec<(f64, f64)> = candidate.points().collect();
    let length: f64 = points
        .windows(2)
        .map(|pair| (pair[1].0 - pair[0].0).hypot(pair[1].1 - pair[0].1))
        .sum();
    if length == 0.0 {
        return f64::INFINITY;
    }
    (points.len() - 1) as f64 / length
}

pub fn evaluate(candidate: &Trajectory, truth: &GroundTruth) -> Result<Evaluation, EstimationError> {
    let (rmse, mae) = accuracy(candidate, truth)?;
    Ok(Evaluation {
        rmse,
        mae,
        teleportation: teleportation(candidate),
        smoothness: smoothness(candidate),
    })
}
