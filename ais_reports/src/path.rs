use vessel_estimation::angle::course_of;

use crate::ReportError;

/// # Explanation
/// A densely sampled vessel path in the local plane. The cumulative distance along the path is
/// precomputed so reports can be taken at any travelled distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
    cumulative: Vec<f64>,
}

impl Polyline {
    /// # Errors
    /// InvalidPath if there are fewer than two vertices or a vertex is not finite.
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, ReportError> {
        if points.len() < 2 {
            return Err(ReportError::InvalidPath {
                reason: format!("{} vertices, at least 2 are needed", points.len()),
            });
        }
        if let Some(index) = points
            .iter()
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(ReportError::InvalidPath {
                reason: format!("vertex {} is not finite", index),
            });
        }

        let mut cumulative = Vec::with_capacity(points.len());
        cumulative.push(0.0);
        for pair in points.windows(2) {
            let step = (pair[1].0 - pair[0].0).hypot(pair[1].1 - pair[0].1);
            let travelled = cumulative.last().copied().unwrap_or(0.0) + step;
            cumulative.push(travelled);
        }

        Ok(Self { points, cumulative })
    }

    /// Samples `f` at `count` evenly spaced parameters in `[start, end]`.
    pub fn from_fn<F>(start: f64, end: f64, count: usize, f: F) -> Result<Self, ReportError>
    where
        F: Fn(f64) -> (f64, f64),
    {
        let points = linspace(start, end, count).map(f).collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Distance travelled along the path up to each vertex.
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// # Explanation
    /// Returns the first vertex whose travelled distance reaches `distance`, together with the
    /// course in degrees of the segment leaving it. Past the end of the path the last vertex is
    /// returned with the course of the final segment.
    pub fn sample_at_distance(&self, distance: f64) -> (f64, f64, f64) {
        let segments = self.points.len() - 1;
        let index = self.cumulative[..segments].partition_point(|travelled| *travelled < distance);

        let (segment, vertex) = if index < segments {
            (index, index)
        } else {
            (segments - 1, segments)
        };
        let (x1, y1) = self.points[segment];
        let (x2, y2) = self.points[segment + 1];
        let (x, y) = self.points[vertex];
        (x, y, course_of(x2 - x1, y2 - y1).to_degrees().rem_euclid(360.0))
    }
}

/// Evenly spaced values over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| start + step * i as f64)
}
