use crate::state::{Report, VesselState};

/// # Explanation
/// The densely sampled output of one estimator run. The sequences x, y and t are parallel, one
/// entry per sub-step. `errors` holds the absolute position error per axis between the estimate
/// emitted just before a report was incorporated and that report. Samples are only added
/// through `push`, so the sequences always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    x: Vec<f64>,
    y: Vec<f64>,
    t: Vec<f64>,
    errors: Vec<(f64, f64)>,
}

impl Trajectory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            t: Vec::with_capacity(capacity),
            errors: Vec::new(),
        }
    }

    pub fn push(&mut self, time: f64, pos_x: f64, pos_y: f64) {
        self.x.push(pos_x);
        self.y.push(pos_y);
        self.t.push(time);
    }

    pub fn push_state(&mut self, time: f64, state: &VesselState) {
        self.push(time, state.pos_x, state.pos_y);
    }

    /// Records the jump between the last emitted position and an incoming report.
    /// Nothing is recorded before the first sample was emitted.
    pub fn record_error(&mut self, report: &Report) {
        if let Some((pos_x, pos_y)) = self.last_position() {
            self.errors
                .push(((pos_x - report.pos_x).abs(), (pos_y - report.pos_y).abs()));
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

    pub fn errors(&self) -> &[(f64, f64)] {
        &self.errors
    }

    pub fn last_position(&self) -> Option<(f64, f64)> {
        Some((*self.x.last()?, *self.y.last()?))
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// # Explanation
/// The fixed simulation clock: times `i * step` for every i with `i * step < duration`. A stream
/// with a single report still yields the sample at zero.
#[derive(Debug, Clone)]
pub struct SampleGrid {
    step: f64,
    index: usize,
    count: usize,
}

impl SampleGrid {
    pub fn new(duration: f64, step: f64) -> Self {
        let mut count = (duration / step).ceil() as usize;
        while count > 1 && (count - 1) as f64 * step >= duration {
            count -= 1;
        }
        let count = count.max(1);
        Self {
            step,
            index: 0,
            count,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

impl Iterator for SampleGrid {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let time = self.index as f64 * self.step;
        self.index += 1;
        Some(time)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SampleGrid {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_excludes_duration() {
        let grid: Vec<f64> = SampleGrid::new(1.0, 0.25).collect();
        assert_eq!(grid, vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(SampleGrid::new(0.0, 0.1).len(), 1);
    }

    #[test]
    fn test_grid_length_survives_iteration() {
        let mut grid = SampleGrid::new(1.0, 0.1);
        assert_eq!(grid.len(), 10);
        grid.next();
        assert_eq!(grid.len(), 9);
        assert_eq!(grid.count(), 9);
    }

    #[test]
    fn test_record_error_needs_a_sample() {
        let mut trajectory = Trajectory::default();
        let report = Report::new(0.0, 1.0, 2.0, 0.0, 0.0);
        trajectory.record_error(&report);
        assert!(trajectory.errors.is_empty());

        trajectory.push(0.0, 2.0, 0.0);
        trajectory.record_error(&report);
        assert_eq!(trajectory.errors, vec![(1.0, 2.0)]);
    }
}
