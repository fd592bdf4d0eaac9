use nalgebra::Vector2;

use crate::estimator::{EstimationError, Estimator};
use crate::state::{Report, ReportStream};
use crate::track::{SampleGrid, Trajectory};

/// # Explanation
/// Projective velocity blending. After each report two paths are projected: one from the last
/// emitted position with a velocity that blends from the previous to the new report velocity, and
/// one straight from the new report. The output moves from the first to the second path over one
/// reporting interval:<br>
/// v_b = v_old + (v_new - v_old) t^<br>
/// p = p_proj + (p_last - p_proj) t^ with t^ = min(1, t_since / interval)
///
/// Until a second report has arrived the output is dead reckoning from the first.
#[derive(Debug, Clone)]
pub struct VelocityBlending {
    step: f64,
}

impl VelocityBlending {
    pub fn new(est_freq: f64) -> Result<Self, EstimationError> {
        if !est_freq.is_finite() || est_freq <= 0.0 {
            return Err(EstimationError::Configuration {
                description: format!("sample rate {} Hz is not positive", est_freq),
            });
        }
        Ok(Self {
            step: 1.0 / est_freq,
        })
    }
}

#[derive(Debug, Default)]
struct Projection {
    old_position: Vector2<f64>,
    old_velocity: Vector2<f64>,
    last_position: Vector2<f64>,
    last_velocity: Vector2<f64>,
    interval: f64,
    since_report: f64,
    reports: usize,
}

impl Projection {
    fn incorporate(&mut self, report: &Report, emitted: Option<(f64, f64)>) {
        let position = Vector2::new(report.pos_x, report.pos_y);
        let (vx, vy) = report.velocity();

        self.old_position = emitted
            .map(|(x, y)| Vector2::new(x, y))
            .unwrap_or(position);
        self.old_velocity = self.last_velocity;
        self.last_position = position;
        self.last_velocity = Vector2::new(vx, vy);
        self.interval = self.since_report;
        self.since_report = 0.0;
        self.reports += 1;
    }

    fn position(&self) -> Vector2<f64> {
        let t = self.since_report;
        let last = self.last_position + self.last_velocity * t;
        if self.reports < 2 || self.interval <= 0.0 {
            return last;
        }
        let t_hat = (t / self.interval).min(1.0);
        let blended_velocity = self.old_velocity + (self.last_velocity - self.old_velocity) * t_hat;
        let projected = self.old_position + blended_velocity * t;
        projected + (last - projected) * t_hat
    }
}

impl Estimator for VelocityBlending {
    fn name(&self) -> String {
        "PVB".to_string()
    }

    fn estimate(&self, reports: &ReportStream) -> Result<Trajectory, EstimationError> {
        let grid = SampleGrid::new(reports.duration(), self.step);
        let mut trajectory = Trajectory::with_capacity(grid.len());
        let mut projection = Projection::default();
        let mut cursor = reports.cursor();

        for time in grid {
            while let Some((_, report)) = cursor.next_due(time) {
                trajectory.record_error(report);
                projection.incorporate(report, trajectory.last_position());
            }
            if projection.reports == 0 {
                continue;
            }
            projection.since_report += self.step;
            let position = projection.position();
            trajectory.push(time, position.x, position.y);
        }
        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_reaches_new_path() {
        let mut projection = Projection::default();
        projection.incorporate(&Report::new(0.0, 0.0, 0.0, 1.0, 90.0), None);
        projection.since_report = 2.0;
        projection.incorporate(&Report::new(2.0, 2.0, 1.0, 1.0, 0.0), Some((2.0, 0.0)));

        // after a full interval the output sits on the path of the new report
        projection.since_report = 2.0;
        let position = projection.position();
        assert!((position.x - 2.0).abs() < 1e-12);
        assert!((position.y - 3.0).abs() < 1e-12);

        projection.since_report = 0.0;
        let position = projection.position();
        assert!((position.x - 2.0).abs() < 1e-12);
        assert!(position.y.abs() < 1e-12);
    }
}
