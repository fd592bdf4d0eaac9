#![allow(dead_code)]

use std::error::Error;

use rand::Rng;

use vessel_estimation::estimator::Estimator;
use vessel_estimation::evaluation::{evaluate, Evaluation, GroundTruth};
use vessel_estimation::state::{Report, ReportStream};

/// Runs the estimator and scores it against the ground truth.
pub fn test_estimator<E>(
    estimator: &E,
    reports: &ReportStream,
    ground_truth: &GroundTruth,
) -> Result<Evaluation, Box<dyn Error>>
where
    E: Estimator + ?Sized,
{
    let trajectory = estimator.estimate(reports)?;
    assert!(trajectory.x().iter().chain(trajectory.y()).all(|v| v.is_finite()));
    Ok(evaluate(&trajectory, ground_truth)?)
}

pub struct FloatRange {
    current: f64,
    end: f64,
    step: f64,
}

impl FloatRange {
    /// Half-open range [start, end).
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self {
            current: start,
            end,
            step,
        }
    }
}

impl Iterator for FloatRange {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.end {
            None
        } else {
            let value = Some(self.current);
            self.current += self.step;
            value
        }
    }
}

/// Vessel on a circle around the origin, starting north of it and turning clockwise.
pub fn circle_position(radius: f64, speed: f64, time: f64) -> (f64, f64) {
    let angle = speed / radius * time;
    (radius * angle.sin(), radius * angle.cos())
}

pub fn circle_reports(radius: f64, speed: f64, interval: f64, duration: f64) -> Vec<Report> {
    FloatRange::new(0.0, duration, interval)
        .map(|time| {
            let (x, y) = circle_position(radius, speed, time);
            let course = (speed / radius * time).to_degrees() + 90.0;
            Report::new(time, x, y, speed, course.rem_euclid(360.0))
        })
        .collect()
}

pub fn circle_truth(radius: f64, speed: f64, duration: f64) -> GroundTruth {
    let times: Vec<f64> = FloatRange::new(0.0, duration, 0.1).collect();
    let points: Vec<(f64, f64)> = times
        .iter()
        .map(|time| circle_position(radius, speed, *time))
        .collect();
    GroundTruth::new(
        points.iter().map(|p| p.0).collect(),
        points.iter().map(|p| p.1).collect(),
        times,
    )
    .unwrap()
}

pub fn straight_reports(speed: f64, course: f64, interval: f64, duration: f64) -> Vec<Report> {
    let (sin, cos) = course.to_radians().sin_cos();
    FloatRange::new(0.0, duration, interval)
        .map(|time| Report::new(time, speed * sin * time, speed * cos * time, speed, course))
        .collect()
}

/// Adds uniform noise to the reported positions.
pub fn add_noise(reports: Vec<Report>, amplitude: f64) -> Vec<Report> {
    reports
        .into_iter()
        .map(|report| Report {
            pos_x: report.pos_x + rand::thread_rng().gen_range(-amplitude..=amplitude),
            pos_y: report.pos_y + rand::thread_rng().gen_range(-amplitude..=amplitude),
            ..report
        })
        .collect()
}
