use std::f64::consts::TAU;

use vessel_estimation::evaluation::GroundTruth;
use vessel_estimation::state::{Report, ReportStream};

use crate::path::Polyline;
use crate::{ReportError, Trial, KNOTS_PER_MPS};

/// Number of vertices of a synthetic trial path.
pub const PATH_VERTICES: usize = 1000;

/// # Explanation
/// Class A reporting interval in seconds for a vessel under way at the given speed in knots.
/// A vessel that does not move reports every three minutes.
pub fn reporting_interval(speed_knots: f64) -> f64 {
    if speed_knots <= 0.0 {
        180.0
    } else if speed_knots <= 14.0 {
        3.33
    } else {
        2.0
    }
}

/// # Explanation
/// One lap of a circle of `radius` metres around the origin, sailed counter-clockwise from
/// its eastern point in `trial_time` seconds.
pub fn circle_trial(radius: f64, trial_time: f64) -> Result<Trial, ReportError> {
    let path = Polyline::from_fn(0.0, TAU, PATH_VERTICES, |theta| {
        (radius * theta.cos(), radius * theta.sin())
    })?;
    manoeuvring_trial("circle", &path, trial_time)
}

/// # Explanation
/// A sinusoidal track `y = amplitude * sin(x / wavelength_scale)` for `x` from zero to
/// `distance`, sailed in `trial_time` seconds.
pub fn zig_zag_trial(
    amplitude: f64,
    wavelength_scale: f64,
    distance: f64,
    trial_time: f64,
) -> Result<Trial, ReportError> {
    if wavelength_scale == 0.0 {
        return Err(ReportError::InvalidPath {
            reason: "the wavelength scale must not be zero".to_string(),
        });
    }
    let path = Polyline::from_fn(0.0, distance, PATH_VERTICES, |x| {
        (x, amplitude * (x / wavelength_scale).sin())
    })?;
    manoeuvring_trial("zig_zag", &path, trial_time)
}

/// # Explanation
/// Sails the path at constant speed so that it ends after `trial_time` seconds. The vessel
/// reports at the interval its speed calls for and the ground truth holds every vertex of the
/// path.
///
/// # Errors
/// InvalidPath if the trial time is not positive or the path has no length.
pub fn manoeuvring_trial(name: &str, path: &Polyline, trial_time: f64) -> Result<Trial, ReportError> {
    if !(trial_time > 0.0) {
        return Err(ReportError::InvalidPath {
            reason: format!("trial time {} is not positive", trial_time),
        });
    }
    let length = path.length();
    if !(length > 0.0) {
        return Err(ReportError::InvalidPath {
            reason: "the path has no length".to_string(),
        });
    }

    let speed = length / trial_time;
    let interval = reporting_interval(speed * KNOTS_PER_MPS);
    log::info!(
        "Trial {}: {:.1} m at {:.2} m/s, reporting every {} s",
        name,
        length,
        speed,
        interval
    );

    let reports: Vec<Report> = (0..)
        .map(|i| i as f64 * interval)
        .take_while(|time| *time < trial_time)
        .map(|time| {
            let (x, y, course) = path.sample_at_distance(speed * time);
            Report::new(time, x, y, speed, course)
        })
        .collect();

    let (x, y): (Vec<f64>, Vec<f64>) = path.points().iter().copied().unzip();
    let t = path.cumulative().iter().map(|travelled| travelled / speed).collect();

    Ok(Trial {
        name: name.to_string(),
        reports: ReportStream::new(reports)?,
        ground_truth: GroundTruth::new(x, y, t)?,
        origin: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporting_interval_bands() {
        assert_eq!(reporting_interval(0.0), 180.0);
        assert_eq!(reporting_interval(5.0), 3.33);
        assert_eq!(reporting_interval(14.0), 3.33);
        assert_eq!(reporting_interval(14.5), 2.0);
        assert_eq!(reporting_interval(23.0), 2.0);
        assert_eq!(reporting_interval(30.0), 2.0);
    }

    #[test]
    fn test_circle_trial() {
        let trial = circle_trial(100.0, 60.0).unwrap();
        // about 20 knots
        assert_eq!(trial.reports.len(), 30);

        let first = trial.reports.first();
        assert!((first.pos_x - 100.0).abs() < 1e-9);
        assert!(first.pos_y.abs() < 1e-9);
        // heading north, just west of it
        assert!(first.course.min(360.0 - first.course) < 0.5);

        for report in trial.reports.reports() {
            assert!((report.pos_x.hypot(report.pos_y) - 100.0).abs() < 1e-6);
        }
        assert_eq!(trial.ground_truth.len(), PATH_VERTICES);
        let last_time = trial.ground_truth.t()[PATH_VERTICES - 1];
        assert!((last_time - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_zig_zag_trial_is_slow() {
        let trial = zig_zag_trial(20.0, 15.0, 100.0, 60.0).unwrap();
        let speed = trial.reports.first().speed;
        assert!(speed * KNOTS_PER_MPS < 14.0);
        assert_eq!(trial.reports.len(), 19);
        assert!(trial
            .reports
            .reports()
            .windows(2)
            .all(|pair| pair[1].pos_x > pair[0].pos_x));
    }

    #[test]
    fn test_invalid_trials_are_rejected() {
        assert!(circle_trial(0.0, 60.0).is_err());
        assert!(circle_trial(50.0, 0.0).is_err());
        assert!(zig_zag_trial(10.0, 0.0, 100.0, 60.0).is_err());
    }
}
