use vessel_estimation::config::{EstimatorConfig, ExogenousConfig, ExtendedConfig, UnscentedConfig};
use vessel_estimation::estimator::Estimator;
use vessel_estimation::kalman::CourseSource;
use vessel_estimation::state::ReportStream;

mod utils;

/// 1000 samples at 60 Hz with a report every 20 samples.
fn frequent_reports() -> ReportStream {
    let reports = utils::circle_reports(50.0, 3.0, 1.0 / 3.0, 16.7);
    ReportStream::new(reports).unwrap()
}

#[test]
fn test_extended_covariance_stays_symmetric() {
    let reports = frequent_reports();
    let estimator = ExtendedConfig::default().build(60.0).unwrap();
    let mut steps = 0;
    let trajectory = estimator
        .run_inspected(&reports, |state| {
            steps += 1;
            assert!(state.asymmetry() < 1e-9, "asymmetry {}", state.asymmetry());
            assert!(state.error.diagonal().iter().all(|v| *v > 0.0));
        })
        .unwrap();
    assert!(steps >= 999);
    assert_eq!(trajectory.len(), steps);
}

#[test]
fn test_unscented_covariance_stays_symmetric() {
    let reports = frequent_reports();
    let estimator = UnscentedConfig::default().build(60.0).unwrap();
    let mut steps = 0;
    estimator
        .run_inspected(&reports, |state| {
            steps += 1;
            assert!(state.asymmetry() < 1e-9, "asymmetry {}", state.asymmetry());
            assert!(state.estimate[3].abs() <= std::f64::consts::PI);
        })
        .unwrap();
    assert!(steps >= 999);
}

#[test]
fn test_filters_track_noisy_circle() {
    let reports = ReportStream::new(utils::add_noise(
        utils::circle_reports(100.0, 5.0, 3.0, 90.0),
        0.5,
    ))
    .unwrap();
    let truth = utils::circle_truth(100.0, 5.0, reports.duration());

    let configs = [
        EstimatorConfig::Extended(ExtendedConfig::default()),
        EstimatorConfig::Extended(ExtendedConfig {
            course_source: CourseSource::FromTrack,
            ..ExtendedConfig::default()
        }),
        EstimatorConfig::Unscented(UnscentedConfig::default()),
        EstimatorConfig::Exogenous(ExogenousConfig::default()),
    ];
    for config in configs {
        let estimator = config.build(60.0).unwrap();
        let evaluation = utils::test_estimator(&*estimator, &reports, &truth).unwrap();
        assert!(
            evaluation.rmse < 10.0,
            "{}: {:?}",
            estimator.name(),
            evaluation
        );
        assert!(evaluation.teleportation.is_finite());
    }
}

#[test]
fn test_exogenous_follows_straight_track() {
    let reports = ReportStream::new(utils::straight_reports(4.0, 200.0, 2.0, 40.0)).unwrap();
    let estimator = ExogenousConfig::default().build(60.0).unwrap();
    let trajectory = estimator.estimate(&reports).unwrap();

    let last = reports.reports()[reports.len() - 1];
    let (x, y) = trajectory.last_position().unwrap();
    assert!((x - last.pos_x).hypot(y - last.pos_y) < 1.0);
}
