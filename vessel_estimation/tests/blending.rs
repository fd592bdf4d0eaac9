use vessel_estimation::blending::{blend, blend_weight, BlendingController, BlendingState};
use vessel_estimation::estimator::Estimator;
use vessel_estimation::evaluation::{teleportation, GroundTruth};
use vessel_estimation::kinematic::PredictorKind;
use vessel_estimation::state::{ReportStream, VesselState};

mod utils;

#[test]
fn test_blend_endpoints() {
    let old = VesselState::new(1.0, 2.0, 3.0, 0.5);
    let new = VesselState::new(-4.0, 8.0, 5.0, -2.5);
    assert_close(&blend(&old, &new, 0.0), &old);
    assert_close(&blend(&old, &new, 1.0), &new);
}

fn assert_close(a: &VesselState, b: &VesselState) {
    assert!((a.pos_x - b.pos_x).abs() < 1e-12);
    assert!((a.pos_y - b.pos_y).abs() < 1e-12);
    assert!((a.speed - b.speed).abs() < 1e-12);
    assert!((a.course - b.course).abs() < 1e-12);
}

#[test]
fn test_blend_course_through_north() {
    let old = VesselState::new(0.0, 0.0, 1.0, 350f64.to_radians());
    let new = VesselState::new(0.0, 0.0, 1.0, 10f64.to_radians());
    assert!(blend(&old, &new, 0.5).course.abs() < 1e-12);
}

#[test]
fn test_blend_weight_is_monotone() {
    let weights: Vec<f64> = utils::FloatRange::new(0.0, 10.0, 0.25)
        .map(|since| blend_weight(since, 6.0, 0.5))
        .collect();
    assert!(weights.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(weights.iter().all(|w| (0.0..=1.0).contains(w)));
    assert_eq!(weights[0], 0.0);
    assert_eq!(*weights.last().unwrap(), 1.0);
}

#[test]
fn test_controller_keeps_two_predictors() {
    let controller = BlendingController::new(PredictorKind::Quadratic, 0.5, 60.0).unwrap();
    let reports = utils::straight_reports(3.0, 45.0, 2.0, 10.0);
    let mut state = BlendingState::new();

    for (count, report) in reports.iter().enumerate() {
        controller.incorporate(&mut state, report).unwrap();
        assert_eq!(state.window().len(), (count + 1).min(3));
        assert_eq!(state.predictors().len(), (count + 1).min(2));
        for _ in 0..120 {
            assert!(controller.step(&mut state).unwrap().is_finite());
        }
    }
    assert!((state.interval() - 2.0).abs() < 1e-9);
    assert_eq!(state.fallbacks(), 0);
}

#[test]
fn test_step_before_first_report() {
    let controller = BlendingController::dead_reckoning(60.0).unwrap();
    let mut state = BlendingState::new();
    assert!(controller.step(&mut state).is_none());
}

#[test]
fn test_blending_follows_straight_track() {
    let reports = ReportStream::new(utils::straight_reports(5.0, 120.0, 3.0, 60.0)).unwrap();
    let truth = GroundTruth::from_reports(&reports);

    for kind in [
        PredictorKind::DeadReckoning,
        PredictorKind::HermiteCubic,
        PredictorKind::ChordQuadratic,
        PredictorKind::Cubic,
    ] {
        let controller = BlendingController::new(kind, 0.5, 60.0).unwrap();
        let evaluation = utils::test_estimator(&controller, &reports, &truth).unwrap();
        // every sample is one step ahead of its grid time
        assert!(evaluation.mae < 5.0 / 60.0 + 1e-6, "{}: {:?}", kind, evaluation);
    }
}

#[test]
fn test_runs_are_independent() {
    let reports = ReportStream::new(utils::circle_reports(80.0, 4.0, 3.0, 45.0)).unwrap();
    let controller = BlendingController::new(PredictorKind::Cubic, 0.5, 60.0).unwrap();
    let first = controller.estimate(&reports).unwrap();
    let second = controller.estimate(&reports).unwrap();
    assert_eq!(first, second);
    // reports up to 42 s at 60 Hz
    assert!((first.len() as i64 - 42 * 60).abs() <= 1);
}

#[test]
fn test_blending_reduces_teleportation_on_circle() {
    let reports = ReportStream::new(utils::circle_reports(60.0, 6.0, 3.33, 60.0)).unwrap();
    let dead_reckoning = BlendingController::dead_reckoning(60.0)
        .unwrap()
        .estimate(&reports)
        .unwrap();
    let rate_of_turn = BlendingController::rate_of_turn(60.0)
        .unwrap()
        .estimate(&reports)
        .unwrap();
    assert!(teleportation(&rate_of_turn) < teleportation(&dead_reckoning));
}
