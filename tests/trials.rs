#[cfg(test)]
mod tests {
    use ais_reports::path::{linspace, Polyline};
    use ais_reports::trial::{circle_trial, manoeuvring_trial, zig_zag_trial, PATH_VERTICES};
    use vessel_estimation::blending::BlendingController;
    use vessel_estimation::estimator::{EstimationError, Estimator};
    use vessel_estimation::evaluation::evaluate;
    use vessel_estimation::kinematic::{FittedPredictor, PredictorKind};
    use vessel_estimation::track::Trajectory;

    const ZIG_ZAG_AMPLITUDE: f64 = 60.0;
    const ZIG_ZAG_SCALE: f64 = 45.0;

    fn assert_finite(trajectory: &Trajectory) {
        assert!(!trajectory.is_empty());
        assert!(trajectory.x().iter().chain(trajectory.y()).all(|v| v.is_finite()));
    }

    #[test]
    fn test_dead_reckoning_stays_near_circle() {
        let radius = 60.0;
        let trial = circle_trial(radius, 60.0).unwrap();
        let first = *trial.reports.first();
        let interval = trial.reports.reports()[1].time - first.time;
        let angular_rate = first.speed / radius;

        let step = 1.0 / 60.0;
        let controller = BlendingController::dead_reckoning(60.0).unwrap();
        let trajectory = controller.estimate(&trial.reports).unwrap();

        // every sample lies at most one report interval and one step past its report
        let bound = radius * (1.0 - (angular_rate * (interval + step)).cos());
        for (x, y) in trajectory.x().iter().zip(trajectory.y()) {
            let deviation = (x.hypot(*y) - radius).abs();
            assert!(deviation <= bound, "deviation {} above {}", deviation, bound);
        }
    }

    #[test]
    fn test_chord_quadratic_on_zig_zag() {
        let trial = zig_zag_trial(
            ZIG_ZAG_AMPLITUDE,
            ZIG_ZAG_SCALE,
            std::f64::consts::TAU * ZIG_ZAG_SCALE,
            60.0,
        )
        .unwrap();
        let controller = BlendingController::new(PredictorKind::ChordQuadratic, 0.5, 60.0).unwrap();
        let trajectory = controller.estimate(&trial.reports).unwrap();
        assert_finite(&trajectory);

        let evaluation = evaluate(&trajectory, &trial.ground_truth).unwrap();
        assert!(evaluation.rmse < 10.0, "{:?}", evaluation);
    }

    #[test]
    fn test_chord_quadratic_falls_back_when_vessel_turns_back() {
        let distance = std::f64::consts::TAU * ZIG_ZAG_SCALE;
        let outbound: Vec<(f64, f64)> = linspace(0.0, distance, PATH_VERTICES)
            .map(|x| (x, ZIG_ZAG_AMPLITUDE * (x / ZIG_ZAG_SCALE).sin()))
            .collect();
        let mut points = outbound.clone();
        points.extend(outbound.iter().rev().skip(1));
        let path = Polyline::new(points).unwrap();
        let trial = manoeuvring_trial("out_and_back", &path, 120.0).unwrap();

        // some window straddles the turning point
        let degenerate = trial.reports.reports().windows(3).any(|window| {
            matches!(
                FittedPredictor::fit(PredictorKind::ChordQuadratic, window),
                Err(EstimationError::DegenerateGeometry { .. })
            )
        });
        assert!(degenerate);

        let controller = BlendingController::new(PredictorKind::ChordQuadratic, 0.5, 60.0).unwrap();
        let trajectory = controller.estimate(&trial.reports).unwrap();
        assert_finite(&trajectory);
    }

    #[test]
    fn test_all_kinds_follow_default_trials() {
        let trials = [
            circle_trial(100.0, 60.0).unwrap(),
            zig_zag_trial(20.0, 15.0, 100.0, 60.0).unwrap(),
        ];
        for trial in &trials {
            for kind in [
                PredictorKind::DeadReckoning,
                PredictorKind::RateOfTurn,
                PredictorKind::HermiteQuadratic,
                PredictorKind::HermiteCubic,
                PredictorKind::Quadratic,
                PredictorKind::ChordQuadratic,
                PredictorKind::Cubic,
            ] {
                let controller = BlendingController::new(kind, 0.5, 60.0).unwrap();
                let trajectory = controller.estimate(&trial.reports).unwrap();
                assert_finite(&trajectory);
                let evaluation = evaluate(&trajectory, &trial.ground_truth).unwrap();
                assert!(evaluation.smoothness > 0.0, "{} on {}", kind, trial.name);
            }
        }
    }
}
