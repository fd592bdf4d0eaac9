use crate::angle::interpolate_course;
use crate::estimator::{EstimationError, Estimator};
use crate::kinematic::{FittedPredictor, KinematicPredictor, PredictorKind};
use crate::state::{Report, ReportStream, VesselState};
use crate::track::{SampleGrid, Trajectory};

/// # Explanation
/// Blends two predicted states. Position and speed are interpolated linearly, the course along
/// the shorter arc. A weight of zero returns `old`, a weight of one returns `new`.
pub fn blend(old: &VesselState, new: &VesselState, weight: f64) -> VesselState {
    VesselState::new(
        old.pos_x + (new.pos_x - old.pos_x) * weight,
        old.pos_y + (new.pos_y - old.pos_y) * weight,
        old.speed + (new.speed - old.speed) * weight,
        interpolate_course(old.course, new.course, weight),
    )
}

/// # Explanation
/// Weight of the newer predictor: rises linearly from zero at the report to one after
/// `blend_fraction` of the previous reporting interval. An interval or fraction of zero means
/// the newer predictor takes over immediately.
pub fn blend_weight(since_report: f64, interval: f64, blend_fraction: f64) -> f64 {
    if interval <= 0.0 || blend_fraction <= 0.0 {
        return 1.0;
    }
    (since_report / (interval * blend_fraction)).clamp(0.0, 1.0)
}

/// # Explanation
/// Everything a blending run mutates: the report window, at most two live predictors (older
/// first), the interval between the last two reports and the time since the last one.
#[derive(Debug, Clone, Default)]
pub struct BlendingState {
    window: Vec<Report>,
    predictors: Vec<FittedPredictor>,
    interval: f64,
    since_report: f64,
    fallbacks: usize,
}

impl BlendingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(&self) -> &[Report] {
        &self.window
    }

    pub fn predictors(&self) -> &[FittedPredictor] {
        &self.predictors
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Number of predictor fits that had to fall back to a simpler variant.
    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }
}

/// # Explanation
/// The blending controller keeps the predictor of the previous report window alive after a new
/// report arrives and fades over to the predictor of the new window, so that the output does not
/// jump at report instants.
///
/// The controller itself is immutable configuration; all run state lives in a BlendingState.
#[derive(Debug, Clone)]
pub struct BlendingController {
    kind: PredictorKind,
    blend_fraction: f64,
    step: f64,
}

impl BlendingController {
    /// # Errors
    /// Configuration if the blend fraction is outside [0, 1] or the sample rate is not positive.
    pub fn new(
        kind: PredictorKind,
        blend_fraction: f64,
        est_freq: f64,
    ) -> Result<Self, EstimationError> {
        if !(0.0..=1.0).contains(&blend_fraction) {
            return Err(EstimationError::Configuration {
                description: format!("blend fraction {} is not within [0, 1]", blend_fraction),
            });
        }
        if !est_freq.is_finite() || est_freq <= 0.0 {
            return Err(EstimationError::Configuration {
                description: format!("sample rate {} Hz is not positive", est_freq),
            });
        }
        Ok(Self {
            kind,
            blend_fraction,
            step: 1.0 / est_freq,
        })
    }

    /// Plain dead reckoning from the latest report.
    pub fn dead_reckoning(est_freq: f64) -> Result<Self, EstimationError> {
        Self::new(PredictorKind::DeadReckoning, 0.0, est_freq)
    }

    /// Rate-of-turn extrapolation from the latest two reports.
    pub fn rate_of_turn(est_freq: f64) -> Result<Self, EstimationError> {
        Self::new(PredictorKind::RateOfTurn, 0.0, est_freq)
    }

    pub fn kind(&self) -> PredictorKind {
        self.kind
    }

    /// # Explanation
    /// Adds a report to the window, replaces the older predictor by one fitted to the new window
    /// and restarts the blend.
    pub fn incorporate(
        &self,
        state: &mut BlendingState,
        report: &Report,
    ) -> Result<(), EstimationError> {
        if state.window.len() == self.kind.order() {
            state.window.remove(0);
        }
        state.window.push(*report);

        let kind = self.kind.for_window(state.window.len());
        let (predictor, _, fallbacks) = FittedPredictor::fit_with_fallback(kind, &state.window)?;
        state.fallbacks += fallbacks;

        if state.predictors.len() == 2 {
            state.predictors.remove(0);
        }
        state.predictors.push(predictor);

        state.interval = state.since_report;
        state.since_report = 0.0;
        Ok(())
    }

    /// # Explanation
    /// Advances the live predictors by one sample step and blends them.
    ///
    /// # Returns
    /// The blended estimate, or None before the first report.
    pub fn step(&self, state: &mut BlendingState) -> Option<VesselState> {
        let weight = blend_weight(state.since_report, state.interval, self.blend_fraction);
        let estimate = match state.predictors.as_mut_slice() {
            [] => None,
            [only] => Some(only.predict(self.step)),
            [.., old, new] => {
                let old = old.predict(self.step);
                let new = new.predict(self.step);
                Some(blend(&old, &new, weight))
            }
        };
        state.since_report += self.step;
        estimate
    }
}

impl Estimator for BlendingController {
    fn name(&self) -> String {
        match self.kind {
            PredictorKind::DeadReckoning if self.blend_fraction == 0.0 => "DR".to_string(),
            PredictorKind::RateOfTurn if self.blend_fraction == 0.0 => "ROT".to_string(),
            kind => format!("{}-{}", kind, self.blend_fraction),
        }
    }

    fn estimate(&self, reports: &ReportStream) -> Result<Trajectory, EstimationError> {
        let grid = SampleGrid::new(reports.duration(), self.step);
        let mut trajectory = Trajectory::with_capacity(grid.len());
        let mut state = BlendingState::new();
        let mut cursor = reports.cursor();

        for time in grid {
            while let Some((_, report)) = cursor.next_due(time) {
                trajectory.record_error(report);
                self.incorporate(&mut state, report)?;
            }
            if let Some(estimate) = self.step(&mut state) {
                trajectory.push_state(time, &estimate);
            }
        }

        if state.fallbacks > 0 {
            log::info!(
                "{}: {} predictor fits fell back to a simpler variant",
                self.name(),
                state.fallbacks
            );
        }
        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_weight_is_clamped() {
        assert_eq!(blend_weight(0.0, 10.0, 0.5), 0.0);
        assert_eq!(blend_weight(2.5, 10.0, 0.5), 0.5);
        assert_eq!(blend_weight(7.0, 10.0, 0.5), 1.0);
        assert_eq!(blend_weight(1.0, 0.0, 0.5), 1.0);
        assert_eq!(blend_weight(0.0, 10.0, 0.0), 1.0);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(BlendingController::new(PredictorKind::Cubic, 1.5, 60.0).is_err());
        assert!(BlendingController::new(PredictorKind::Cubic, f64::NAN, 60.0).is_err());
        assert!(BlendingController::new(PredictorKind::Cubic, 0.5, 0.0).is_err());
    }
}
