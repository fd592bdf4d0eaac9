use crate::angle::wrap_to_pi;
use crate::kinematic::KinematicPredictor;
use crate::state::{Report, VesselState};

/// # Explanation
/// Dead reckoning from a single report: speed and course are held and the position moves along
/// the course.
#[derive(Debug, Clone)]
pub struct DeadReckoning {
    state: VesselState,
}

impl DeadReckoning {
    pub fn new(report: &Report) -> Self {
        Self {
            state: VesselState::from(report),
        }
    }
}

impl KinematicPredictor for DeadReckoning {
    fn predict(&mut self, dt: f64) -> VesselState {
        let (sin, cos) = self.state.course.sin_cos();
        self.state.pos_x += self.state.speed * sin * dt;
        self.state.pos_y += self.state.speed * cos * dt;
        self.state
    }
}

/// # Explanation
/// Extrapolates with the rate of turn between two reports. The course difference is taken along
/// the shorter direction, so a turn through north does not spin the wrong way round.
/// The position is integrated with the already advanced course.
#[derive(Debug, Clone)]
pub struct RateOfTurn {
    state: VesselState,
    rate_of_turn: f64,
}

impl RateOfTurn {
    pub fn new(previous: &Report, newest: &Report) -> Self {
        let turn = wrap_to_pi(newest.course_rad() - previous.course_rad());
        Self {
            state: VesselState::from(newest),
            rate_of_turn: turn / (newest.time - previous.time),
        }
    }

    /// Rate of turn in rad/s.
    pub fn rate_of_turn(&self) -> f64 {
        self.rate_of_turn
    }
}

impl KinematicPredictor for RateOfTurn {
    fn predict(&mut self, dt: f64) -> VesselState {
        let course = self.state.course + self.rate_of_turn * dt;
        let (sin, cos) = course.sin_cos();
        self.state = VesselState::new(
            self.state.pos_x + self.state.speed * sin * dt,
            self.state.pos_y + self.state.speed * cos * dt,
            self.state.speed,
            course,
        );
        VesselState {
            course: wrap_to_pi(course),
            ..self.state
        }
    }
}
