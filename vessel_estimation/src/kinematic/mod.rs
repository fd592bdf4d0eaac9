use std::fmt;

use serde::{Deserialize, Serialize};

use crate::estimator::EstimationError;
use crate::state::{Report, VesselState};

pub mod chord;
pub mod dead_reckoning;
pub mod interpolation;

pub use chord::ChordQuadratic;
pub use dead_reckoning::{DeadReckoning, RateOfTurn};
pub use interpolation::PolynomialTrack;

/// # Explanation
/// A predictor extrapolates the vessel state from a fixed window of reports. It is stateful:
/// every call advances the elapsed time since the newest report of the window by dt, so repeated
/// calls walk along the predicted path.
pub trait KinematicPredictor {
    fn predict(&mut self, dt: f64) -> VesselState;
}

/// Predictors that fit a curve through their reports can evaluate that curve at any stream time
/// without changing their state.
pub trait Interpolant {
    fn position_at(&self, time: f64) -> (f64, f64);
}

/// # Explanation
/// The predictor variants. The number in the name is the number of reports the variant is built
/// from.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PredictorKind {
    #[serde(rename = "P1")]
    DeadReckoning,
    #[serde(rename = "P2_Rot")]
    RateOfTurn,
    #[serde(rename = "P2_Quad")]
    HermiteQuadratic,
    #[serde(rename = "P2_Cubic")]
    HermiteCubic,
    #[serde(rename = "P3_Quad")]
    Quadratic,
    #[serde(rename = "P3_QuadCT")]
    ChordQuadratic,
    #[serde(rename = "P4_Cubic")]
    Cubic,
}

impl PredictorKind {
    /// Number of reports the variant is fitted to.
    pub fn order(self) -> usize {
        match self {
            PredictorKind::DeadReckoning => 1,
            PredictorKind::RateOfTurn
            | PredictorKind::HermiteQuadratic
            | PredictorKind::HermiteCubic => 2,
            PredictorKind::Quadratic | PredictorKind::ChordQuadratic => 3,
            PredictorKind::Cubic => 4,
        }
    }

    /// The variant to try when this one cannot be fitted.
    pub fn fallback(self) -> Option<PredictorKind> {
        match self {
            PredictorKind::DeadReckoning => None,
            PredictorKind::RateOfTurn
            | PredictorKind::HermiteQuadratic
            | PredictorKind::HermiteCubic => Some(PredictorKind::DeadReckoning),
            PredictorKind::Quadratic | PredictorKind::ChordQuadratic => {
                Some(PredictorKind::RateOfTurn)
            }
            PredictorKind::Cubic => Some(PredictorKind::Quadratic),
        }
    }

    /// # Explanation
    /// Picks the variant for a window of `available` reports. While the window is still shorter
    /// than this variant needs, the default variant for the window size is used.
    pub fn for_window(self, available: usize) -> PredictorKind {
        if available >= self.order() {
            return self;
        }
        match available {
            0 | 1 => PredictorKind::DeadReckoning,
            2 => PredictorKind::RateOfTurn,
            _ => PredictorKind::Quadratic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PredictorKind::DeadReckoning => "P1",
            PredictorKind::RateOfTurn => "P2_Rot",
            PredictorKind::HermiteQuadratic => "P2_Quad",
            PredictorKind::HermiteCubic => "P2_Cubic",
            PredictorKind::Quadratic => "P3_Quad",
            PredictorKind::ChordQuadratic => "P3_QuadCT",
            PredictorKind::Cubic => "P4_Cubic",
        }
    }
}

impl fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// # Explanation
/// A predictor fitted to a report window. The set of variants is closed, so the blending
/// controller holds them by value.
#[derive(Debug, Clone)]
pub enum FittedPredictor {
    DeadReckoning(DeadReckoning),
    RateOfTurn(RateOfTurn),
    Quadratic(PolynomialTrack<3>),
    Cubic(PolynomialTrack<4>),
    ChordQuadratic(ChordQuadratic),
}

impl FittedPredictor {
    /// # Explanation
    /// Fits the given variant to the newest `kind.order()` reports of the window (oldest first).
    ///
    /// # Errors
    /// DegenerateGeometry if the window is too short or its geometry cannot be fitted,
    /// SingularMatrix if a fit has no unique solution.
    pub fn fit(kind: PredictorKind, window: &[Report]) -> Result<Self, EstimationError> {
        let order = kind.order();
        if window.len() < order {
            return Err(EstimationError::DegenerateGeometry {
                reason: format!(
                    "{} needs {} reports but the window holds {}",
                    kind,
                    order,
                    window.len()
                ),
            });
        }
        let window = &window[window.len() - order..];

        let predictor = match kind {
            PredictorKind::DeadReckoning => {
                FittedPredictor::DeadReckoning(DeadReckoning::new(&window[0]))
            }
            PredictorKind::RateOfTurn => {
                FittedPredictor::RateOfTurn(RateOfTurn::new(&window[0], &window[1]))
            }
            PredictorKind::HermiteQuadratic => FittedPredictor::Quadratic(
                PolynomialTrack::hermite_quadratic(&window[0], &window[1])?,
            ),
            PredictorKind::HermiteCubic => FittedPredictor::Cubic(PolynomialTrack::hermite_cubic(
                &window[0], &window[1],
            )?),
            PredictorKind::Quadratic => {
                FittedPredictor::Quadratic(PolynomialTrack::through_points(window)?)
            }
            PredictorKind::ChordQuadratic => FittedPredictor::ChordQuadratic(ChordQuadratic::new(
                &window[0], &window[1], &window[2],
            )?),
            PredictorKind::Cubic => FittedPredictor::Cubic(PolynomialTrack::through_points(window)?),
        };
        Ok(predictor)
    }

    /// # Explanation
    /// Fits `kind` and walks down its fallback chain until a variant succeeds. Dead reckoning
    /// always succeeds, so this only fails for an empty window.
    ///
    /// # Returns
    /// The fitted predictor, its variant and the number of fallbacks taken.
    pub fn fit_with_fallback(
        kind: PredictorKind,
        window: &[Report],
    ) -> Result<(Self, PredictorKind, usize), EstimationError> {
        let mut current = kind;
        let mut fallbacks = 0;
        loop {
            match Self::fit(current, window) {
                Ok(predictor) => return Ok((predictor, current, fallbacks)),
                Err(err) => match current.fallback() {
                    Some(next) => {
                        log::debug!(
                            "{} could not be fitted ({}), falling back to {}",
                            current, err, next
                        );
                        current = next;
                        fallbacks += 1;
                    }
                    None => return Err(err),
                },
            }
        }
    }

    /// Curve fitted through the window, if the variant has one.
    pub fn interpolant(&self) -> Option<&dyn Interpolant> {
        match self {
            FittedPredictor::Quadratic(track) => Some(track as &dyn Interpolant),
            FittedPredictor::Cubic(track) => Some(track as &dyn Interpolant),
            _ => None,
        }
    }
}

impl KinematicPredictor for FittedPredictor {
    fn predict(&mut self, dt: f64) -> VesselState {
        match self {
            FittedPredictor::DeadReckoning(predictor) => predictor.predict(dt),
            FittedPredictor::RateOfTurn(predictor) => predictor.predict(dt),
            FittedPredictor::Quadratic(predictor) => predictor.predict(dt),
            FittedPredictor::Cubic(predictor) => predictor.predict(dt),
            FittedPredictor::ChordQuadratic(predictor) => predictor.predict(dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_defaults() {
        assert_eq!(
            PredictorKind::ChordQuadratic.for_window(2),
            PredictorKind::RateOfTurn
        );
        assert_eq!(PredictorKind::Cubic.for_window(3), PredictorKind::Quadratic);
        assert_eq!(PredictorKind::Cubic.for_window(1), PredictorKind::DeadReckoning);
        assert_eq!(
            PredictorKind::HermiteCubic.for_window(5),
            PredictorKind::HermiteCubic
        );
    }

    #[test]
    fn test_fallback_chain_ends_in_dead_reckoning() {
        let mut kind = PredictorKind::Cubic;
        let mut chain = vec![kind];
        while let Some(next) = kind.fallback() {
            chain.push(next);
            kind = next;
        }
        assert_eq!(
            chain,
            vec![
                PredictorKind::Cubic,
                PredictorKind::Quadratic,
                PredictorKind::RateOfTurn,
                PredictorKind::DeadReckoning
            ]
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(PredictorKind::ChordQuadratic.to_string(), "P3_QuadCT");
        assert_eq!(PredictorKind::HermiteQuadratic.order(), 2);
    }
}
