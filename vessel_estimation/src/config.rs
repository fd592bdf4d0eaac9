use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use crate::blending::BlendingController;
use crate::estimator::{EstimationError, Estimator};
use crate::kalman::exogenous::ExogenousParameters;
use crate::kalman::model::{CourseSpeedModel, TurnRateModel, VesselMeasurementModel};
use crate::kalman::{
    CourseSource, ExogenousKalmanFilter, ExtendedKalmanFilter, FilterSetup, RecursiveEstimator,
    UnscentedKalmanFilter,
};
use crate::kinematic::PredictorKind;
use crate::velocity_blending::VelocityBlending;

/// # Explanation
/// One estimator of a validation run, as written in the `[[estimators]]` tables of the
/// configuration file. The variant is selected by the `kind` key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorConfig {
    DeadReckoning,
    RateOfTurn,
    Blending(BlendingConfig),
    VelocityBlending,
    Extended(ExtendedConfig),
    Unscented(UnscentedConfig),
    Exogenous(ExogenousConfig),
}

impl EstimatorConfig {
    /// # Errors
    /// Configuration if a parameter is out of range.
    pub fn build(&self, est_freq: f64) -> Result<Box<dyn Estimator>, EstimationError> {
        let estimator: Box<dyn Estimator> = match self {
            EstimatorConfig::DeadReckoning => Box::new(BlendingController::dead_reckoning(est_freq)?),
            EstimatorConfig::RateOfTurn => Box::new(BlendingController::rate_of_turn(est_freq)?),
            EstimatorConfig::Blending(config) => Box::new(BlendingController::new(
                config.predictor,
                config.blend_fraction,
                est_freq,
            )?),
            EstimatorConfig::VelocityBlending => Box::new(VelocityBlending::new(est_freq)?),
            EstimatorConfig::Extended(config) => Box::new(config.build(est_freq)?),
            EstimatorConfig::Unscented(config) => Box::new(config.build(est_freq)?),
            EstimatorConfig::Exogenous(config) => Box::new(config.build(est_freq)?),
        };
        Ok(estimator)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BlendingConfig {
    pub predictor: PredictorKind,
    #[serde(default = "default_blend_fraction")]
    pub blend_fraction: f64,
}

fn default_blend_fraction() -> f64 {
    0.5
}

pub type ExtendedVesselFilter =
    ExtendedKalmanFilter<4, 4, CourseSpeedModel, VesselMeasurementModel<4>>;

/// Extended Kalman filter on (x, y, speed, course).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExtendedConfig {
    pub process_noise: [f64; 4],
    pub measurement_noise: [f64; 4],
    pub initial_error: f64,
    pub course_source: CourseSource,
}

impl Default for ExtendedConfig {
    fn default() -> Self {
        Self {
            process_noise: [0.01, 0.01, 0.1, 0.1],
            measurement_noise: [0.001, 0.001, 0.001, 0.01],
            initial_error: 0.1,
            course_source: CourseSource::Reported,
        }
    }
}

impl ExtendedConfig {
    pub fn build(
        &self,
        est_freq: f64,
    ) -> Result<RecursiveEstimator<4, ExtendedVesselFilter>, EstimationError> {
        check_diagonal("EKF process noise", &self.process_noise)?;
        check_diagonal("EKF measurement noise", &self.measurement_noise)?;
        let filter = ExtendedKalmanFilter::new(
            CourseSpeedModel::new(SVector::from(self.process_noise)),
            VesselMeasurementModel::new(SVector::from(self.measurement_noise)),
        );
        let setup = FilterSetup {
            initial_error: self.initial_error,
            course_source: self.course_source,
        };
        RecursiveEstimator::new(&filter_name("EKF", self.course_source), filter, setup, est_freq)
    }
}

pub type UnscentedVesselFilter =
    UnscentedKalmanFilter<4, 6, TurnRateModel, VesselMeasurementModel<6>>;

/// Unscented Kalman filter on (x, y, speed, course, yaw rate, acceleration).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UnscentedConfig {
    pub process_noise: [f64; 6],
    pub measurement_noise: [f64; 4],
    pub initial_error: f64,
    pub alpha: f64,
    pub beta: f64,
    pub kappa: f64,
    pub course_source: CourseSource,
}

impl Default for UnscentedConfig {
    fn default() -> Self {
        Self {
            process_noise: [0.01, 0.01, 0.1, 0.1, 1e-4, 1e-4],
            measurement_noise: [0.01, 0.01, 0.01, 0.001],
            initial_error: 0.1,
            alpha: 1.0,
            beta: 2.0,
            kappa: 0.0,
            course_source: CourseSource::Reported,
        }
    }
}

impl UnscentedConfig {
    pub fn build(
        &self,
        est_freq: f64,
    ) -> Result<RecursiveEstimator<6, UnscentedVesselFilter>, EstimationError> {
        check_diagonal("UKF process noise", &self.process_noise)?;
        check_diagonal("UKF measurement noise", &self.measurement_noise)?;
        let filter = UnscentedKalmanFilter::new(
            TurnRateModel::new(SVector::from(self.process_noise)),
            VesselMeasurementModel::new(SVector::from(self.measurement_noise)),
            self.alpha,
            self.beta,
            self.kappa,
        )?;
        let setup = FilterSetup {
            initial_error: self.initial_error,
            course_source: self.course_source,
        };
        RecursiveEstimator::new(&filter_name("UKF", self.course_source), filter, setup, est_freq)
    }
}

/// Exogenous Kalman filter. Saturation of the yaw rate is given in deg/s.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExogenousConfig {
    pub gains: [f64; 4],
    pub process_noise: [f64; 4],
    pub measurement_noise: [f64; 4],
    pub initial_error: f64,
    pub acceleration_time_constant: f64,
    pub yaw_rate_time_constant: f64,
    pub max_yaw_rate: f64,
    pub max_acceleration: f64,
    pub staleness: f64,
}

impl Default for ExogenousConfig {
    fn default() -> Self {
        let parameters = ExogenousParameters::default();
        Self {
            gains: parameters.gains,
            process_noise: parameters.process_noise.into(),
            measurement_noise: parameters.measurement_noise.into(),
            initial_error: parameters.initial_error,
            acceleration_time_constant: parameters.acceleration_time_constant,
            yaw_rate_time_constant: parameters.yaw_rate_time_constant,
            max_yaw_rate: parameters.max_yaw_rate.to_degrees(),
            max_acceleration: parameters.max_acceleration,
            staleness: parameters.staleness,
        }
    }
}

impl ExogenousConfig {
    pub fn build(&self, est_freq: f64) -> Result<ExogenousKalmanFilter, EstimationError> {
        check_diagonal("XKF process noise", &self.process_noise)?;
        check_diagonal("XKF measurement noise", &self.measurement_noise)?;
        ExogenousKalmanFilter::new(
            ExogenousParameters {
                gains: self.gains,
                process_noise: SVector::from(self.process_noise),
                measurement_noise: SVector::from(self.measurement_noise),
                initial_error: self.initial_error,
                acceleration_time_constant: self.acceleration_time_constant,
                yaw_rate_time_constant: self.yaw_rate_time_constant,
                max_yaw_rate: self.max_yaw_rate.to_radians(),
                max_acceleration: self.max_acceleration,
                staleness: self.staleness,
            },
            est_freq,
        )
    }
}

fn filter_name(name: &str, course_source: CourseSource) -> String {
    match course_source {
        CourseSource::Reported => name.to_string(),
        CourseSource::FromTrack => format!("{}-track", name),
    }
}

fn check_diagonal(name: &str, values: &[f64]) -> Result<(), EstimationError> {
    if values.iter().all(|value| value.is_finite() && *value >= 0.0) {
        Ok(())
    } else {
        Err(EstimationError::Configuration {
            description: format!("{} must be finite and non-negative, got {:?}", name, values),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_names() {
        let configs = [
            (EstimatorConfig::DeadReckoning, "DR"),
            (EstimatorConfig::RateOfTurn, "ROT"),
            (EstimatorConfig::VelocityBlending, "PVB"),
            (EstimatorConfig::Extended(ExtendedConfig::default()), "EKF"),
            (EstimatorConfig::Unscented(UnscentedConfig::default()), "UKF"),
            (EstimatorConfig::Exogenous(ExogenousConfig::default()), "XKF"),
            (
                EstimatorConfig::Blending(BlendingConfig {
                    predictor: PredictorKind::ChordQuadratic,
                    blend_fraction: 0.5,
                }),
                "P3_QuadCT-0.5",
            ),
        ];
        for (config, name) in configs {
            assert_eq!(config.build(60.0).unwrap().name(), name);
        }
    }

    #[test]
    fn test_negative_noise_is_rejected() {
        let config = EstimatorConfig::Extended(ExtendedConfig {
            process_noise: [0.01, -1.0, 0.1, 0.1],
            ..ExtendedConfig::default()
        });
        assert!(matches!(
            config.build(60.0),
            Err(EstimationError::Configuration { .. })
        ));
    }
}
