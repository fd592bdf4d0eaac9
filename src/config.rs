use std::error::Error;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ais_reports::trial::{circle_trial, zig_zag_trial};
use ais_reports::{real, ReportError, Trial};
use vessel_estimation::config::{
    BlendingConfig, EstimatorConfig, ExogenousConfig, ExtendedConfig, UnscentedConfig,
};
use vessel_estimation::kinematic::PredictorKind;

/// # Explanation
/// The contents of `config.toml`. Every key is optional, missing keys take the values of
/// `Config::default()`, which runs every estimator on both synthetic trials.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// One of off, error, warn, info, debug or trace. `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Estimation frequency in Hz.
    pub est_freq: f64,
    pub trials: Vec<TrialConfig>,
    pub estimators: Vec<EstimatorConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let mut estimators = vec![
            EstimatorConfig::DeadReckoning,
            EstimatorConfig::RateOfTurn,
            EstimatorConfig::VelocityBlending,
            EstimatorConfig::Extended(ExtendedConfig::default()),
            EstimatorConfig::Unscented(UnscentedConfig::default()),
            EstimatorConfig::Exogenous(ExogenousConfig::default()),
        ];
        estimators.extend(
            [
                PredictorKind::DeadReckoning,
                PredictorKind::RateOfTurn,
                PredictorKind::HermiteQuadratic,
                PredictorKind::HermiteCubic,
                PredictorKind::Quadratic,
                PredictorKind::ChordQuadratic,
                PredictorKind::Cubic,
            ]
            .into_iter()
            .map(|predictor| {
                EstimatorConfig::Blending(BlendingConfig {
                    predictor,
                    blend_fraction: 0.5,
                })
            }),
        );

        Self {
            log_level: "info".to_string(),
            est_freq: 60.0,
            trials: vec![
                TrialConfig::Circle(CircleConfig::default()),
                TrialConfig::ZigZag(ZigZagConfig::default()),
            ],
            estimators,
        }
    }
}

impl Config {
    /// # Explanation
    /// Parses the configuration file at the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, Box<dyn Error>> {
        let config: Config = toml::from_str(contents)?;
        if !(config.est_freq > 0.0) {
            return Err(format!("est_freq must be positive, got {}", config.est_freq).into());
        }
        Ok(config)
    }
}

/// # Explanation
/// A trial of a validation run, selected by the `kind` key of a `[[trials]]` table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrialConfig {
    Circle(CircleConfig),
    ZigZag(ZigZagConfig),
    Real(RealConfig),
}

impl TrialConfig {
    pub fn load(&self) -> Result<Trial, ReportError> {
        match self {
            TrialConfig::Circle(config) => circle_trial(config.radius, config.time),
            TrialConfig::ZigZag(config) => zig_zag_trial(
                config.amplitude,
                config.wavelength_scale,
                config.distance,
                config.time,
            ),
            TrialConfig::Real(config) => real::read_trial_file(&config.path, config.mmsi),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CircleConfig {
    pub radius: f64,
    pub time: f64,
}

impl Default for CircleConfig {
    fn default() -> Self {
        Self {
            radius: 100.0,
            time: 60.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ZigZagConfig {
    pub amplitude: f64,
    pub wavelength_scale: f64,
    pub distance: f64,
    pub time: f64,
}

impl Default for ZigZagConfig {
    fn default() -> Self {
        Self {
            amplitude: 20.0,
            wavelength_scale: 15.0,
            distance: 100.0,
            time: 60.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RealConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub mmsi: Option<u64>,
}
