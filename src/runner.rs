use std::error::Error;
use std::io::Write;
use std::time::Instant;

use serde::Serialize;

use ais_reports::Trial;
use vessel_estimation::estimator::{EstimationError, Estimator};
use vessel_estimation::evaluation::evaluate;

use crate::config::Config;
use crate::utils::LogErrUnwrap;

/// One row of the result table.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RunResult {
    pub trial: String,
    pub estimator: String,
    pub rmse: f64,
    pub mae: f64,
    pub teleportation: f64,
    pub smoothness: f64,
    /// Wall-clock time of the estimation in seconds.
    pub runtime: f64,
}

/// # Explanation
/// Runs one estimator on one trial and scores the trajectory against the trial's ground truth.
/// Only the estimation itself is timed.
pub fn run_estimator(trial: &Trial, estimator: &dyn Estimator) -> Result<RunResult, EstimationError> {
    let start = Instant::now();
    let trajectory = estimator.estimate(&trial.reports)?;
    let runtime = start.elapsed().as_secs_f64();

    let evaluation = evaluate(&trajectory, &trial.ground_truth)?;
    log::info!(
        "{} on {}: {} samples, RMSE {:.3} m, MAE {:.3} m in {:.4} s",
        estimator.name(),
        trial.name,
        trajectory.len(),
        evaluation.rmse,
        evaluation.mae,
        runtime
    );

    Ok(RunResult {
        trial: trial.name.clone(),
        estimator: estimator.name(),
        rmse: evaluation.rmse,
        mae: evaluation.mae,
        teleportation: evaluation.teleportation,
        smoothness: evaluation.smoothness,
        runtime,
    })
}

/// # Explanation
/// Runs every configured estimator on every configured trial and writes one CSV row per run.
/// A trial that cannot be loaded or a run that fails is logged and skipped, so the remaining
/// runs still complete.
///
/// # Errors
/// Fails if an estimator configuration is invalid or the output cannot be written.
pub fn run<W: Write>(config: &Config, output: W) -> Result<Vec<RunResult>, Box<dyn Error>> {
    let estimators = config
        .estimators
        .iter()
        .map(|estimator| estimator.build(config.est_freq))
        .collect::<Result<Vec<_>, _>>()?;

    let mut writer = csv::Writer::from_writer(output);
    let mut results = Vec::new();

    for trial_config in &config.trials {
        let trial = match trial_config.load().map(Some).log_err_unwrap(None) {
            Some(trial) => trial,
            None => continue,
        };
        if let Some(origin) = trial.origin {
            log::info!("Trial {} recorded from {}", trial.name, origin);
        }

        for estimator in &estimators {
            let result = run_estimator(&trial, estimator.as_ref())
                .map(Some)
                .log_err_unwrap(None);
            if let Some(result) = result {
                writer.serialize(&result)?;
                results.push(result);
            }
        }
    }

    writer.flush()?;
    Ok(results)
}
