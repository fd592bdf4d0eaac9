use std::error::Error;
use std::path::Path;

use ais_tracker::config::Config;
use ais_tracker::runner::run;
use ais_tracker::utils::logger_init;

const DEFAULT_CONFIG: &str = "config.toml";

fn main() -> Result<(), Box<dyn Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or(DEFAULT_CONFIG.to_string());
    let config = if Path::new(&config_path).exists() {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };

    logger_init(&config.log_level)?;
    log::info!(
        "Validation started: {} trials, {} estimators at {} Hz",
        config.trials.len(),
        config.estimators.len(),
        config.est_freq
    );

    let result = run_validation(&config);
    if let Err(e) = result {
        log::error!("{}", e);
        Err(e)
    } else {
        log::info!("The validation terminated successfully.");
        Ok(())
    }
}

/// # Explanation
/// Runs every estimator of the configuration on every trial and prints the result table as CSV
/// to stdout. Without a configuration file (`ais_tracker [config.toml]`) all estimators are run
/// on the two synthetic trials.
fn run_validation(config: &Config) -> Result<(), Box<dyn Error>> {
    let results = run(config, std::io::stdout().lock())?;
    log::info!("{} runs completed", results.len());
    Ok(())
}
