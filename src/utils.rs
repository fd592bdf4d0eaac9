use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{Config, WriteLogger};

pub const LOG_FILE: &str = "ais_tracker.log";

/// # Explanation
/// This function initializes the logger. The level is read from the RUST_LOG environment variable
/// and falls back to the given level, then to info. The output goes to ais_tracker.log .
pub fn logger_init(level: &str) -> Result<(), Box<dyn Error>> {
    let log_level = std::env::var("RUST_LOG").unwrap_or(level.to_string());
    let log_level = LevelFilter::from_str(&log_level).unwrap_or(LevelFilter::Info);

    let log_file = std::fs::File::create(LOG_FILE)?;
    WriteLogger::init(log_level, Config::default(), log_file)?;
    Ok(())
}

/// # Explanation
/// Unwraps a result of a single validation step. An error is logged and replaced by the default, so one
/// broken trial or estimator does not stop the others.
pub trait LogErrUnwrap<T> {
    fn log_err_unwrap(self, default: T) -> T;
}

impl<T, E: Display> LogErrUnwrap<T> for Result<T, E> {
    fn log_err_unwrap(self, default: T) -> T {
        self.unwrap_or_else(|e| {
            log::error!("{}", e);
            default
        })
    }
}
