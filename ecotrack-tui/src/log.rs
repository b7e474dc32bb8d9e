//! Logger setup. Output goes to a file because the terminal is drawn by the UI.

use std::env;
use std::fmt::{Arguments, Display};
use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Local;
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};

/// Used when neither the environment nor the settings name a level.
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the configured log level.
const LOG_LEVEL_VAR: &str = "ECOTRACK_LOG_LEVEL";

/// Initialise the program logger.
///
/// `ECOTRACK_LOG_LEVEL` takes precedence over the level from the settings file.
pub(crate) fn init(log_level_from_settings: &str, log_file_path: &Path) -> Result<()> {
    let log_level =
        env::var(LOG_LEVEL_VAR).unwrap_or_else(|_| log_level_from_settings.to_owned());
    let log_level = parse_level(&log_level)?;

    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(log_file_path)
        .with_context(|| format!("Could not open log file {}", log_file_path.display()))?;

    Dispatch::new()
        .format(write_log_plain)
        .level(log_level)
        // Keep HTTP internals out of the log unless tracing.
        .level_for("reqwest", log_level.min(LevelFilter::Info))
        .level_for("hyper_util", log_level.min(LevelFilter::Warn))
        .chain(log_file)
        .apply()
        .context("Logger already initialised")?;

    Ok(())
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    let filter = match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    };
    Ok(filter)
}

fn write_log<T: Display>(out: FormatCallback<'_>, level: T, target: &str, message: &Arguments<'_>) {
    let timestamp = Local::now().format("%H:%M:%S");

    out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
}

fn write_log_plain(out: FormatCallback<'_>, message: &Arguments<'_>, record: &Record<'_>) {
    write_log(out, record.level(), record.target(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels_case_insensitively() {
        assert_eq!(parse_level("WARN").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("trace").unwrap(), LevelFilter::Trace);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(parse_level("chatty").is_err());
    }
}
