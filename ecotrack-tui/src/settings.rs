//! Program settings read from `ecotrack.toml` and the environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use ecotrack_core::accumulator::{DEFAULT_TICK_PERIOD, SimulationConfig};
use ecotrack_provider_gemini::{
    DEFAULT_BASE_URL, DEFAULT_PREDICTION_MODEL, DEFAULT_ROUTE_MODEL, GeminiConfig,
};
use serde::Deserialize;

use crate::log::DEFAULT_LOG_LEVEL;

pub(crate) const SETTINGS_FILE_NAME: &str = "ecotrack.toml";

/// Environment variables checked for the Gemini API key, in order.
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct Settings {
    /// Program log level
    pub log_level: String,
    /// Where log output goes; the terminal belongs to the UI
    pub log_file: PathBuf,
    /// Seconds between two simulated sensor readings
    pub tick_period_secs: u64,
    /// Fixed seed for the fill-level simulation
    pub seed: Option<u64>,
    pub gemini: GeminiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            log_file: PathBuf::from("ecotrack.log"),
            tick_period_secs: DEFAULT_TICK_PERIOD.as_secs(),
            seed: None,
            gemini: GeminiSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct GeminiSettings {
    pub base_url: String,
    pub route_model: String,
    pub prediction_model: String,
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            route_model: DEFAULT_ROUTE_MODEL.to_owned(),
            prediction_model: DEFAULT_PREDICTION_MODEL.to_owned(),
            timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Read `ecotrack.toml` from the working directory, or use defaults if it is absent.
    pub(crate) fn load() -> Result<Self> {
        Self::load_from_path(Path::new(SETTINGS_FILE_NAME))
    }

    fn load_from_path(file_path: &Path) -> Result<Self> {
        if !file_path.is_file() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(file_path)
            .with_context(|| format!("Could not read {}", file_path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", file_path.display()))
    }

    pub(crate) fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            tick_period: Duration::from_secs(self.tick_period_secs.max(1)),
            seed: self.seed,
        }
    }

    pub(crate) fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.gemini.base_url.trim_end_matches('/').to_owned(),
            api_key: api_key_from_env(),
            route_model: self.gemini.route_model.clone(),
            prediction_model: self.gemini.prediction_model.clone(),
        }
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.timeout_secs)
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .find_map(|var| env::var(var).ok().filter(|key| !key.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME); // NB: doesn't exist
        assert_eq!(
            Settings::load_from_path(&file_path).unwrap(),
            Settings::default()
        );
    }

    #[test]
    fn partial_file_is_merged_with_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME);
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "log_level = \"warn\"\nseed = 7\n\n[gemini]\ntimeout_secs = 5").unwrap();
        }

        let settings = Settings::load_from_path(&file_path).unwrap();
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.tick_period_secs, 5);
        assert_eq!(settings.gemini.timeout_secs, 5);
        assert_eq!(settings.gemini.route_model, DEFAULT_ROUTE_MODEL);
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&file_path, "tick_period_secs = \"soon\"").unwrap();
        assert!(Settings::load_from_path(&file_path).is_err());
    }

    #[test]
    fn zero_period_is_raised_to_one_second() {
        let settings = Settings {
            tick_period_secs: 0,
            ..Settings::default()
        };
        assert_eq!(settings.simulation().tick_period, Duration::from_secs(1));
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let mut settings = Settings::default();
        settings.gemini.base_url = "http://localhost:8080/v1beta/".to_owned();
        assert_eq!(settings.gemini().base_url, "http://localhost:8080/v1beta");
    }
}
