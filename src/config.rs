//! Runtime settings shared by the serving, training, and evaluation binaries.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

/// Artifact location used when `MODEL_PATH` is unset.
pub const DEFAULT_MODEL_PATH: &str = "models/model.json";

/// Configuration resolved once at process start. Every field has a default
/// and an environment override.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where the serialized model artifact lives (`MODEL_PATH`).
    pub model_path: PathBuf,
    /// Seed for the train/test split (`RANDOM_STATE`).
    pub random_state: u64,
    /// Fraction of samples held out for testing (`TEST_SIZE`).
    pub test_size: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            random_state: 42,
            test_size: 0.2,
        }
    }
}

impl Settings {
    /// Read settings from the environment, falling back to defaults.
    ///
    /// Unparsable numeric values are logged and ignored rather than aborting
    /// startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            random_state: parsed_var("RANDOM_STATE", defaults.random_state),
            test_size: parsed_var("TEST_SIZE", defaults.test_size),
        }
    }
}

fn parsed_var<T>(name: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("ignoring {name}={raw:?}: not a valid value, keeping {default}");
                default
            }
        },
        Err(_) => default,
    }
}
