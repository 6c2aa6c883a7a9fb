//! Serving-process state: the model artifact handle and its loading policy.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::Settings;
use crate::model::{Classifier, LogisticModel};

/// Immutable-after-init state injected into the HTTP layer.
///
/// The artifact is loaded once when the state is built. If loading fails the
/// process stays up in degraded mode: `model()` returns `None` for the rest
/// of the process lifetime and the API answers 503. There is no retry; an
/// operator fixes the artifact and restarts.
pub struct AppState {
    model: Option<Arc<dyn Classifier>>,
    model_path: String,
}

impl AppState {
    /// Perform the one startup load attempt.
    pub fn from_settings(settings: &Settings) -> Self {
        let path = settings.model_path.display().to_string();
        match LogisticModel::load(&settings.model_path) {
            Ok(model) => {
                info!("model loaded from {path}");
                Self {
                    model: Some(Arc::new(model)),
                    model_path: path,
                }
            }
            Err(err) => {
                error!("could not load model: {err}");
                Self {
                    model: None,
                    model_path: path,
                }
            }
        }
    }

    /// State around an already-built artifact (tests, alternative estimators).
    pub fn with_model(model: Arc<dyn Classifier>, model_path: impl Into<String>) -> Self {
        Self {
            model: Some(model),
            model_path: model_path.into(),
        }
    }

    /// State with no artifact: the mode the serving process enters when the
    /// startup load fails.
    pub fn degraded(model_path: impl Into<String>) -> Self {
        Self {
            model: None,
            model_path: model_path.into(),
        }
    }

    /// The artifact, if the startup load succeeded.
    pub fn model(&self) -> Option<&Arc<dyn Classifier>> {
        self.model.as_ref()
    }

    pub fn model_path(&self) -> &str {
        &self.model_path
    }
}
