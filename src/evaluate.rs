//! Evaluate a persisted artifact against the full reference dataset.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::data;
use crate::metrics::{classification_report, ClassificationReport};
use crate::model::{Classifier, LogisticModel};

/// Load the artifact at `model_path` and score it on every sample.
pub fn evaluate(model_path: &Path) -> Result<ClassificationReport> {
    let model = LogisticModel::load(model_path)
        .with_context(|| format!("loading model from {}", model_path.display()))?;

    let dataset = data::load_dataset();
    info!(
        "evaluating {} on {} samples",
        model_path.display(),
        dataset.n_samples()
    );

    let predictions = model
        .predict(dataset.features.view())
        .context("scoring the dataset")?;

    Ok(classification_report(
        dataset.labels.view(),
        predictions.view(),
    ))
}
