//! Training flow: fit on a stratified split, score, persist.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Settings;
use crate::data;
use crate::metrics::{accuracy, classification_report, roc_auc};
use crate::model::{Classifier, LogisticModel, ModelConfig};

/// Scores from one training run, persisted next to the artifact as
/// `metrics.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainMetrics {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roc_auc: Option<f64>,
}

/// Paths and scores of a completed run.
#[derive(Debug)]
pub struct TrainOutcome {
    pub model_path: PathBuf,
    pub metrics_path: PathBuf,
    pub metrics: TrainMetrics,
}

/// Fit the classifier on the reference dataset and write the artifact plus
/// its metrics sidecar under `output_dir`.
pub fn train(settings: &Settings, output_dir: &Path) -> Result<TrainOutcome> {
    let dataset = data::load_dataset();
    let (train_idx, test_idx) = data::stratified_split(
        dataset.labels.view(),
        settings.test_size,
        settings.random_state,
    );

    let x_train = dataset.features.select(Axis(0), &train_idx);
    let y_train = dataset.labels.select(Axis(0), &train_idx);
    let x_test = dataset.features.select(Axis(0), &test_idx);
    let y_test = dataset.labels.select(Axis(0), &test_idx);

    info!(
        "training on {} samples, holding out {} of {} ({} features)",
        x_train.nrows(),
        x_test.nrows(),
        dataset.n_samples(),
        dataset.n_features()
    );

    let model = LogisticModel::fit(x_train.view(), y_train.view(), &ModelConfig::default());

    let pred_train = model
        .predict(x_train.view())
        .context("scoring the training split")?;
    let pred_test = model
        .predict(x_test.view())
        .context("scoring the test split")?;

    let auc = match model.predict_proba(x_test.view()) {
        Some(proba) => {
            let proba = proba.context("computing test probabilities")?;
            roc_auc(y_test.view(), proba.column(1))
        }
        None => None,
    };

    let metrics = TrainMetrics {
        train_accuracy: accuracy(y_train.view(), pred_train.view()),
        test_accuracy: accuracy(y_test.view(), pred_test.view()),
        roc_auc: auc,
    };

    info!(
        "train accuracy {:.4}, test accuracy {:.4}{}",
        metrics.train_accuracy,
        metrics.test_accuracy,
        metrics
            .roc_auc
            .map(|auc| format!(", test ROC AUC {auc:.4}"))
            .unwrap_or_default()
    );
    info!(
        "test-set report:\n{}",
        classification_report(y_test.view(), pred_test.view())
    );

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let model_path = output_dir.join("model.json");
    model
        .save(&model_path)
        .context("persisting the model artifact")?;

    let metrics_path = output_dir.join("metrics.json");
    let encoded = serde_json::to_string_pretty(&metrics).context("encoding metrics")?;
    fs::write(&metrics_path, encoded)
        .with_context(|| format!("writing {}", metrics_path.display()))?;

    info!("artifact saved to {}", model_path.display());

    Ok(TrainOutcome {
        model_path,
        metrics_path,
        metrics,
    })
}
