//! Model artifact: a standardize-then-logistic-regression pipeline.
//!
//! `LogisticModel` owns fitting, inference, and JSON persistence. The serving
//! layer depends only on the [`Classifier`] trait so alternative estimators
//! (or test stubs) can stand in for the real artifact.

use std::fs;
use std::path::Path;

use ndarray::{aview1, Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inference failure surfaced by an artifact.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("expected {expected} features per row, got {got}")]
    FeatureCount { expected: usize, got: usize },
}

/// Artifact persistence failure.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("{path}: invalid model artifact: {source}")]
    Format {
        path: String,
        source: serde_json::Error,
    },
    #[error("{path}: invalid model artifact: {reason}")]
    Invalid { path: String, reason: String },
}

/// A trained binary classifier the serving layer can hold behind a pointer.
///
/// `predict` maps feature rows to hard 0/1 labels. `predict_proba` is a
/// capability: estimators without calibrated probabilities keep the default
/// `None` and the API reports `null` for them.
pub trait Classifier: Send + Sync {
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<u8>, PredictError>;

    /// Per-class probabilities, one `[p(class 0), p(class 1)]` row per input
    /// row.
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Option<Result<Array2<f64>, PredictError>> {
        let _ = x;
        None
    }
}

/// Hyperparameters for [`LogisticModel::fit`].
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Inverse regularization strength; larger `c` means a weaker L2 penalty.
    pub c: f64,
    /// Hard cap on gradient-descent iterations.
    pub max_iter: usize,
    /// Step size on the standardized design matrix.
    pub learning_rate: f64,
    /// Early-stop threshold on the gradient infinity norm.
    pub tol: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            learning_rate: 0.1,
            tol: 1e-6,
        }
    }
}

/// Standard-scaler plus logistic-regression pipeline.
///
/// Features are shifted and scaled with the training-set statistics, then a
/// single linear decision function produces the positive-class log-odds.
/// Parameters are stored as plain vectors so the artifact serializes to a
/// flat, readable JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    mean: Vec<f64>,
    scale: Vec<f64>,
    weights: Vec<f64>,
    intercept: f64,
}

impl LogisticModel {
    /// Number of feature columns the artifact expects.
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Fit on a feature matrix and 0/1 labels.
    ///
    /// Full-batch gradient descent on the L2-regularized mean log-loss. The
    /// intercept starts at the empirical log-odds, and zero-variance columns
    /// get unit scale so standardization never divides by zero.
    ///
    /// # Panics
    ///
    /// Panics if `x` has no rows or `y` disagrees with `x` on sample count.
    pub fn fit(x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>, config: &ModelConfig) -> Self {
        assert!(x.nrows() > 0, "cannot fit on an empty matrix");
        assert_eq!(x.nrows(), y.len(), "feature/label row count mismatch");

        let n = x.nrows() as f64;
        let mean = (x.sum_axis(Axis(0)) / n).to_vec();
        let scale: Vec<f64> = x
            .var_axis(Axis(0), 0.0)
            .iter()
            .map(|v| {
                let sd = v.sqrt();
                if sd > 0.0 {
                    sd
                } else {
                    1.0
                }
            })
            .collect();

        // Standardize once up front; every iteration reuses the same design.
        let xs = standardize(x, &mean, &scale);
        let y = y.mapv(f64::from);

        let positives = y.sum();
        let p0 = (positives / n).clamp(1e-7, 1.0 - 1e-7);
        let mut intercept = (p0 / (1.0 - p0)).ln();
        let mut weights = Array1::<f64>::zeros(xs.ncols());

        for _ in 0..config.max_iter {
            let z = xs.dot(&weights) + intercept;
            let p = z.mapv(sigmoid);
            let residual = &p - &y;

            let mut grad_w = xs.t().dot(&residual) / n;
            grad_w.scaled_add(1.0 / (config.c * n), &weights);
            let grad_b = residual.sum() / n;

            let sup = grad_w.iter().fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if sup < config.tol {
                break;
            }

            weights.scaled_add(-config.learning_rate, &grad_w);
            intercept -= config.learning_rate * grad_b;
        }

        Self {
            mean,
            scale,
            weights: weights.to_vec(),
            intercept,
        }
    }

    /// Positive-class log-odds for each row.
    fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, PredictError> {
        if x.ncols() != self.n_features() {
            return Err(PredictError::FeatureCount {
                expected: self.n_features(),
                got: x.ncols(),
            });
        }
        let xs = standardize(x, &self.mean, &self.scale);
        Ok(xs.dot(&aview1(&self.weights)) + self.intercept)
    }

    /// Serialize to pretty JSON at `path`.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ArtifactError::Format {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load and validate an artifact. Any failure leaves the caller without
    /// a usable model; the serving process maps that to degraded mode.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let model: Self = serde_json::from_str(&raw).map_err(|source| ArtifactError::Format {
            path: path.display().to_string(),
            source,
        })?;
        model.validate().map_err(|reason| ArtifactError::Invalid {
            path: path.display().to_string(),
            reason,
        })?;
        Ok(model)
    }

    /// Structural checks on a deserialized artifact.
    fn validate(&self) -> Result<(), String> {
        let d = self.weights.len();
        if d == 0 {
            return Err("no feature weights".to_string());
        }
        if self.mean.len() != d || self.scale.len() != d {
            return Err(format!(
                "inconsistent parameter lengths: weights={d}, mean={}, scale={}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        for (name, values) in [
            ("mean", &self.mean),
            ("scale", &self.scale),
            ("weights", &self.weights),
        ] {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(format!("non-finite value in {name}"));
            }
        }
        if !self.intercept.is_finite() {
            return Err("non-finite intercept".to_string());
        }
        if self.scale.iter().any(|&s| s <= 0.0) {
            return Err("non-positive scale".to_string());
        }
        Ok(())
    }
}

impl Classifier for LogisticModel {
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<u8>, PredictError> {
        let z = self.decision_function(x)?;
        Ok(z.mapv(|v| u8::from(v >= 0.0)))
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Option<Result<Array2<f64>, PredictError>> {
        Some(self.decision_function(x).map(|z| {
            let mut proba = Array2::zeros((z.len(), 2));
            for (i, &v) in z.iter().enumerate() {
                let p = sigmoid(v);
                proba[[i, 0]] = 1.0 - p;
                proba[[i, 1]] = p;
            }
            proba
        }))
    }
}

fn standardize(x: ArrayView2<'_, f64>, mean: &[f64], scale: &[f64]) -> Array2<f64> {
    (&x - &aview1(mean)) / &aview1(scale)
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
