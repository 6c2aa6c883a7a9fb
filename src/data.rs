//! Fixed reference dataset for training and evaluation.
//!
//! The provider contract is deliberately small: no arguments, deterministic
//! output, 30 numeric feature columns and a binary label per row. The matrix
//! is synthesized in-crate from per-class profiles of the ten base tumor
//! measurements, each reported three ways (mean, standard error, worst), so
//! the repo ships no data file while every call still sees the same 569 rows.

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Number of feature columns every sample, request, and artifact agrees on.
pub const FEATURE_COUNT: usize = 30;

/// Class names, indexed by label.
pub const CLASS_NAMES: [&str; 2] = ["malignant", "benign"];

const N_MALIGNANT: usize = 212;
const N_BENIGN: usize = 357;

/// Seed for the dataset synthesis. Changing it changes the dataset; it is
/// intentionally separate from the configurable split seed.
const DATASET_SEED: u64 = 7;

/// Per-class (mean, standard deviation) of one base measurement.
struct Profile {
    malignant: (f64, f64),
    benign: (f64, f64),
}

/// The ten base measurements: radius, texture, perimeter, area, smoothness,
/// compactness, concavity, concave points, symmetry, fractal dimension.
const PROFILES: [Profile; 10] = [
    Profile { malignant: (17.5, 3.2), benign: (12.1, 1.8) },
    Profile { malignant: (21.6, 3.8), benign: (17.9, 4.0) },
    Profile { malignant: (115.4, 21.9), benign: (78.1, 11.8) },
    Profile { malignant: (978.4, 368.0), benign: (462.8, 134.0) },
    Profile { malignant: (0.1029, 0.0126), benign: (0.0925, 0.0134) },
    Profile { malignant: (0.1452, 0.0540), benign: (0.0800, 0.0337) },
    Profile { malignant: (0.1608, 0.0750), benign: (0.0461, 0.0434) },
    Profile { malignant: (0.0880, 0.0344), benign: (0.0257, 0.0159) },
    Profile { malignant: (0.1929, 0.0276), benign: (0.1742, 0.0248) },
    Profile { malignant: (0.0627, 0.0075), benign: (0.0629, 0.0071) },
];

/// Feature matrix plus labels. Labels are 0 (malignant) or 1 (benign).
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub labels: Array1<u8>,
}

impl Dataset {
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}

/// Return the fixed reference dataset: 569 samples, 30 features, 212
/// malignant and 357 benign. Every call produces identical values.
pub fn load_dataset() -> Dataset {
    let n = N_MALIGNANT + N_BENIGN;
    let mut rng = StdRng::seed_from_u64(DATASET_SEED);
    let mut features = Array2::zeros((n, FEATURE_COUNT));
    let mut labels = Array1::zeros(n);

    for row in 0..n {
        let label = u8::from(row >= N_MALIGNANT);
        labels[row] = label;

        // Shared severity factor couples the measurements within a sample
        // the way they co-vary in real tumors.
        let severity: f64 = rng.sample(StandardNormal);
        for (base, profile) in PROFILES.iter().enumerate() {
            let (mean, sd) = if label == 0 {
                profile.malignant
            } else {
                profile.benign
            };

            let eps: f64 = rng.sample(StandardNormal);
            let center = (mean + sd * (0.55 * severity + 0.84 * eps)).max(0.0);

            let se_jitter: f64 = rng.sample(StandardNormal);
            let spread = sd * (0.30 + 0.10 * se_jitter).max(0.05);

            let worst_jitter: f64 = rng.sample(StandardNormal);
            let worst = center + sd * (1.30 + 0.45 * worst_jitter).max(0.20);

            features[[row, base]] = center;
            features[[row, base + 10]] = spread;
            features[[row, base + 20]] = worst;
        }
    }

    Dataset { features, labels }
}

/// Deterministic stratified split: indices are shuffled within each class and
/// the test fraction is carved out of both, so class balance survives the
/// split. Returns `(train, test)` index sets that together cover every row.
pub fn stratified_split(
    labels: ArrayView1<'_, u8>,
    test_size: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == class)
            .map(|(i, _)| i)
            .collect();
        indices.shuffle(&mut rng);

        let n_test = ((indices.len() as f64) * test_size).round() as usize;
        let n_test = n_test.min(indices.len());
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    (train, test)
}
