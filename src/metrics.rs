//! Classification metrics shared by training and evaluation.

use std::cmp::Ordering;
use std::fmt;

use ndarray::ArrayView1;

use crate::data::CLASS_NAMES;

/// Fraction of predictions matching the labels.
///
/// # Panics
///
/// Panics if the views differ in length.
pub fn accuracy(y_true: ArrayView1<'_, u8>, y_pred: ArrayView1<'_, u8>) -> f64 {
    assert_eq!(y_true.len(), y_pred.len(), "label/prediction length mismatch");
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(truth, pred)| truth == pred)
        .count();
    hits as f64 / y_true.len() as f64
}

/// Area under the ROC curve from positive-class scores, computed by rank
/// statistics with tied scores sharing their average rank. `None` when only
/// one class is present.
///
/// # Panics
///
/// Panics if the views differ in length.
pub fn roc_auc(y_true: ArrayView1<'_, u8>, scores: ArrayView1<'_, f64>) -> Option<f64> {
    assert_eq!(y_true.len(), scores.len(), "label/score length mismatch");
    let n_pos = y_true.iter().filter(|&&label| label == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));

    // Sum the 1-based ranks of the positives, averaging across tie groups.
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if y_true[idx] == 1 {
                rank_sum_pos += avg_rank;
            }
        }
        i = j + 1;
    }

    let n_pos = n_pos as f64;
    Some((rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg as f64))
}

/// Precision, recall, F1, and support for one class.
#[derive(Debug, Clone)]
pub struct ClassMetrics {
    pub name: &'static str,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics plus the aggregate rows of the usual text report.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub support: usize,
}

impl ClassificationReport {
    /// Unweighted mean of (precision, recall, F1) over classes.
    pub fn macro_avg(&self) -> (f64, f64, f64) {
        let n = self.classes.len().max(1) as f64;
        let sum = self.classes.iter().fold((0.0, 0.0, 0.0), |acc, c| {
            (acc.0 + c.precision, acc.1 + c.recall, acc.2 + c.f1)
        });
        (sum.0 / n, sum.1 / n, sum.2 / n)
    }

    /// Support-weighted mean of (precision, recall, F1) over classes.
    pub fn weighted_avg(&self) -> (f64, f64, f64) {
        let total = self.support.max(1) as f64;
        let sum = self.classes.iter().fold((0.0, 0.0, 0.0), |acc, c| {
            let w = c.support as f64;
            (
                acc.0 + w * c.precision,
                acc.1 + w * c.recall,
                acc.2 + w * c.f1,
            )
        });
        (sum.0 / total, sum.1 / total, sum.2 / total)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12}  {:>9}  {:>6}  {:>8}  {:>7}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for class in &self.classes {
            writeln!(
                f,
                "{:>12}  {:>9.2}  {:>6.2}  {:>8.2}  {:>7}",
                class.name, class.precision, class.recall, class.f1, class.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12}  {:>9}  {:>6}  {:>8.2}  {:>7}",
            "accuracy", "", "", self.accuracy, self.support
        )?;
        let (mp, mr, mf) = self.macro_avg();
        writeln!(
            f,
            "{:>12}  {:>9.2}  {:>6.2}  {:>8.2}  {:>7}",
            "macro avg", mp, mr, mf, self.support
        )?;
        let (wp, wr, wf) = self.weighted_avg();
        writeln!(
            f,
            "{:>12}  {:>9.2}  {:>6.2}  {:>8.2}  {:>7}",
            "weighted avg", wp, wr, wf, self.support
        )
    }
}

/// Build the per-class report for binary labels.
///
/// # Panics
///
/// Panics if the views differ in length.
pub fn classification_report(
    y_true: ArrayView1<'_, u8>,
    y_pred: ArrayView1<'_, u8>,
) -> ClassificationReport {
    assert_eq!(y_true.len(), y_pred.len(), "label/prediction length mismatch");

    let mut classes = Vec::with_capacity(CLASS_NAMES.len());
    for (label, name) in CLASS_NAMES.iter().enumerate() {
        let label = label as u8;
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for (&truth, &pred) in y_true.iter().zip(y_pred.iter()) {
            match (truth == label, pred == label) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        classes.push(ClassMetrics {
            name,
            precision,
            recall,
            f1,
            support: tp + fn_,
        });
    }

    ClassificationReport {
        classes,
        accuracy: accuracy(y_true, y_pred),
        support: y_true.len(),
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
