//! Confusion matrix and per-label classification metrics.

use std::fmt;

use crate::error::TreeError;
use crate::sample::Label;

/// A confusion matrix over the labels seen in a set of predictions.
///
/// Rows and columns follow [`labels`](Self::labels) (ascending). Entry
/// `matrix[t][p]` counts samples whose true label is `labels[t]` and whose
/// predicted label is `labels[p]`.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    labels: Vec<Label>,
    matrix: Vec<Vec<usize>>,
}

/// Per-label precision, recall, and F1 score.
#[derive(Debug, Clone)]
pub struct ClassMetrics {
    /// The label these metrics describe.
    pub label: Label,
    /// Precision: TP / (TP + FP). 0.0 if no predictions for this label.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if no true samples for this label.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of true samples with this label.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from paired true and predicted labels.
    ///
    /// The label axis is the sorted union of both slices.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`] | Zero labels provided |
    pub fn from_labels(true_labels: &[Label], predicted: &[Label]) -> Result<Self, TreeError> {
        if true_labels.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        debug_assert_eq!(true_labels.len(), predicted.len());

        let mut labels: Vec<Label> = true_labels.iter().chain(predicted).copied().collect();
        labels.sort_unstable();
        labels.dedup();

        let position = |label: &Label| labels.binary_search(label).unwrap_or_else(|p| p);
        let mut matrix = vec![vec![0usize; labels.len()]; labels.len()];
        for (t, p) in true_labels.iter().zip(predicted) {
            matrix[position(t)][position(p)] += 1;
        }
        Ok(Self { labels, matrix })
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.labels.len()).map(|i| self.matrix[i][i]).sum();
        let total: usize = self.matrix.iter().flat_map(|row| row.iter()).sum();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Per-label precision, recall, F1, and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.labels.len();
        (0..n)
            .map(|c| {
                let tp = self.matrix[c][c];
                let fp: usize = (0..n).filter(|&i| i != c).map(|i| self.matrix[i][c]).sum();
                let fn_: usize = (0..n).filter(|&j| j != c).map(|j| self.matrix[c][j]).sum();
                let support = tp + fn_;
                let precision = if tp + fp == 0 {
                    0.0
                } else {
                    tp as f64 / (tp + fp) as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    label: self.labels[c],
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the label axis in ascending order.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for label in &self.labels {
            write!(f, " pred_{label:>3}")?;
        }
        writeln!(f)?;

        for (label, row) in self.labels.iter().zip(&self.matrix) {
            write!(f, "true_{label:>3}")?;
            for val in row {
                write!(f, " {val:>7}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
