//! Label histograms over sample index sets: majority estimate and misclassification rate.

use std::collections::BTreeMap;

use crate::node::Misclassification;
use crate::sample::{Label, Sample};

/// Occurrence count of each label within a non-empty set of samples.
///
/// Entries are kept in ascending label order. The estimate is the label with
/// the highest count; when several labels share the highest count the
/// smallest label wins, independent of sample order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: Vec<(Label, usize)>,
    total: usize,
    estimate: Label,
}

impl Histogram {
    /// Count the labels of `samples[i]` for every `i` in `indices`.
    ///
    /// # Panics
    ///
    /// Panics if `indices` is empty or holds an index out of bounds for `samples`.
    #[must_use]
    pub fn from_indices(samples: &[Sample], indices: &[usize]) -> Self {
        assert!(!indices.is_empty(), "histogram of an empty index set");
        let mut map: BTreeMap<Label, usize> = BTreeMap::new();
        for &i in indices {
            *map.entry(samples[i].label()).or_insert(0) += 1;
        }
        Self::from_sorted(map.into_iter().collect())
    }

    /// Build from dense per-class counts, where `classes` is sorted ascending.
    pub(crate) fn from_class_counts(classes: &[Label], counts: &[usize]) -> Self {
        debug_assert_eq!(classes.len(), counts.len());
        let sparse = classes
            .iter()
            .zip(counts)
            .filter(|&(_, &c)| c > 0)
            .map(|(&label, &c)| (label, c))
            .collect();
        Self::from_sorted(sparse)
    }

    fn from_sorted(counts: Vec<(Label, usize)>) -> Self {
        assert!(!counts.is_empty(), "histogram of an empty index set");
        let total = counts.iter().map(|&(_, c)| c).sum();
        let mut estimate = counts[0];
        for &entry in &counts[1..] {
            if entry.1 > estimate.1 {
                estimate = entry;
            }
        }
        Self {
            counts,
            total,
            estimate: estimate.0,
        }
    }

    /// Return the majority label.
    #[must_use]
    pub fn estimate(&self) -> Label {
        self.estimate
    }

    /// Return the number of samples counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Return how many samples carry `label`.
    #[must_use]
    pub fn count(&self, label: Label) -> usize {
        self.counts
            .binary_search_by_key(&label, |&(l, _)| l)
            .map_or(0, |pos| self.counts[pos].1)
    }

    /// Return the number of samples whose label differs from the estimate.
    #[must_use]
    pub fn misclassified(&self) -> usize {
        self.total - self.count(self.estimate)
    }

    /// Return the fraction of samples whose label differs from the estimate.
    #[must_use]
    pub fn misclassification(&self) -> Misclassification {
        Misclassification::new(self.misclassified() as f64 / self.total as f64)
    }

    /// Return true when every sample carries the same label.
    #[must_use]
    pub fn is_homogeneous(&self) -> bool {
        self.counts.len() == 1
    }

    /// Iterate over `(label, count)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, usize)> + '_ {
        self.counts.iter().copied()
    }

    /// Return the number of distinct labels.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.counts.len()
    }
}

/// Samples outside the majority class of dense `counts` summing to `total`.
pub(crate) fn misclassified_count(counts: &[usize], total: usize) -> usize {
    total - counts.iter().copied().max().unwrap_or(0)
}
