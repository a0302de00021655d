//! Lower-triangular matrix of pairwise Euclidean distances between training samples.

use std::ops::Index;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::distance::{Distance, euclidean};
use crate::error::TreeError;
use crate::observer::{BuildObserver, NoopObserver};
use crate::sample::{Sample, TrainingSet};

/// Symmetric distance matrix stored as a lower-triangular flat vector.
///
/// For `n` samples, stores `n*(n-1)/2` distances. Access is symmetric:
/// `get(i, j) == get(j, i)`. Diagonal is always zero. Computed once,
/// never mutated.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<Distance>,
}

impl DistanceMatrix {
    /// Validate `samples` and compute all pairwise distances.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                  |
    /// |--------------------------------------|---------------------------------------|
    /// | [`TreeError::EmptyDataset`]          | `samples` is empty                    |
    /// | [`TreeError::ZeroFeatures`]          | samples have zero feature columns     |
    /// | [`TreeError::FeatureCountMismatch`]  | samples have inconsistent lengths     |
    /// | [`TreeError::NonFiniteValue`]        | any value is NaN or infinite          |
    pub fn from_samples(samples: &[Sample]) -> Result<Self, TreeError> {
        let set = TrainingSet::new(samples)?;
        Ok(Self::compute(&set, &NoopObserver))
    }

    /// Compute the lower triangle row by row in parallel.
    ///
    /// Row `i` holds the distances from sample `i` to samples `0..i`. The
    /// observer is told how many rows are complete after each one finishes.
    #[instrument(skip_all, fields(n = set.len()))]
    pub(crate) fn compute(set: &TrainingSet<'_>, observer: &dyn BuildObserver) -> Self {
        let n = set.len();
        let done = AtomicUsize::new(0);

        let rows: Vec<Vec<Distance>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let a = set.features(i);
                let row: Vec<Distance> = (0..i).map(|j| euclidean(a, set.features(j))).collect();
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                observer.distances_progress(finished, n);
                row
            })
            .collect();

        let data = rows.concat();
        debug!(n, n_pairs = data.len(), "distance matrix computed");
        Self::from_raw(n, data)
    }

    /// Create a matrix from pre-computed lower-triangular data.
    ///
    /// `data` must contain exactly `n*(n-1)/2` elements, stored as
    /// `data[row*(row-1)/2 + col]` where `row > col`.
    pub(crate) fn from_raw(n: usize, data: Vec<Distance>) -> Self {
        debug_assert_eq!(data.len(), n * n.saturating_sub(1) / 2);
        Self { n, data }
    }

    /// Return the number of samples in the matrix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the matrix is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Return the distance between sample `i` and sample `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n` or `j >= n`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Distance {
        assert!(i < self.n, "row index {i} out of bounds for matrix of size {}", self.n);
        assert!(j < self.n, "column index {j} out of bounds for matrix of size {}", self.n);
        if i == j {
            return Distance::ZERO;
        }
        self.data[Self::flat_index(i, j)]
    }

    /// Iterate over all unique pairs `(i, j, distance)` where `i > j`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Distance)> + '_ {
        (1..self.n).flat_map(move |i| (0..i).map(move |j| (i, j, self.data[Self::flat_index(i, j)])))
    }

    /// Return all distances from sample `i` to every sample, including itself.
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<Distance> {
        (0..self.n).map(|j| self.get(i, j)).collect()
    }

    fn flat_index(i: usize, j: usize) -> usize {
        let (row, col) = if i > j { (i, j) } else { (j, i) };
        row * (row - 1) / 2 + col
    }
}

impl Index<(usize, usize)> for DistanceMatrix {
    type Output = Distance;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        if i == j {
            assert!(i < self.n, "index {i} out of bounds for matrix of size {}", self.n);
            return &Distance::ZERO;
        }
        &self.data[Self::flat_index(i, j)]
    }
}
