use rayon::prelude::*;

use crate::histogram::misclassified_count;
use crate::matrix::DistanceMatrix;
use crate::node::Misclassification;
use crate::sample::TrainingSet;

/// How the cairn-pair search at each node is scheduled.
///
/// Both strategies produce identical trees: among all pairs reaching the
/// lowest split error, the one enumerated first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Enumerate pairs on the calling thread.
    Sequential,
    /// Spread pairs across the rayon pool by their first cairn.
    #[default]
    Parallel,
}

/// Result of finding the best cairn pair for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Training index of the left cairn.
    pub(crate) left_cairn: usize,
    /// Training index of the right cairn.
    pub(crate) right_cairn: usize,
    /// Samples misclassified by the two children together.
    pub(crate) misclassified: usize,
    /// Size-weighted misclassification rate of the two children.
    pub(crate) split_error: Misclassification,
    /// Training indices nearer to (or equidistant with) the left cairn, in node order.
    pub(crate) left_indices: Vec<usize>,
    /// Remaining training indices, in node order.
    pub(crate) right_indices: Vec<usize>,
}

/// Candidate scored during the search: `(misclassified, first position, second position)`.
type Candidate = (usize, usize, usize);

/// Pairwise distances and dense classes restricted to one node's samples.
struct NodeView {
    n: usize,
    distances: Vec<f64>,
    classes: Vec<usize>,
    parent_counts: Vec<usize>,
}

impl NodeView {
    fn new(set: &TrainingSet<'_>, matrix: &DistanceMatrix, indices: &[usize]) -> Self {
        let n = indices.len();
        let mut distances = Vec::with_capacity(n * n);
        for &a in indices {
            distances.extend(indices.iter().map(|&c| matrix.get(a, c).value()));
        }
        let classes: Vec<usize> = indices.iter().map(|&i| set.class_of(i)).collect();
        let mut parent_counts = vec![0usize; set.n_classes()];
        for &c in &classes {
            parent_counts[c] += 1;
        }
        Self {
            n,
            distances,
            classes,
            parent_counts,
        }
    }

    fn row(&self, a: usize) -> &[f64] {
        &self.distances[a * self.n..(a + 1) * self.n]
    }

    /// Best pair whose first cairn sits at position `a`; earlier `b` wins ties.
    fn best_with_first(&self, a: usize, min_leaf: usize) -> Option<Candidate> {
        let mut left_counts = vec![0usize; self.parent_counts.len()];
        let mut best: Option<Candidate> = None;
        let da = self.row(a);

        for b in (a + 1)..self.n {
            let db = self.row(b);
            left_counts.iter_mut().for_each(|c| *c = 0);
            let mut n_left = 0usize;
            for (pos, &class) in self.classes.iter().enumerate() {
                if da[pos] <= db[pos] {
                    left_counts[class] += 1;
                    n_left += 1;
                }
            }
            let n_right = self.n - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let right_max = self
                .parent_counts
                .iter()
                .zip(&left_counts)
                .map(|(p, l)| p - l)
                .max()
                .unwrap_or(0);
            let misclassified = misclassified_count(&left_counts, n_left) + (n_right - right_max);

            if best.is_none_or(|(m, _, _)| misclassified < m) {
                best = Some((misclassified, a, b));
            }
        }
        best
    }
}

/// Find the cairn pair that most reduces misclassification at a node.
///
/// Every unordered pair `(p, q)` of distinct positions in `indices` (with `p`
/// before `q`) partitions the node: a sample goes left when it is no farther
/// from `p` than from `q`. Pairs leaving fewer than `min_leaf` samples on
/// either side are skipped. The pair with the fewest misclassified samples
/// wins, the first one enumerated on ties.
///
/// Returns `None` when no valid pair exists or when the best pair does not
/// strictly improve on the node's own misclassification.
pub(crate) fn find_best_split(
    set: &TrainingSet<'_>,
    matrix: &DistanceMatrix,
    indices: &[usize],
    min_leaf: usize,
    strategy: SearchStrategy,
) -> Option<SplitResult> {
    let n = indices.len();
    if n < 2 || min_leaf > n / 2 {
        return None;
    }

    let view = NodeView::new(set, matrix, indices);
    let parent_misclassified = misclassified_count(&view.parent_counts, n);

    let best = match strategy {
        SearchStrategy::Sequential => (0..n)
            .filter_map(|a| view.best_with_first(a, min_leaf))
            .fold(None, |best: Option<Candidate>, c| match best {
                Some(b) if b.0 <= c.0 => Some(b),
                _ => Some(c),
            }),
        SearchStrategy::Parallel => (0..n)
            .into_par_iter()
            .filter_map(|a| view.best_with_first(a, min_leaf))
            .min_by_key(|&candidate| candidate),
    };

    let (misclassified, a, b) = best?;
    if misclassified >= parent_misclassified {
        return None;
    }

    let (da, db) = (view.row(a), view.row(b));
    let mut left_indices = Vec::with_capacity(n);
    let mut right_indices = Vec::with_capacity(n);
    for (pos, &i) in indices.iter().enumerate() {
        if da[pos] <= db[pos] {
            left_indices.push(i);
        } else {
            right_indices.push(i);
        }
    }

    Some(SplitResult {
        left_cairn: indices[a],
        right_cairn: indices[b],
        misclassified,
        split_error: Misclassification::new(misclassified as f64 / n as f64),
        left_indices,
        right_indices,
    })
}
