use tracing::{debug, info, instrument, warn};

use crate::{
    TreeError,
    histogram::Histogram,
    matrix::DistanceMatrix,
    node::{Node, NodeIndex},
    observer::{BuildObserver, TracingObserver},
    sample::{Label, Sample, TrainingSet},
    split::{SearchStrategy, find_best_split},
};

/// Configuration for cairn tree training.
///
/// Construct via [`CairnTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter         | Default    |
/// |-------------------|------------|
/// | `min_leaf`        | 3          |
/// | `search_strategy` | `Parallel` |
///
/// A `min_leaf` of zero, or one larger than half the training set, is
/// accepted but leaves no admissible split: the result is a single leaf.
#[derive(Debug, Clone)]
pub struct CairnTreeConfig {
    pub(crate) min_leaf: usize,
    pub(crate) search_strategy: SearchStrategy,
}

impl CairnTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_leaf: 3,
            search_strategy: SearchStrategy::Parallel,
        }
    }

    /// Set the minimum number of samples each side of a split must hold.
    #[must_use]
    pub fn with_min_leaf(mut self, min_leaf: usize) -> Self {
        self.min_leaf = min_leaf;
        self
    }

    /// Set how the per-node cairn-pair search is scheduled.
    #[must_use]
    pub fn with_search_strategy(mut self, search_strategy: SearchStrategy) -> Self {
        self.search_strategy = search_strategy;
        self
    }

    // --- Getters ---

    /// Return the minimum samples required on each side of a split.
    #[must_use]
    pub fn min_leaf(&self) -> usize {
        self.min_leaf
    }

    /// Return the split search strategy.
    #[must_use]
    pub fn search_strategy(&self) -> SearchStrategy {
        self.search_strategy
    }

    /// Train a cairn tree, reporting progress through `tracing`.
    ///
    /// See [`fit_with_observer`](Self::fit_with_observer).
    ///
    /// # Errors
    ///
    /// Same as [`fit_with_observer`](Self::fit_with_observer).
    pub fn fit(&self, samples: &[Sample]) -> Result<CairnTree, TreeError> {
        self.fit_with_observer(samples, &TracingObserver)
    }

    /// Train a cairn tree on `samples`, reporting progress to `observer`.
    ///
    /// Validates the samples, computes the full distance matrix once, then
    /// grows the tree from the root holding every sample.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                  |
    /// |--------------------------------------|---------------------------------------|
    /// | [`TreeError::EmptyDataset`]          | `samples` is empty                    |
    /// | [`TreeError::ZeroFeatures`]          | samples have zero feature columns     |
    /// | [`TreeError::FeatureCountMismatch`]  | samples have inconsistent lengths     |
    /// | [`TreeError::NonFiniteValue`]        | any value is NaN or infinite          |
    #[instrument(skip_all, fields(n_samples = samples.len(), min_leaf = self.min_leaf))]
    pub fn fit_with_observer(
        &self,
        samples: &[Sample],
        observer: &dyn BuildObserver,
    ) -> Result<CairnTree, TreeError> {
        let set = TrainingSet::new(samples)?;
        let n_samples = set.len();

        if self.min_leaf == 0 || self.min_leaf > n_samples / 2 {
            warn!(
                min_leaf = self.min_leaf,
                n_samples, "min_leaf admits no split; the tree will be a single leaf"
            );
        }

        debug!(
            n_samples,
            n_features = set.n_features(),
            n_classes = set.n_classes(),
            "fitting cairn tree"
        );

        let matrix = DistanceMatrix::compute(&set, observer);

        let builder = Builder {
            set: &set,
            matrix: &matrix,
            min_leaf: self.min_leaf,
            strategy: self.search_strategy,
            observer,
        };
        let indices: Vec<usize> = (0..n_samples).collect();
        let mut arena: Vec<Node> = Vec::new();
        let root = builder.build(&indices, 0, &mut arena);
        debug_assert_eq!(root.index(), 0);

        let tree = CairnTree {
            nodes: arena,
            n_features: set.n_features(),
            labels: set.classes().to_vec(),
        };

        info!(
            n_nodes = tree.n_nodes(),
            n_leaves = tree.n_leaves(),
            depth = tree.depth(),
            "cairn tree built"
        );

        Ok(tree)
    }
}

impl Default for CairnTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only state shared by every recursive build step.
struct Builder<'a> {
    set: &'a TrainingSet<'a>,
    matrix: &'a DistanceMatrix,
    min_leaf: usize,
    strategy: SearchStrategy,
    observer: &'a dyn BuildObserver,
}

impl Builder<'_> {
    /// Recursively build the node for `indices` into `arena`.
    ///
    /// Returns the [`NodeIndex`] of the node just created.
    fn build(&self, indices: &[usize], depth: usize, arena: &mut Vec<Node>) -> NodeIndex {
        let mut counts = vec![0usize; self.set.n_classes()];
        for &i in indices {
            counts[self.set.class_of(i)] += 1;
        }
        let histogram = Histogram::from_class_counts(self.set.classes(), &counts);
        let error = histogram.misclassification();

        let push_leaf = |arena: &mut Vec<Node>, histogram: Histogram, homogeneous: bool| {
            let idx = arena.len();
            arena.push(Node::Leaf {
                histogram,
                error,
                homogeneous,
            });
            self.observer.node_built(depth, &arena[idx]);
            NodeIndex::new(idx)
        };

        if histogram.is_homogeneous() {
            return push_leaf(arena, histogram, true);
        }

        self.observer.split_search(depth, indices.len());
        let split = if self.min_leaf == 0 {
            None
        } else {
            find_best_split(self.set, self.matrix, indices, self.min_leaf, self.strategy)
        };

        let Some(split) = split else {
            return push_leaf(arena, histogram, false);
        };

        debug!(
            depth,
            n_samples = indices.len(),
            n_left = split.left_indices.len(),
            n_right = split.right_indices.len(),
            misclassified = split.misclassified,
            "split accepted"
        );

        // Arena pattern: reserve index, recurse, then overwrite with the split.
        let node_idx = arena.len();
        arena.push(Node::Leaf {
            histogram: histogram.clone(),
            error,
            homogeneous: false,
        });

        let left = self.build(&split.left_indices, depth + 1, arena);
        let right = self.build(&split.right_indices, depth + 1, arena);

        arena[node_idx] = Node::Split {
            histogram,
            error,
            left_cairn: self.set.features(split.left_cairn).to_vec(),
            right_cairn: self.set.features(split.right_cairn).to_vec(),
            left_cairn_index: split.left_cairn,
            right_cairn_index: split.right_cairn,
            split_error: split.split_error,
            left,
            right,
        };
        self.observer.node_built(depth, &arena[node_idx]);

        NodeIndex::new(node_idx)
    }
}

/// A fitted cairn tree.
///
/// Stored as an arena-based `Vec<Node>` with the root at index 0 and
/// children referenced by index. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CairnTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) labels: Vec<Label>,
}

impl CairnTree {
    /// Return the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Return the arena index of the root node.
    #[must_use]
    pub fn root_index(&self) -> NodeIndex {
        NodeIndex::new(0)
    }

    /// Return the node stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not belong to this tree.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.index()]
    }

    /// Return all nodes in arena order (parents before children).
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the number of features the tree was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the distinct training labels in ascending order.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    /// Uses an iterative BFS approach.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((0usize, 0usize));

        while let Some((node_idx, d)) = queue.pop_front() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    queue.push_back((left.index(), d + 1));
                    queue.push_back((right.index(), d + 1));
                }
            }
        }

        max_depth
    }
}
