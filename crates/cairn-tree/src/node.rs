use std::fmt;

use crate::histogram::Histogram;
use crate::sample::Label;

/// Index into a `Vec<Node>` arena, identifying a specific node in a cairn tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fraction of a sample set not carrying its majority label, in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Misclassification(f64);

impl Misclassification {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw rate.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Misclassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A node in a cairn tree arena.
///
/// Trees are stored as `Vec<Node>` where children are referenced by
/// [`NodeIndex`]. A split node always owns both cairns and both children;
/// there is no way to express a split without them.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An interior node routing samples to the nearer of two cairns.
    Split {
        /// Labels of the training samples that reached this node.
        histogram: Histogram,
        /// Misclassification rate at this node before splitting.
        error: Misclassification,
        /// Feature vector of the left cairn; ties in distance go left.
        left_cairn: Vec<f64>,
        /// Feature vector of the right cairn.
        right_cairn: Vec<f64>,
        /// Training-set index the left cairn was copied from.
        left_cairn_index: usize,
        /// Training-set index the right cairn was copied from.
        right_cairn_index: usize,
        /// Size-weighted misclassification rate of the two children.
        split_error: Misclassification,
        /// Index of the left child node.
        left: NodeIndex,
        /// Index of the right child node.
        right: NodeIndex,
    },
    /// A terminal leaf node.
    Leaf {
        /// Labels of the training samples that reached this leaf.
        histogram: Histogram,
        /// Misclassification rate of this leaf.
        error: Misclassification,
        /// True when all samples share one label; false when no split helped.
        homogeneous: bool,
    },
}

impl Node {
    /// Return the label histogram of the training samples at this node.
    #[must_use]
    pub fn histogram(&self) -> &Histogram {
        match self {
            Node::Split { histogram, .. } | Node::Leaf { histogram, .. } => histogram,
        }
    }

    /// Return the majority label at this node.
    #[must_use]
    pub fn estimate(&self) -> Label {
        self.histogram().estimate()
    }

    /// Return the misclassification rate at this node (before splitting for split nodes).
    #[must_use]
    pub fn error(&self) -> Misclassification {
        match self {
            Node::Split { error, .. } | Node::Leaf { error, .. } => *error,
        }
    }

    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.histogram().total()
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
