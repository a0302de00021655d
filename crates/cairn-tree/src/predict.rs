//! Nearest-cairn descent for fitted trees.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::distance::euclidean;
use crate::error::TreeError;
use crate::histogram::Histogram;
use crate::node::Node;
use crate::sample::Label;
use crate::tree::CairnTree;

impl CairnTree {
    /// Predict the label of a single feature vector.
    ///
    /// Descends from the root: at each split, goes left when the input is no
    /// farther from the left cairn than from the right one, right otherwise.
    /// Returns the majority label of the leaf reached.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<Label, TreeError> {
        Ok(self.leaf_for(sample)?.estimate())
    }

    /// Return the training label histogram of the leaf `sample` falls into.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_histogram(&self, sample: &[f64]) -> Result<&Histogram, TreeError> {
        Ok(self.leaf_for(sample)?.histogram())
    }

    /// Predict labels for a batch of feature vectors in parallel.
    ///
    /// Output order matches input order.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionFeatureMismatch`] if any input has the wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<Label>, TreeError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    fn leaf_for(&self, sample: &[f64]) -> Result<&Node, TreeError> {
        if sample.len() != self.n_features {
            return Err(TreeError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let leaf = &self.nodes[self.traverse(sample)];
        debug_assert!(leaf.is_leaf(), "traverse always ends at a leaf");
        Ok(leaf)
    }

    /// Traverse the tree from the root and return the arena index of the leaf.
    fn traverse(&self, sample: &[f64]) -> usize {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { .. } => return idx,
                Node::Split {
                    left_cairn,
                    right_cairn,
                    left,
                    right,
                    ..
                } => {
                    if euclidean(sample, left_cairn) <= euclidean(sample, right_cairn) {
                        idx = left.index();
                    } else {
                        idx = right.index();
                    }
                }
            }
        }
    }
}
