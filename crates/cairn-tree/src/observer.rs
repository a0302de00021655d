//! Progress observation for tree construction.

use tracing::{debug, trace};

use crate::node::Node;

/// Receives advisory progress signals while a tree is being built.
///
/// Every method has an empty default body. Observers must be `Sync`
/// because distance rows are computed on the rayon pool and report
/// from worker threads.
pub trait BuildObserver: Sync {
    /// Called after each distance-matrix row completes; `done` counts finished rows.
    fn distances_progress(&self, done: usize, total: usize) {
        let _ = (done, total);
    }

    /// Called before the cairn-pair search of a node holding `n_samples` samples.
    fn split_search(&self, depth: usize, n_samples: usize) {
        let _ = (depth, n_samples);
    }

    /// Called once a node is final, children before parents.
    fn node_built(&self, depth: usize, node: &Node) {
        let _ = (depth, node);
    }
}

/// An observer that ignores every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BuildObserver for NoopObserver {}

/// An observer that forwards progress to `tracing`.
///
/// Distance progress is logged at debug level every `1/20` of the rows;
/// split searches and finished nodes are logged at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl BuildObserver for TracingObserver {
    fn distances_progress(&self, done: usize, total: usize) {
        let step = (total / 20).max(1);
        if done % step == 0 || done == total {
            debug!(done, total, "distance rows");
        }
    }

    fn split_search(&self, depth: usize, n_samples: usize) {
        trace!(depth, n_samples, "searching cairn pairs");
    }

    fn node_built(&self, depth: usize, node: &Node) {
        trace!(
            depth,
            n_samples = node.n_samples(),
            leaf = node.is_leaf(),
            estimate = %node.estimate(),
            "node built"
        );
    }
}
