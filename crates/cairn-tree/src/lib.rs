//! Cairn tree classification: train, predict, evaluate.
//!
//! A cairn tree splits each node by proximity to two representative training
//! samples (the cairns) rather than by per-feature thresholds. Pairwise
//! Euclidean distances are computed once; each node then searches every pair
//! of its samples for the nearest-cairn partition with the lowest
//! misclassification. Pure math library, zero file I/O.

mod confusion;
mod distance;
mod error;
mod eval;
mod histogram;
mod matrix;
mod node;
mod observer;
mod predict;
mod sample;
mod split;
mod tree;

pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use distance::{Distance, euclidean};
pub use error::TreeError;
pub use eval::{Evaluation, evaluate};
pub use histogram::Histogram;
pub use matrix::DistanceMatrix;
pub use node::{Misclassification, Node, NodeIndex};
pub use observer::{BuildObserver, NoopObserver, TracingObserver};
pub use sample::{Label, Sample};
pub use split::SearchStrategy;
pub use tree::{CairnTree, CairnTreeConfig};
