//! Held-out evaluation of a fitted cairn tree.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{info, instrument};

use crate::confusion::ConfusionMatrix;
use crate::error::TreeError;
use crate::sample::{Label, Sample};
use crate::tree::CairnTree;

/// Outcome of predicting every sample of a held-out set.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Samples whose predicted label equals the true label.
    pub correct: usize,
    /// Samples whose predicted label differs from the true label.
    pub incorrect: usize,
    /// Predicted label of each sample, in input order.
    pub predictions: Vec<Label>,
    /// Confusion matrix over the union of true and predicted labels.
    pub confusion_matrix: ConfusionMatrix,
}

impl Evaluation {
    /// Fraction of samples predicted correctly: `correct / (correct + incorrect)`.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.correct as f64 / (self.correct + self.incorrect) as f64
    }

    /// Return the number of samples evaluated.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.correct + self.incorrect
    }
}

/// Predict every sample in `samples` and tally the results against their labels.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TreeError::EmptyDataset`] | `samples` is empty |
/// | [`TreeError::PredictionFeatureMismatch`] | a sample's width differs from the tree's |
#[instrument(skip_all, fields(n_samples = samples.len()))]
pub fn evaluate(tree: &CairnTree, samples: &[Sample]) -> Result<Evaluation, TreeError> {
    if samples.is_empty() {
        return Err(TreeError::EmptyDataset);
    }

    let predictions: Vec<Label> = samples
        .par_iter()
        .map(|s| tree.predict(s.features()))
        .collect::<Result<_, _>>()?;
    let truth: Vec<Label> = samples.iter().map(Sample::label).collect();

    let correct = predictions
        .iter()
        .zip(&truth)
        .filter(|&(p, t)| p == t)
        .count();
    let incorrect = samples.len() - correct;
    let confusion_matrix = ConfusionMatrix::from_labels(&truth, &predictions)?;

    let evaluation = Evaluation {
        correct,
        incorrect,
        predictions,
        confusion_matrix,
    };
    info!(
        correct,
        incorrect,
        fitness = evaluation.fitness(),
        "evaluation complete"
    );
    Ok(evaluation)
}
