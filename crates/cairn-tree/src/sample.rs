//! Labelled samples and the validated training-set view.

use std::fmt;

use crate::error::TreeError;

/// An integer class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(i64);

impl Label {
    /// Create a label from its integer value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Return the integer value of the label.
    #[must_use]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<i32> for Label {
    fn from(value: i32) -> Self {
        Self(i64::from(value))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A feature vector paired with its class label.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    features: Vec<f64>,
    label: Label,
}

impl Sample {
    /// Create a sample from a feature vector and a label.
    pub fn new(features: Vec<f64>, label: impl Into<Label>) -> Self {
        Self {
            features,
            label: label.into(),
        }
    }

    /// Return the feature vector.
    #[must_use]
    pub fn features(&self) -> &[f64] {
        &self.features
    }

    /// Return the class label.
    #[must_use]
    pub fn label(&self) -> Label {
        self.label
    }
}

/// A validated training sequence.
///
/// Guarantees at least one sample, at least one feature column, a uniform
/// feature count and finite values. Labels are mapped to dense class indices
/// in ascending label order, so `classes()[class_of(i)] == samples[i].label()`.
#[derive(Debug)]
pub(crate) struct TrainingSet<'a> {
    samples: &'a [Sample],
    classes: Vec<Label>,
    class_of: Vec<usize>,
    n_features: usize,
}

impl<'a> TrainingSet<'a> {
    /// Validate `samples` and build the dense class mapping.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                  |
    /// |--------------------------------------|---------------------------------------|
    /// | [`TreeError::EmptyDataset`]          | `samples` is empty                    |
    /// | [`TreeError::ZeroFeatures`]          | samples have zero feature columns     |
    /// | [`TreeError::FeatureCountMismatch`]  | samples have inconsistent lengths     |
    /// | [`TreeError::NonFiniteValue`]        | any value is NaN or infinite          |
    pub(crate) fn new(samples: &'a [Sample]) -> Result<Self, TreeError> {
        let first = samples.first().ok_or(TreeError::EmptyDataset)?;
        let n_features = first.features().len();
        if n_features == 0 {
            return Err(TreeError::ZeroFeatures);
        }

        for (sample_index, sample) in samples.iter().enumerate() {
            if sample.features().len() != n_features {
                return Err(TreeError::FeatureCountMismatch {
                    expected: n_features,
                    got: sample.features().len(),
                    sample_index,
                });
            }
            if let Some(feature_index) = sample.features().iter().position(|v| !v.is_finite()) {
                return Err(TreeError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }

        let mut classes: Vec<Label> = samples.iter().map(Sample::label).collect();
        classes.sort_unstable();
        classes.dedup();

        let class_of = samples
            .iter()
            .map(|s| {
                classes
                    .binary_search(&s.label())
                    .unwrap_or_else(|_| unreachable!("every label was inserted into classes"))
            })
            .collect();

        Ok(Self {
            samples,
            classes,
            class_of,
            n_features,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn n_features(&self) -> usize {
        self.n_features
    }

    pub(crate) fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Distinct labels in ascending order.
    pub(crate) fn classes(&self) -> &[Label] {
        &self.classes
    }

    /// Dense class index of sample `i`.
    pub(crate) fn class_of(&self, i: usize) -> usize {
        self.class_of[i]
    }

    pub(crate) fn features(&self, i: usize) -> &'a [f64] {
        self.samples[i].features()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_ordering_and_display() {
        assert!(Label::new(-1) < Label::new(3));
        assert_eq!(format!("{}", Label::from(7)), "7");
    }

    #[test]
    fn classes_are_sorted_and_dense() {
        let samples = vec![
            Sample::new(vec![0.0], 9),
            Sample::new(vec![1.0], -2),
            Sample::new(vec![2.0], 9),
            Sample::new(vec![3.0], 4),
        ];
        let set = TrainingSet::new(&samples).unwrap();
        assert_eq!(set.classes(), &[Label::new(-2), Label::new(4), Label::new(9)]);
        assert_eq!(set.n_classes(), 3);
        assert_eq!(
            (0..4).map(|i| set.class_of(i)).collect::<Vec<_>>(),
            vec![2, 0, 2, 1]
        );
    }

    #[test]
    fn empty_dataset_error() {
        let err = TrainingSet::new(&[]).unwrap_err();
        assert!(matches!(err, TreeError::EmptyDataset));
    }

    #[test]
    fn zero_features_error() {
        let samples = vec![Sample::new(vec![], 0)];
        let err = TrainingSet::new(&samples).unwrap_err();
        assert!(matches!(err, TreeError::ZeroFeatures));
    }

    #[test]
    fn feature_count_mismatch_error() {
        let samples = vec![Sample::new(vec![1.0, 2.0], 0), Sample::new(vec![3.0], 1)];
        let err = TrainingSet::new(&samples).unwrap_err();
        assert!(matches!(
            err,
            TreeError::FeatureCountMismatch {
                expected: 2,
                got: 1,
                sample_index: 1
            }
        ));
    }

    #[test]
    fn non_finite_value_error() {
        let samples = vec![
            Sample::new(vec![1.0, 2.0], 0),
            Sample::new(vec![3.0, f64::INFINITY], 1),
        ];
        let err = TrainingSet::new(&samples).unwrap_err();
        assert!(matches!(
            err,
            TreeError::NonFiniteValue {
                sample_index: 1,
                feature_index: 1
            }
        ));
    }
}
