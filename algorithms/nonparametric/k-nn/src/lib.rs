use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

use dsr_helpers::{Distance, LabeledObject, MetricError};
use ndarray::ArrayView1;
use dsr_helpers::Float;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur when using the k-NN classifier.
///
/// Indices refer to positions in the training and test slices. `test_index`
/// is only known when classifying a whole test set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KnnError {
    /// k cannot be zero for a k-NN classifier
    #[error("k cannot be zero for a k-NN classifier")]
    InvalidK,
    /// Cannot classify against an empty training set
    #[error("cannot classify against an empty training set")]
    EmptyTrainingSet,
    /// The metric produced NaN (likely due to NaN values in the data)
    #[error("distance between {} and training object {training_index} is NaN", describe(.test_index))]
    InvalidDistance {
        test_index: Option<usize>,
        training_index: usize,
    },
    /// The metric is undefined for a pair of objects
    #[error("cannot measure the distance between {} and training object {training_index}", describe(.test_index))]
    Metric {
        test_index: Option<usize>,
        training_index: usize,
        #[source]
        source: MetricError,
    },
    /// The object already carries a prediction
    #[error("{} is already classified", describe(.test_index))]
    AlreadyClassified { test_index: Option<usize> },
}

fn describe(test_index: &Option<usize>) -> String {
    match test_index {
        Some(index) => format!("test object {index}"),
        None => "the test object".to_string(),
    }
}

impl KnnError {
    fn at_test_object(self, index: usize) -> Self {
        match self {
            KnnError::InvalidDistance { training_index, .. } => KnnError::InvalidDistance {
                test_index: Some(index),
                training_index,
            },
            KnnError::Metric {
                training_index,
                source,
                ..
            } => KnnError::Metric {
                test_index: Some(index),
                training_index,
                source,
            },
            KnnError::AlreadyClassified { .. } => KnnError::AlreadyClassified {
                test_index: Some(index),
            },
            other => other,
        }
    }
}

/// A k-Nearest Neighbors (k-NN) classifier voting by summed class distances.
///
/// For every class of the training set the classifier sums the `k` smallest
/// distances between the test object and that class's members. The class with
/// the smallest sum wins. When several classes share the smallest sum the
/// object is left unclassified instead of breaking the tie arbitrarily.
///
/// # Type Parameters
///
/// * `L`: The type of the label (e.g., `String`, `i32`, or a custom `enum`).
/// * `F`: The float type for the descriptors (e.g., `f32`, `f64`).
/// * `D`: The distance metric, which must implement the `Distance` trait.
#[derive(Debug, Clone)]
pub struct KnnClassifier<'a, L, F, D>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
    D: Distance<F>,
{
    k: usize,
    training_data: &'a [LabeledObject<L, F>],
    distance: D,
}

impl<'a, L, F, D> KnnClassifier<'a, L, F, D>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
    D: Distance<F>,
{
    /// Creates a new k-NN classifier over a borrowed training set.
    ///
    /// # Arguments
    ///
    /// * `k`: The number of smallest distances summed per class. Must be greater than 0.
    /// * `training_data`: The labeled objects test objects are compared against.
    /// * `distance`: An instance of a type implementing `Distance` (e.g., `L2Dist` or a `Metric`).
    ///
    /// # Errors
    ///
    /// Returns `KnnError::InvalidK` if `k` is 0, as this is not a valid configuration.
    pub fn new(
        k: usize,
        training_data: &'a [LabeledObject<L, F>],
        distance: D,
    ) -> Result<Self, KnnError> {
        if k == 0 {
            return Err(KnnError::InvalidK);
        }
        Ok(Self {
            k,
            training_data,
            distance,
        })
    }

    /// Computes, for every training class, the sum of the `k` smallest
    /// distances between `features` and the members of that class.
    ///
    /// A class with fewer than `k` members contributes the sum of all its
    /// distances.
    ///
    /// # Errors
    ///
    /// Returns `KnnError::EmptyTrainingSet` if the training data is empty.
    /// Returns `KnnError::Metric` if the metric is undefined for some pair.
    /// Returns `KnnError::InvalidDistance` if the metric yields NaN.
    pub fn class_scores(&self, features: ArrayView1<F>) -> Result<BTreeMap<&'a L, F>, KnnError> {
        if self.training_data.is_empty() {
            return Err(KnnError::EmptyTrainingSet);
        }

        // 1. Distances from the test object to every training object, grouped by class.
        let mut distances: BTreeMap<&'a L, Vec<F>> = BTreeMap::new();
        for (training_index, object) in self.training_data.iter().enumerate() {
            let dist = self
                .distance
                .distance(object.descriptors.view(), features)
                .map_err(|source| KnnError::Metric {
                    test_index: None,
                    training_index,
                    source,
                })?;
            if dist.is_nan() {
                return Err(KnnError::InvalidDistance {
                    test_index: None,
                    training_index,
                });
            }
            distances.entry(&object.decision).or_default().push(dist);
        }

        // 2. Sum of the k smallest distances per class.
        let scores = distances
            .into_iter()
            .map(|(label, mut class_distances)| {
                if class_distances.len() < self.k {
                    debug!(
                        class = ?label,
                        members = class_distances.len(),
                        k = self.k,
                        "class has fewer members than k, summing all of its distances"
                    );
                }
                // NaN was rejected above, so the comparison is total.
                class_distances.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
                let score: F = class_distances.into_iter().take(self.k).sum();
                (label, score)
            })
            .collect();
        Ok(scores)
    }

    /// Predicts the label for a descriptor vector.
    ///
    /// # Returns
    ///
    /// `Some(label)` for the unique class with the smallest score, `None` when
    /// two or more classes tie for the smallest score.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`KnnClassifier::class_scores`].
    pub fn predict(&self, features: ArrayView1<F>) -> Result<Option<L>, KnnError> {
        let scores = self.class_scores(features)?;
        trace!(?scores, "class scores");

        let Some(minimum) = scores.values().copied().reduce(F::min) else {
            return Err(KnnError::EmptyTrainingSet);
        };
        let winners: Vec<&L> = scores
            .iter()
            .filter(|&(_, &score)| score == minimum)
            .map(|(&label, _)| label)
            .collect();

        match winners.as_slice() {
            [winner] => Ok(Some((*winner).clone())),
            tied => {
                debug!(?tied, score = %minimum, "classes tie for the smallest score, abstaining");
                Ok(None)
            }
        }
    }

    /// Classifies a single test object, recording the prediction on it.
    ///
    /// On a tie the object stays unclassified.
    ///
    /// # Errors
    ///
    /// Returns `KnnError::AlreadyClassified` if the object already carries a
    /// prediction, and propagates the errors of [`KnnClassifier::predict`].
    pub fn classify_object(&self, object: &mut LabeledObject<L, F>) -> Result<(), KnnError> {
        if object.is_classified() {
            return Err(KnnError::AlreadyClassified { test_index: None });
        }
        if let Some(label) = self.predict(object.descriptors.view())? {
            object
                .set_classifier_decision(label)
                .map_err(|_| KnnError::AlreadyClassified { test_index: None })?;
        }
        Ok(())
    }

    /// Classifies every object of a test set in order.
    ///
    /// Stops at the first failing object; objects before it keep their
    /// predictions. The error names the failing test object's index.
    pub fn classify_objects(&self, test_data: &mut [LabeledObject<L, F>]) -> Result<(), KnnError> {
        for (test_index, object) in test_data.iter_mut().enumerate() {
            self.classify_object(object)
                .map_err(|e| e.at_test_object(test_index))?;
            trace!(
                test_index,
                decision = ?object.decision,
                prediction = ?object.classifier_decision(),
                "classified test object"
            );
        }
        debug!(
            objects = test_data.len(),
            classified = test_data.iter().filter(|o| o.is_classified()).count(),
            k = self.k,
            "classified test set"
        );
        Ok(())
    }
}

/// Classifies every object of `test_data` against `training_data`.
///
/// Shorthand for building a [`KnnClassifier`] and calling
/// [`KnnClassifier::classify_objects`].
pub fn classify_objects<L, F, D>(
    distance: D,
    training_data: &[LabeledObject<L, F>],
    test_data: &mut [LabeledObject<L, F>],
    k: usize,
) -> Result<(), KnnError>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
    D: Distance<F>,
{
    KnnClassifier::new(k, training_data, distance)?.classify_objects(test_data)
}

/// Classifies a single test object against `training_data`.
pub fn classify_object<L, F, D>(
    distance: D,
    test_object: &mut LabeledObject<L, F>,
    training_data: &[LabeledObject<L, F>],
    k: usize,
) -> Result<(), KnnError>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
    D: Distance<F>,
{
    KnnClassifier::new(k, training_data, distance)?.classify_object(test_object)
}
