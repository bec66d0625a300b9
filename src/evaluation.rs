//! Classification quality statistics over a classified test set.
//!
//! Every ratio is a [`Rate`]; a ratio whose denominator is zero is
//! [`Rate::Unavailable`] rather than a division failure.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::Hash;

use dsr_helpers::{Float, LabeledObject};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// A ratio that may be unavailable because nothing was counted.
///
/// `Display` forwards formatting options to the value, so `{:.3}` rounds it;
/// `Unavailable` always prints as `n/a`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", untagged)
)]
pub enum Rate {
    Value(f64),
    Unavailable,
}

impl Rate {
    /// `numerator / denominator`, or `Unavailable` when the denominator is zero.
    pub fn ratio(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            Rate::Unavailable
        } else {
            Rate::Value(numerator as f64 / denominator as f64)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Rate::Value(value) => Some(*value),
            Rate::Unavailable => None,
        }
    }
}

impl Display for Rate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Rate::Value(value) => Display::fmt(value, f),
            Rate::Unavailable => f.write_str("n/a"),
        }
    }
}

/// Summary of how the objects of one true class were classified.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct ClassStats {
    /// Objects whose true label is the class.
    pub class_length: usize,
    /// Objects of the class that received a prediction.
    pub grabbed: usize,
    /// Objects of the class predicted as the class.
    pub correct: usize,
    /// Objects of other classes predicted as the class.
    pub wrong: usize,
    /// `correct / grabbed`
    pub accuracy: Rate,
    /// `grabbed / class_length`
    pub coverage: Rate,
    /// `correct / (correct + wrong)`
    pub true_positive_rate: Rate,
}

/// One row of the prediction matrix: how the objects of `class` were
/// distributed over the training classes, plus their statistics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct ClassRow<L> {
    pub class: L,
    /// `counts[i]` objects were predicted as the i-th training class.
    pub counts: Vec<usize>,
    pub stats: ClassStats,
}

/// Accuracy and coverage over a whole test set.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct GlobalStats {
    pub objects: usize,
    pub grabbed: usize,
    pub correct: usize,
    pub accuracy: Rate,
    pub coverage: Rate,
}

/// Number of objects per label, in label order.
pub fn class_counts<L, F>(system: &[LabeledObject<L, F>]) -> BTreeMap<&L, usize>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
{
    let mut counts = BTreeMap::new();
    for object in system {
        *counts.entry(&object.decision).or_insert(0) += 1;
    }
    counts
}

/// The largest usable k: the population of the smallest training class.
///
/// `None` for an empty training set.
pub fn max_k_size<L, F>(training: &[LabeledObject<L, F>]) -> Option<usize>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
{
    class_counts(training).into_values().min()
}

/// The distinct labels of a system, sorted.
pub fn classes_of<L, F>(system: &[LabeledObject<L, F>]) -> Vec<L>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
{
    system
        .iter()
        .map(|object| &object.decision)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

/// Builds the prediction-matrix row for the objects whose true label is `test_class`.
pub fn class_row<L, F>(
    test_class: &L,
    training_classes: &[L],
    test_set: &[LabeledObject<L, F>],
) -> ClassRow<L>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
{
    let counts = training_classes
        .iter()
        .map(|training_class| {
            test_set
                .iter()
                .filter(|object| &object.decision == test_class)
                .filter(|object| object.classifier_decision() == Some(training_class))
                .count()
        })
        .collect();

    ClassRow {
        class: test_class.clone(),
        counts,
        stats: class_stats(test_class, test_set),
    }
}

/// Computes the statistics of `test_class` over a classified test set.
///
/// Objects of the class are selected by their true label; `wrong` counts
/// the objects of every other class that were predicted as `test_class`.
pub fn class_stats<L, F>(test_class: &L, test_set: &[LabeledObject<L, F>]) -> ClassStats
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
{
    let mut class_length = 0;
    let mut grabbed = 0;
    let mut correct = 0;
    let mut wrong = 0;

    for object in test_set {
        if &object.decision == test_class {
            class_length += 1;
            if object.is_classified() {
                grabbed += 1;
            }
            if object.is_correct() {
                correct += 1;
            }
        } else if object.classifier_decision() == Some(test_class) {
            wrong += 1;
        }
    }

    ClassStats {
        class_length,
        grabbed,
        correct,
        wrong,
        accuracy: Rate::ratio(correct, grabbed),
        coverage: Rate::ratio(grabbed, class_length),
        true_positive_rate: Rate::ratio(correct, correct + wrong),
    }
}

/// Accuracy and coverage over the whole test set.
pub fn global_stats<L, F>(test_set: &[LabeledObject<L, F>]) -> GlobalStats
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
{
    let grabbed = test_set.iter().filter(|object| object.is_classified()).count();
    let correct = test_set.iter().filter(|object| object.is_correct()).count();

    GlobalStats {
        objects: test_set.len(),
        grabbed,
        correct,
        accuracy: Rate::ratio(correct, grabbed),
        coverage: Rate::ratio(grabbed, test_set.len()),
    }
}

/// A matrix whose rows differ in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("row {row} has {found} columns, expected {expected}")]
pub struct RaggedMatrix {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

/// Removes the last column of every row and appends those values as a new
/// final row.
///
/// # Errors
///
/// Fails when the rows do not all have the same length.
pub fn transform_last_column_to_row<T>(mut matrix: Vec<Vec<T>>) -> Result<Vec<Vec<T>>, RaggedMatrix> {
    if let Some(expected) = matrix.first().map(Vec::len) {
        let ragged = matrix.iter().map(Vec::len).enumerate().find(|&(_, found)| found != expected);
        if let Some((row, found)) = ragged {
            return Err(RaggedMatrix { row, expected, found });
        }
    }

    let column: Vec<T> = matrix.iter_mut().filter_map(Vec::pop).collect();
    matrix.push(column);
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use proptest::prelude::*;

    type Object = LabeledObject<&'static str, f64>;

    fn object(decision: &'static str, prediction: Option<&'static str>) -> Object {
        let mut object = LabeledObject::new(array![0.0], decision);
        if let Some(label) = prediction {
            object.set_classifier_decision(label).unwrap();
        }
        object
    }

    fn classified_test_set() -> Vec<Object> {
        vec![
            object("A", Some("A")),
            object("A", Some("A")),
            object("A", Some("B")),
            object("A", None),
            object("B", Some("B")),
            object("B", Some("A")),
            object("C", None),
        ]
    }

    #[test]
    fn max_k_size_is_smallest_class() {
        let mut training = Vec::new();
        for _ in 0..3 {
            training.push(object("A", None));
        }
        for _ in 0..5 {
            training.push(object("B", None));
        }
        assert_eq!(max_k_size(&training), Some(3));
        assert_eq!(max_k_size::<&str, f64>(&[]), None);
    }

    #[test]
    fn classes_are_sorted_and_distinct() {
        let system = vec![
            object("b", None),
            object("a", None),
            object("c", None),
            object("a", None),
        ];
        assert_eq!(classes_of(&system), vec!["a", "b", "c"]);
    }

    #[test]
    fn class_stats_counts() {
        let test_set = classified_test_set();
        let stats = class_stats(&"A", &test_set);

        assert_eq!(stats.class_length, 4);
        assert_eq!(stats.grabbed, 3);
        assert_eq!(stats.correct, 2);
        assert_eq!(stats.wrong, 1);
        assert_abs_diff_eq!(stats.accuracy.value().unwrap(), 2.0 / 3.0);
        assert_abs_diff_eq!(stats.coverage.value().unwrap(), 0.75);
        assert_abs_diff_eq!(stats.true_positive_rate.value().unwrap(), 2.0 / 3.0);
    }

    #[test]
    fn unclassified_class_has_no_accuracy() {
        let test_set = classified_test_set();
        let stats = class_stats(&"C", &test_set);

        assert_eq!(stats.class_length, 1);
        assert_eq!(stats.accuracy, Rate::Unavailable);
        assert_eq!(stats.coverage, Rate::Value(0.0));
        assert_eq!(stats.true_positive_rate, Rate::Unavailable);
    }

    #[test]
    fn absent_class_has_no_rates() {
        let stats = class_stats(&"Z", &classified_test_set());
        assert_eq!(stats.class_length, 0);
        assert_eq!(stats.accuracy, Rate::Unavailable);
        assert_eq!(stats.coverage, Rate::Unavailable);
        assert_eq!(stats.true_positive_rate, Rate::Unavailable);
    }

    #[test]
    fn class_row_distributes_predictions() {
        let test_set = classified_test_set();
        let training_classes = ["A", "B"];

        let row = class_row(&"A", &training_classes, &test_set);
        assert_eq!(row.class, "A");
        assert_eq!(row.counts, vec![2, 1]);
        assert_eq!(row.stats, class_stats(&"A", &test_set));

        let row = class_row(&"B", &training_classes, &test_set);
        assert_eq!(row.counts, vec![1, 1]);
        assert_eq!(row.stats.accuracy, Rate::Value(0.5));
    }

    #[test]
    fn global_stats_over_whole_set() {
        let stats = global_stats(&classified_test_set());
        assert_eq!(stats.objects, 7);
        assert_eq!(stats.grabbed, 5);
        assert_eq!(stats.correct, 3);
        assert_abs_diff_eq!(stats.accuracy.value().unwrap(), 0.6);
        assert_abs_diff_eq!(stats.coverage.value().unwrap(), 5.0 / 7.0);
    }

    #[test]
    fn global_coverage_is_one_when_everything_is_grabbed() {
        let test_set = vec![
            object("A", Some("A")),
            object("B", Some("A")),
            object("B", Some("B")),
        ];
        let stats = global_stats(&test_set);
        assert_eq!(stats.coverage, Rate::Value(1.0));
    }

    #[test]
    fn global_stats_without_predictions() {
        let stats = global_stats(&[object("A", None)]);
        assert_eq!(stats.accuracy, Rate::Unavailable);
        assert_eq!(stats.coverage, Rate::Value(0.0));

        let empty: [Object; 0] = [];
        assert_eq!(global_stats(&empty).coverage, Rate::Unavailable);
    }

    #[test]
    fn last_column_becomes_last_row() {
        let matrix = vec![vec![1, 2, 9], vec![3, 4, 10]];
        assert_eq!(
            transform_last_column_to_row(matrix).unwrap(),
            vec![vec![1, 2], vec![3, 4], vec![9, 10]]
        );
    }

    #[test]
    fn transform_edge_cases() {
        let empty: Vec<Vec<i32>> = vec![];
        assert_eq!(transform_last_column_to_row(empty).unwrap(), vec![Vec::<i32>::new()]);

        let single_column = vec![vec![7], vec![8]];
        assert_eq!(
            transform_last_column_to_row(single_column).unwrap(),
            vec![vec![], vec![], vec![7, 8]]
        );
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let ragged = vec![vec![1, 2], vec![], vec![3, 4]];
        let err = transform_last_column_to_row(ragged).unwrap_err();
        assert_eq!(
            err,
            RaggedMatrix {
                row: 1,
                expected: 2,
                found: 0
            }
        );
        assert_eq!(err.to_string(), "row 1 has 0 columns, expected 2");
    }

    #[test]
    fn rate_display() {
        assert_eq!(format!("{:.3}", Rate::Value(2.0 / 3.0)), "0.667");
        assert_eq!(format!("{}", Rate::Unavailable), "n/a");
        assert_eq!(format!("{:.3}", Rate::Unavailable), "n/a");
    }

    proptest! {
        #[test]
        fn prop_row_counts_add_up_to_grabbed(
            labels in proptest::collection::vec((0usize..3, proptest::option::of(0usize..3)), 1..40)
        ) {
            const NAMES: [&str; 3] = ["A", "B", "C"];
            let test_set: Vec<Object> = labels
                .iter()
                .map(|&(truth, prediction)| object(NAMES[truth], prediction.map(|p| NAMES[p])))
                .collect();

            let mut grabbed = 0;
            for class in classes_of(&test_set) {
                let row = class_row(&class, &NAMES, &test_set);
                prop_assert_eq!(row.counts.iter().sum::<usize>(), row.stats.grabbed);
                prop_assert!(row.stats.correct <= row.stats.grabbed);
                if let Some(coverage) = row.stats.coverage.value() {
                    prop_assert!((0.0..=1.0).contains(&coverage));
                }
                grabbed += row.stats.grabbed;
            }
            prop_assert_eq!(grabbed, global_stats(&test_set).grabbed);
        }
    }
}
