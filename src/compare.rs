//! Side-by-side comparison of every metric on the same systems.

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::Hash;

use dsr_helpers::{Float, LabeledObject, Metric};
use k_nn::classify_objects;
use tracing::{info, warn};

use crate::config::validate_k;
use crate::error::Result;
use crate::evaluation::{class_stats, classes_of, global_stats, transform_last_column_to_row, Rate};
use crate::run::check_dimensions;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Which per-class statistic the comparison tabulates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
pub enum Statistic {
    #[default]
    Accuracy,
    Coverage,
}

impl Display for Statistic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Accuracy => f.write_str("accuracy"),
            Statistic::Coverage => f.write_str("coverage"),
        }
    }
}

/// A comparison table cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
pub enum Cell {
    Rate(Rate),
    /// The metric could not classify the test system.
    Failed,
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Rate(rate) => Display::fmt(rate, f),
            Cell::Failed => f.write_str("failed"),
        }
    }
}

/// A metric whose classification run failed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct MetricFailure {
    pub metric: Metric,
    pub reason: String,
}

/// A class-by-metric table with a total row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct MetricComparison<L> {
    pub statistic: Statistic,
    pub k: usize,
    /// Column labels.
    pub metrics: Vec<Metric>,
    /// Row labels, the sorted test classes.
    pub classes: Vec<L>,
    /// `rows[c][m]` is the statistic of class `c` under metric `m`.
    pub rows: Vec<Vec<Cell>>,
    /// `total[m]` is the statistic over the whole test set under metric `m`.
    pub total: Vec<Cell>,
    pub failures: Vec<MetricFailure>,
}

/// `error` followed by each of its causes, separated by `: `.
fn error_chain(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn pick(statistic: Statistic, accuracy: Rate, coverage: Rate) -> Cell {
    match statistic {
        Statistic::Accuracy => Cell::Rate(accuracy),
        Statistic::Coverage => Cell::Rate(coverage),
    }
}

/// Classifies a fresh copy of `test` with every metric and tabulates
/// `statistic` per test class and over the whole set.
///
/// A metric that fails is recorded in `failures` and its column is filled
/// with [`Cell::Failed`]; the remaining metrics still run. Predictions
/// already present on `test` are ignored.
///
/// # Errors
///
/// Fails on mismatched descriptor lengths and on a `k` outside
/// `1..=max_k_size(training)`.
pub fn compare_metrics<L, F>(
    training: &[LabeledObject<L, F>],
    test: &[LabeledObject<L, F>],
    k: usize,
    statistic: Statistic,
) -> Result<MetricComparison<L>>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
{
    check_dimensions(training, test)?;
    validate_k(k, training)?;

    let classes = classes_of(test);
    let mut failures = Vec::new();

    // One row per metric: the statistic for every class, then the global value.
    let mut by_metric = Vec::with_capacity(Metric::ALL.len());
    for metric in Metric::ALL {
        let mut fresh: Vec<LabeledObject<L, F>> = test
            .iter()
            .map(|object| LabeledObject::new(object.descriptors.clone(), object.decision.clone()))
            .collect();

        let row = match classify_objects(metric, training, &mut fresh, k) {
            Ok(()) => {
                let mut row: Vec<Cell> = classes
                    .iter()
                    .map(|class| {
                        let stats = class_stats(class, &fresh);
                        pick(statistic, stats.accuracy, stats.coverage)
                    })
                    .collect();
                let global = global_stats(&fresh);
                row.push(pick(statistic, global.accuracy, global.coverage));
                row
            }
            Err(e) => {
                let reason = error_chain(&e);
                warn!(%metric, error = %reason, "metric failed on this data");
                failures.push(MetricFailure { metric, reason });
                vec![Cell::Failed; classes.len() + 1]
            }
        };
        by_metric.push(row);
    }

    // The global column becomes the total row; the remaining rows are read
    // column-wise so that classes run down and metrics run across.
    let mut reshaped = transform_last_column_to_row(by_metric)?;
    let total = reshaped.pop().unwrap_or_default();
    let rows = (0..classes.len())
        .map(|class_index| reshaped.iter().map(|metric_row| metric_row[class_index]).collect())
        .collect();

    info!(
        %statistic,
        k,
        failed = failures.len(),
        "compared metrics"
    );
    Ok(MetricComparison {
        statistic,
        k,
        metrics: Metric::ALL.to_vec(),
        classes,
        rows,
        total,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DsrError;
    use ndarray::array;

    fn training() -> Vec<LabeledObject<&'static str, f64>> {
        vec![
            LabeledObject::new(array![1.0, 2.0, 4.0], "A"),
            LabeledObject::new(array![1.5, 2.5, 3.5], "A"),
            LabeledObject::new(array![9.0, 7.0, 8.0], "B"),
            LabeledObject::new(array![8.5, 7.5, 9.0], "B"),
        ]
    }

    #[test]
    fn every_metric_gets_a_column() {
        let test = vec![
            LabeledObject::new(array![1.2, 2.2, 3.8], "A"),
            LabeledObject::new(array![8.8, 7.2, 8.4], "B"),
        ];

        let comparison = compare_metrics(&training(), &test, 1, Statistic::Coverage).unwrap();

        assert_eq!(comparison.metrics, Metric::ALL.to_vec());
        assert_eq!(comparison.classes, vec!["A", "B"]);
        assert_eq!(comparison.rows.len(), 2);
        assert!(comparison.rows.iter().all(|row| row.len() == Metric::ALL.len()));
        assert_eq!(comparison.total.len(), Metric::ALL.len());
        assert!(comparison.failures.is_empty());
        // The distance-based metrics separate the two clusters.
        for column in 1..=3 {
            assert_eq!(comparison.total[column], Cell::Rate(Rate::Value(1.0)));
            assert_eq!(comparison.rows[0][column], Cell::Rate(Rate::Value(1.0)));
        }
        // The input test set is left untouched.
        assert!(test.iter().all(|object| !object.is_classified()));
    }

    #[test]
    fn failing_metric_fills_its_column() {
        let training = vec![
            LabeledObject::new(array![1.0, 2.0], "A"),
            LabeledObject::new(array![3.0, 3.0], "B"),
        ];
        let test = vec![LabeledObject::new(array![1.0, 1.5], "A")];

        let comparison = compare_metrics(&training, &test, 1, Statistic::Accuracy).unwrap();

        let pearson = Metric::ALL.iter().position(|&m| m == Metric::Pearson).unwrap();
        assert_eq!(comparison.rows[0][pearson], Cell::Failed);
        assert_eq!(comparison.total[pearson], Cell::Failed);
        assert_eq!(comparison.failures.len(), 1);
        assert_eq!(comparison.failures[0].metric, Metric::Pearson);
        assert_eq!(
            comparison.failures[0].reason,
            "cannot measure the distance between test object 0 and training object 1: \
             Pearson dissimilarity is undefined: left vector has zero standard deviation"
        );

        let euclidean = Metric::ALL.iter().position(|&m| m == Metric::Euclidean).unwrap();
        assert_eq!(comparison.total[euclidean], Cell::Rate(Rate::Value(1.0)));
    }

    #[test]
    fn validates_k_before_running() {
        let test = vec![LabeledObject::new(array![1.0, 2.0, 3.0], "A")];
        assert!(matches!(
            compare_metrics(&training(), &test, 0, Statistic::Accuracy),
            Err(DsrError::Config(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn comparison_survives_json() {
        let training = vec![
            LabeledObject::new(array![1.0, 1.0], "A".to_string()),
            LabeledObject::new(array![3.0, 3.0], "B".to_string()),
        ];
        let test = vec![
            LabeledObject::new(array![1.0, 1.2], "A".to_string()),
            LabeledObject::new(array![2.0, 2.0], "C".to_string()),
        ];

        let comparison = compare_metrics(&training, &test, 1, Statistic::Accuracy).unwrap();
        let json = serde_json::to_string(&comparison).unwrap();

        assert!(json.contains(r#""failed""#));
        // Constant training vectors fail Pearson; the C object ties under Euclidean,
        // so nothing of class C is grabbed and its accuracy is unavailable.
        assert!(json.contains(r#"{"rate":null}"#));
        let restored: MetricComparison<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, comparison);
    }
}
