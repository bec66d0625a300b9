//! The classification pipeline: load, validate, classify, aggregate.

use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;

use dsr_helpers::{Float, LabeledObject, Metric};
use k_nn::classify_objects;
use tracing::info;

use crate::config::{validate_k, RunConfig};
use crate::error::{DsrError, Result, SystemRole};
use crate::evaluation::{class_row, classes_of, global_stats, ClassRow, GlobalStats};
use crate::loader::{load_system, System};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Outcome of one run: the prediction matrix and the global statistics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct RunReport<L> {
    pub metric: Metric,
    pub k: usize,
    /// Column labels of the prediction matrix, sorted.
    pub training_classes: Vec<L>,
    /// One row per test class, sorted by class.
    pub rows: Vec<ClassRow<L>>,
    pub global: GlobalStats,
}

impl<L> RunReport<L>
where
    L: Clone + Eq + Ord + Hash + Debug,
{
    /// Aggregates an already classified test set.
    pub fn build<F: Float>(
        metric: Metric,
        k: usize,
        training: &[LabeledObject<L, F>],
        test: &[LabeledObject<L, F>],
    ) -> Self {
        let training_classes = classes_of(training);
        let rows = classes_of(test)
            .iter()
            .map(|class| class_row(class, &training_classes, test))
            .collect();
        Self {
            metric,
            k,
            training_classes,
            rows,
            global: global_stats(test),
        }
    }
}

/// Fails unless training and test objects have the same number of descriptors.
pub fn check_dimensions<L, F>(
    training: &[LabeledObject<L, F>],
    test: &[LabeledObject<L, F>],
) -> Result<()>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
{
    if let (Some(trn), Some(tst)) = (training.first(), test.first()) {
        if trn.dimension() != tst.dimension() {
            return Err(DsrError::DimensionMismatch {
                training: trn.dimension(),
                test: tst.dimension(),
            });
        }
    }
    Ok(())
}

/// Classifies `test` in place and aggregates the result.
///
/// # Errors
///
/// Fails on mismatched descriptor lengths, on a `k` outside
/// `1..=max_k_size(training)`, and when the metric is undefined for some pair.
pub fn classify_and_report<L, F>(
    metric: Metric,
    training: &[LabeledObject<L, F>],
    test: &mut [LabeledObject<L, F>],
    k: usize,
) -> Result<RunReport<L>>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
{
    check_dimensions(training, test)?;
    validate_k(k, training)?;

    info!(
        %metric,
        k,
        training = training.len(),
        test = test.len(),
        "classifying test system"
    );
    classify_objects(metric, training, test, k)?;

    let report = RunReport::build(metric, k, training, test);
    info!(
        accuracy = %report.global.accuracy,
        coverage = %report.global.coverage,
        "classification finished"
    );
    Ok(report)
}

fn load(role: SystemRole, path: &Path) -> Result<System> {
    load_system(path).map_err(|source| DsrError::Load {
        role,
        path: path.to_path_buf(),
        source,
    })
}

/// Loads both systems named by `config` and runs the classification.
pub fn run(config: &RunConfig) -> Result<RunReport<String>> {
    let training = load(SystemRole::Training, &config.training_path)?;
    let mut test = load(SystemRole::Test, &config.test_path)?;
    classify_and_report(config.metric, &training, &mut test, config.k)
}
