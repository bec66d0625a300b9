//! Run configuration.

use std::fmt::Debug;
use std::hash::Hash;
use std::path::PathBuf;

use dsr_helpers::{Float, LabeledObject, Metric};
use thiserror::Error;

use crate::evaluation::max_k_size;

/// Invalid run parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("k must be at least 1")]
    ZeroK,
    #[error("k = {k} exceeds the smallest training class ({max} objects)")]
    KTooLarge { k: usize, max: usize },
    #[error("the training system is empty")]
    EmptyTrainingSet,
}

/// Everything one classification run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub training_path: PathBuf,
    pub test_path: PathBuf,
    pub metric: Metric,
    pub k: usize,
}

impl RunConfig {
    pub fn new(
        training_path: impl Into<PathBuf>,
        test_path: impl Into<PathBuf>,
        metric: Metric,
        k: usize,
    ) -> Self {
        Self {
            training_path: training_path.into(),
            test_path: test_path.into(),
            metric,
            k,
        }
    }
}

/// Checks `1 <= k <= max_k_size(training)` and returns the upper bound.
pub fn validate_k<L, F>(k: usize, training: &[LabeledObject<L, F>]) -> Result<usize, ConfigError>
where
    L: Clone + Eq + Ord + Hash + Debug,
    F: Float,
{
    if k == 0 {
        return Err(ConfigError::ZeroK);
    }
    let max = max_k_size(training).ok_or(ConfigError::EmptyTrainingSet)?;
    if k > max {
        return Err(ConfigError::KTooLarge { k, max });
    }
    Ok(max)
}
