//! k-nearest-neighbor classification of decision systems.
//!
//! Objects of a test system are classified against a training system by
//! summing, per class, the `k` smallest distances under a selectable
//! [`Metric`]; the class with the smallest sum wins and ties abstain. The
//! [`evaluation`] module turns the classified test system into per-class and
//! global accuracy, coverage and true-positive-rate figures.

pub mod compare;
pub mod config;
mod error;
pub mod evaluation;
pub mod loader;
mod run;

pub use dsr_helpers::{
    CanberraDist, Distance, Float, L1Dist, L2Dist, LInfDist, LabeledObject, Metric, MetricError,
    PearsonDist,
};
pub use error::{DsrError, Result, SystemRole};
pub use k_nn::{classify_object, classify_objects, KnnClassifier, KnnError};
pub use run::{check_dimensions, classify_and_report, run, RunReport};
