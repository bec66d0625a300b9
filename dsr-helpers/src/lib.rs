use ndarray::{NdFloat, ScalarOperand};
use num_traits::FromPrimitive;

use std::iter::Sum;

// Include submodules
mod common;
mod distance;
mod error;

// Re-export types from submodules
pub use common::LabeledObject;
pub use distance::{CanberraDist, Distance, L1Dist, L2Dist, LInfDist, Metric, PearsonDist};
pub use error::{AlreadyClassified, MetricError, ParseMetricError, Side};

/// Scalar type of descriptor vectors and distances.
///
/// `FromPrimitive` backs ndarray's `mean`/`std`, `Sum` the per-class score sums.
pub trait Float: NdFloat + FromPrimitive + Default + Sum + ScalarOperand {}

impl Float for f32 {}

impl Float for f64 {}
