use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Which argument of a metric call an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Inputs on which a distance metric is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricError {
    /// The two descriptor vectors have different lengths
    #[error("descriptor vectors differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
    /// Both descriptor vectors are empty
    #[error("cannot measure the distance between empty descriptor vectors")]
    EmptyVectors,
    /// Canberra term with `x + y == 0`
    #[error("Canberra term at index {index} has a zero denominator (x + y == 0)")]
    ZeroDenominator { index: usize },
    /// Pearson dissimilarity on a constant vector
    #[error("Pearson dissimilarity is undefined: {side} vector has zero standard deviation")]
    ZeroVariance { side: Side },
}

/// Returned when a second prediction is written to an already classified object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("object already carries a classifier decision")]
pub struct AlreadyClassified;

/// A metric name that does not match any known metric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric '{0}' (expected one of: Canberra, Chebyshev, Euclidean, Manhattan, Pearson)")]
pub struct ParseMetricError(pub String);
