//! Distance measures between descriptor vectors.
//!
//! Every measure is a unit struct implementing [`Distance`]; [`Metric`] is the
//! closed set of measures a run can select from. Inputs the formulas are
//! undefined on are reported as [`MetricError`] rather than producing NaN.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ndarray::ArrayView1;

use crate::error::ParseMetricError;
use crate::{Float, MetricError, Side};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// A dissimilarity between two descriptor vectors of equal length.
pub trait Distance<F: Float> {
    /// Computes the distance between `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns a `MetricError` when the vectors differ in length, are empty,
    /// or fall outside the measure's domain.
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> Result<F, MetricError>;
}

fn check_shapes<F: Float>(a: &ArrayView1<F>, b: &ArrayView1<F>) -> Result<(), MetricError> {
    if a.len() != b.len() {
        return Err(MetricError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(MetricError::EmptyVectors);
    }
    Ok(())
}

/// Canberra distance, `sqrt(sum |(x - y) / (x + y)|)`.
///
/// Undefined when any pair sums to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanberraDist;

impl<F: Float> Distance<F> for CanberraDist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> Result<F, MetricError> {
        check_shapes(&a, &b)?;
        let mut sum = F::zero();
        for (index, (&x, &y)) in a.iter().zip(b.iter()).enumerate() {
            let denominator = x + y;
            if denominator == F::zero() {
                return Err(MetricError::ZeroDenominator { index });
            }
            sum += ((x - y) / denominator).abs();
        }
        Ok(sum.sqrt())
    }
}

/// Chebyshev distance, the largest coordinate difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LInfDist;

impl<F: Float> Distance<F> for LInfDist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> Result<F, MetricError> {
        check_shapes(&a, &b)?;
        Ok(a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y).abs())
            .fold(F::zero(), F::max))
    }
}

/// Euclidean distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L2Dist;

impl<F: Float> Distance<F> for L2Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> Result<F, MetricError> {
        check_shapes(&a, &b)?;
        let squared: F = a
            .iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y) * (x - y))
            .sum();
        Ok(squared.sqrt())
    }
}

/// Manhattan (city block) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L1Dist;

impl<F: Float> Distance<F> for L1Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> Result<F, MetricError> {
        check_shapes(&a, &b)?;
        Ok(a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).abs()).sum())
    }
}

/// Pearson dissimilarity, `1 - |r|` where `r` is the correlation coefficient
/// computed with population standard deviations.
///
/// The result lies in `[0, 1]`. Undefined when either vector is constant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PearsonDist;

impl<F: Float> Distance<F> for PearsonDist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> Result<F, MetricError> {
        check_shapes(&a, &b)?;
        // check_shapes rejected empty input, so the means exist.
        let (Some(a_mean), Some(b_mean)) = (a.mean(), b.mean()) else {
            return Err(MetricError::EmptyVectors);
        };
        let a_std = a.std(F::zero());
        let b_std = b.std(F::zero());
        if a_std == F::zero() {
            return Err(MetricError::ZeroVariance { side: Side::Left });
        }
        if b_std == F::zero() {
            return Err(MetricError::ZeroVariance { side: Side::Right });
        }

        let a_scores = (&a - a_mean) / a_std;
        let b_scores = (&b - b_mean) / b_std;
        let n = F::from(a.len()).ok_or(MetricError::EmptyVectors)?;
        let correlation = (a_scores * b_scores).sum() / n;

        // |r| may exceed 1 by a rounding error.
        Ok((F::one() - correlation.abs()).max(F::zero()))
    }
}

/// The distance measures a classification run can use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
pub enum Metric {
    #[default]
    Canberra,
    Chebyshev,
    Euclidean,
    Manhattan,
    Pearson,
}

impl Metric {
    /// Every metric, in display order.
    pub const ALL: [Metric; 5] = [
        Metric::Canberra,
        Metric::Chebyshev,
        Metric::Euclidean,
        Metric::Manhattan,
        Metric::Pearson,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Canberra => "Canberra",
            Metric::Chebyshev => "Chebyshev",
            Metric::Euclidean => "Euclidean",
            Metric::Manhattan => "Manhattan",
            Metric::Pearson => "Pearson",
        }
    }
}

impl<F: Float> Distance<F> for Metric {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> Result<F, MetricError> {
        match self {
            Metric::Canberra => CanberraDist.distance(a, b),
            Metric::Chebyshev => LInfDist.distance(a, b),
            Metric::Euclidean => L2Dist.distance(a, b),
            Metric::Manhattan => L1Dist.distance(a, b),
            Metric::Pearson => PearsonDist.distance(a, b),
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseMetricError(s.to_string()))
    }
}
