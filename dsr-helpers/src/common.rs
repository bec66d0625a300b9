use ndarray::Array1;
use crate::{AlreadyClassified, Float};
use std::fmt::Debug;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// A single object of a decision system: a feature vector, its true label
/// and the label the classifier assigned to it, if any.
///
/// L: The type of the label (e.g., String, i32, enum).
/// F: The float type for the descriptors (e.g., f32, f64).
///
/// The classifier decision starts out unset and can be written exactly once.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct LabeledObject<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub descriptors: Array1<F>,
    pub decision: L,
    classifier_decision: Option<L>,
}

impl<L, F> LabeledObject<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub fn new(descriptors: Array1<F>, decision: L) -> Self {
        LabeledObject {
            descriptors,
            decision,
            classifier_decision: None,
        }
    }

    /// Number of descriptors.
    pub fn dimension(&self) -> usize {
        self.descriptors.len()
    }

    pub fn classifier_decision(&self) -> Option<&L> {
        self.classifier_decision.as_ref()
    }

    pub fn is_classified(&self) -> bool {
        self.classifier_decision.is_some()
    }

    /// True when the object was classified and the prediction matches its label.
    pub fn is_correct(&self) -> bool {
        self.classifier_decision.as_ref() == Some(&self.decision)
    }

    /// Records the classifier's prediction.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClassified` if a prediction was recorded before; the
    /// existing prediction is left untouched.
    pub fn set_classifier_decision(&mut self, label: L) -> Result<(), AlreadyClassified> {
        if self.classifier_decision.is_some() {
            return Err(AlreadyClassified);
        }
        self.classifier_decision = Some(label);
        Ok(())
    }
}
