//! Mock scorer for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{ApprovalError, Result};
use crate::request::Features;

use super::scorer::{Prediction, Scorer};

/// Scorer that returns predictable verdicts for testing.
///
/// A scripted mock hands out its predictions in call order, wrapping around
/// when it runs out.
pub struct MockScorer {
    predictions: Vec<Prediction>,
    calls: AtomicUsize,
}

impl MockScorer {
    /// Always return the same prediction.
    pub fn constant(prediction: Prediction) -> Self {
        Self::scripted(vec![prediction])
    }

    /// Return the given predictions in call order.
    pub fn scripted(predictions: Vec<Prediction>) -> Self {
        Self {
            predictions,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `predict` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockScorer {
    fn default() -> Self {
        Self::constant(Prediction::from_probability(0.8))
    }
}

impl Scorer for MockScorer {
    fn name(&self) -> &str {
        "mock"
    }

    fn predict(&self, _features: &Features) -> Result<Prediction> {
        if self.predictions.is_empty() {
            return Err(ApprovalError::Model(
                "Mock scorer has no scripted predictions".to_string(),
            ));
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.predictions[call % self.predictions.len()])
    }
}
