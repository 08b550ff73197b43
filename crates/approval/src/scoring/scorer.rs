//! Scorer trait and batch annotation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApprovalError, Result};
use crate::queue::{AmbiguityBand, Item, Suggestion};
use crate::request::{Features, Request};

/// A classifier verdict for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class.
    pub label: Suggestion,

    /// Probability of approval as a percentage (0.0-100.0).
    pub confidence: f64,
}

impl Prediction {
    /// Build a prediction from an approval probability in [0, 1].
    ///
    /// Confidence is rounded to one decimal place. An even split goes to
    /// `Reject`, matching an argmax over `[reject, approve]`.
    pub fn from_probability(probability: f64) -> Self {
        let label = if probability > 0.5 {
            Suggestion::Approve
        } else {
            Suggestion::Reject
        };
        Self {
            label,
            confidence: (probability * 1000.0).round() / 10.0,
        }
    }
}

/// A binary approve/reject classifier.
pub trait Scorer: Send + Sync {
    /// Get the scorer name (for display and logging).
    fn name(&self) -> &str;

    /// Score one feature vector.
    fn predict(&self, features: &Features) -> Result<Prediction>;
}

/// Score a batch of requests, in order, producing queue items.
pub fn annotate(
    requests: Vec<Request>,
    scorer: &dyn Scorer,
    band: &AmbiguityBand,
) -> Result<Vec<Item>> {
    if requests.is_empty() {
        return Err(ApprovalError::InvalidBatch(
            "Cannot score an empty batch".to_string(),
        ));
    }

    let count = requests.len();
    let items = requests
        .into_iter()
        .map(|request| {
            let prediction = scorer.predict(&request.features)?;
            if !prediction.confidence.is_finite()
                || !(0.0..=100.0).contains(&prediction.confidence)
            {
                return Err(ApprovalError::Model(format!(
                    "Scorer '{}' returned confidence {} for '{}'",
                    scorer.name(),
                    prediction.confidence,
                    request.id
                )));
            }
            Ok(Item::annotate(
                request,
                prediction.label,
                prediction.confidence,
                band,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(scorer = scorer.name(), count, "annotated batch");
    Ok(items)
}
