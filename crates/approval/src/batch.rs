//! One review batch: pending requests, scored exactly once, then reviewed.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{ApprovalError, Result};
use crate::queue::{AmbiguityBand, DecisionQueue, Item};
use crate::request::{Request, RequestGenerator};
use crate::scoring::{annotate, Scorer};

/// A batch of requests moving from pending to scored to reviewed.
///
/// Scoring happens at most once: once a batch has a queue, further
/// [`Batch::score`] calls return the existing items without consulting the
/// scorer, so operator-visible recommendations never change under review.
#[derive(Debug, Clone)]
pub struct Batch {
    requests: Vec<Request>,
    queue: Option<DecisionQueue>,
    created_at: DateTime<Utc>,
}

impl Batch {
    /// Create a pending batch from requests with unique ids.
    pub fn new(requests: Vec<Request>) -> Result<Self> {
        if requests.is_empty() {
            return Err(ApprovalError::InvalidBatch(
                "A batch needs at least one request".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(requests.len());
        for request in &requests {
            if !seen.insert(request.id.as_str()) {
                return Err(ApprovalError::InvalidBatch(format!(
                    "Duplicate request id '{}'",
                    request.id
                )));
            }
        }

        Ok(Self {
            requests,
            queue: None,
            created_at: Utc::now(),
        })
    }

    /// Generate a fresh pending batch.
    pub fn generate(generator: &mut RequestGenerator, count: usize) -> Result<Self> {
        Self::new(generator.generate(count)?)
    }

    /// Wrap a queue restored from a snapshot.
    pub fn from_queue(queue: DecisionQueue) -> Self {
        let requests = queue
            .items()
            .iter()
            .map(|item| Request::new(item.id(), item.features().clone()))
            .collect();

        Self {
            requests,
            queue: Some(queue),
            created_at: Utc::now(),
        }
    }

    /// The pending requests, in processing order.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_scored(&self) -> bool {
        self.queue.is_some()
    }

    /// Score the batch and open its decision queue. Idempotent.
    pub fn score(&mut self, scorer: &dyn Scorer, band: &AmbiguityBand) -> Result<&[Item]> {
        if self.queue.is_none() {
            let items = annotate(self.requests.clone(), scorer, band)?;
            let queue = DecisionQueue::with_band(items, *band)?;
            info!(scorer = scorer.name(), items = queue.len(), "scored batch");
            self.queue = Some(queue);
        } else {
            debug!("batch already scored, keeping existing annotations");
        }

        Ok(self.queue()?.items())
    }

    /// The decision queue, once scored.
    pub fn queue(&self) -> Result<&DecisionQueue> {
        self.queue.as_ref().ok_or_else(not_scored)
    }

    /// Mutable access to the decision queue, once scored.
    pub fn queue_mut(&mut self) -> Result<&mut DecisionQueue> {
        self.queue.as_mut().ok_or_else(not_scored)
    }
}

fn not_scored() -> ApprovalError {
    ApprovalError::InvalidBatch("Batch has not been scored yet".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Action;
    use crate::request::Features;
    use crate::scoring::{MockScorer, Prediction};

    #[test]
    fn test_score_once() {
        let mut generator = RequestGenerator::with_seed(5);
        let mut batch = Batch::generate(&mut generator, 4).unwrap();
        let scorer = MockScorer::constant(Prediction::from_probability(0.8));

        assert!(!batch.is_scored());
        let first = batch.score(&scorer, &AmbiguityBand::default()).unwrap().to_vec();
        let second = batch.score(&scorer, &AmbiguityBand::default()).unwrap().to_vec();

        assert_eq!(first, second);
        assert_eq!(scorer.calls(), 4);
        assert!(batch.is_scored());
    }

    #[test]
    fn test_rescoring_keeps_decisions() {
        let mut batch = Batch::new(vec![
            Request::new("A", Features::new()),
            Request::new("B", Features::new()),
        ])
        .unwrap();
        let scorer = MockScorer::default();
        batch.score(&scorer, &AmbiguityBand::default()).unwrap();
        batch.queue_mut().unwrap().decide("A", Action::Approved).unwrap();

        batch.score(&scorer, &AmbiguityBand::default()).unwrap();
        assert_eq!(batch.queue().unwrap().cursor(), 1);
    }

    #[test]
    fn test_queue_requires_scoring() {
        let batch = Batch::new(vec![Request::new("A", Features::new())]).unwrap();
        assert!(matches!(batch.queue(), Err(ApprovalError::InvalidBatch(_))));
    }

    #[test]
    fn test_duplicate_requests_rejected() {
        let result = Batch::new(vec![
            Request::new("A", Features::new()),
            Request::new("A", Features::new()),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_queue_restores_requests() {
        let mut batch = Batch::new(vec![Request::new("A", Features::new())]).unwrap();
        batch.score(&MockScorer::default(), &AmbiguityBand::default()).unwrap();
        let queue = batch.queue().unwrap().clone();

        let restored = Batch::from_queue(queue);
        assert!(restored.is_scored());
        assert_eq!(restored.requests(), batch.requests());
    }
}
