//! Scoring: the classifier seam that annotates pending requests.
//!
//! A [`Scorer`] turns a feature vector into a [`Prediction`]. Scoring a batch
//! with [`annotate`] produces the [`Item`](crate::queue::Item)s that enter the
//! decision queue.
//!
//! The built-in [`ApprovalModel`] is a logistic-regression classifier trained
//! offline by [`train`] and stored as JSON.

mod mock;
mod model;
mod scorer;
mod train;

pub use mock::MockScorer;
pub use model::{ApprovalModel, MODEL_FORMAT_VERSION};
pub use scorer::{annotate, Prediction, Scorer};
pub use train::{
    synthetic_samples, train, ClassMetrics, ClassificationReport, Sample, TrainingConfig,
    TrainingOutcome,
};
