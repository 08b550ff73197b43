//! Approval: a decision-queue workflow for scored invoice approval requests.
//!
//! Pending requests are generated (or read from a file), scored once by a
//! binary classifier, and then reviewed one at a time by an operator who
//! approves, rejects, or flags each request for manual review.
//!
//! # Core Principles
//!
//! - **Sequential**: Items are decided strictly in batch order
//! - **Exactly once**: Every item gets one decision, never more
//! - **Resumable**: A queue is rebuilt from its items and decisions alone
//! - **Append-only results**: A finished review never overwrites an earlier one
//!
//! # Example
//!
//! ```no_run
//! use approval::queue::{Action, Current};
//! use approval::scoring::ApprovalModel;
//! use approval::sink::{FileResultSink, ResultSink};
//! use approval::{Batch, PortalConfig, RequestGenerator};
//!
//! let config = PortalConfig::default();
//! let model = ApprovalModel::load(&config.model_path).unwrap();
//!
//! let mut batch = Batch::generate(&mut RequestGenerator::new(), config.batch_size).unwrap();
//! batch.score(&model, &config.band).unwrap();
//!
//! let queue = batch.queue_mut().unwrap();
//! while let Current::Item(item) = queue.current() {
//!     let id = item.id().to_string();
//!     queue.decide(&id, Action::Approved).unwrap();
//! }
//!
//! let path = FileResultSink::new(&config.results_dir).persist(queue).unwrap();
//! println!("Results saved to {}", path.display());
//! ```

pub mod config;
pub mod error;
pub mod queue;
pub mod request;
pub mod scoring;
pub mod sink;

mod batch;

pub use batch::Batch;
pub use config::PortalConfig;
pub use error::{ApprovalError, Result};
pub use queue::{Action, Current, Decision, DecisionQueue, Item, Recommendation, Suggestion, Summary};
pub use request::{Request, RequestGenerator};
pub use scoring::{ApprovalModel, MockScorer, Prediction, Scorer};
