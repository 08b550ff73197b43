//! Application state for the review server.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use approval::{Batch, DecisionQueue, PortalConfig, RequestGenerator, Scorer};
use tokio::sync::RwLock;
use tracing::warn;

use super::error::ApiError;

/// Everything that changes while an operator works through batches.
pub struct Session {
    /// Logged-in operator, if any.
    pub operator: Option<String>,
    /// The batch under review. A new batch replaces the old one.
    pub batch: Option<Batch>,
    pub generator: RequestGenerator,
    /// Where the current batch's results were persisted, once finalized.
    pub results_path: Option<PathBuf>,
}

impl Session {
    /// The logged-in operator.
    pub fn operator(&self) -> Result<&str, ApiError> {
        self.operator
            .as_deref()
            .ok_or_else(|| ApiError::Unauthorized("Log in first".to_string()))
    }

    pub fn batch(&self) -> Result<&Batch, ApiError> {
        self.batch
            .as_ref()
            .ok_or_else(|| ApiError::NotFound("No batch has been generated".to_string()))
    }

    pub fn batch_mut(&mut self) -> Result<&mut Batch, ApiError> {
        self.batch
            .as_mut()
            .ok_or_else(|| ApiError::NotFound("No batch has been generated".to_string()))
    }

    pub fn queue(&self) -> Result<&DecisionQueue, ApiError> {
        Ok(self.batch()?.queue()?)
    }

    /// Start with an existing batch, e.g. one resumed from a snapshot.
    pub fn with_batch(mut self, batch: Batch) -> Self {
        self.batch = Some(batch);
        self
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            operator: None,
            batch: None,
            generator: RequestGenerator::new(),
            results_path: None,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Per-batch state. Mutating handlers hold the write guard until the
    /// snapshot is saved and the new state is swapped in.
    pub session: Arc<RwLock<Session>>,
    pub config: Arc<PortalConfig>,
    pub scorer: Arc<dyn Scorer>,
}

impl AppState {
    /// Create application state around a prepared session.
    pub fn with_session(config: PortalConfig, scorer: Arc<dyn Scorer>, session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            config: Arc::new(config),
            scorer,
        }
    }

    /// Remove the snapshot once its batch is finished or replaced.
    pub fn discard_snapshot(&self) {
        let path = &self.config.snapshot_path;
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "could not remove snapshot");
            }
        }
    }
}
