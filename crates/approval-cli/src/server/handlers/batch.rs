//! Batch handlers: generate, inspect, export, score.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use approval::request::write_requests;
use approval::sink::write_scored;
use approval::{Batch, Item, Request};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// The batch under review.
#[derive(Serialize)]
pub struct BatchResponse {
    pub created_at: String,
    pub scored: bool,
    pub requests: Vec<Request>,
}

impl BatchResponse {
    fn from_batch(batch: &Batch) -> Self {
        Self {
            created_at: batch.created_at().to_rfc3339(),
            scored: batch.is_scored(),
            requests: batch.requests().to_vec(),
        }
    }
}

#[derive(Serialize)]
pub struct ExportResponse {
    pub path: String,
    pub rows: usize,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub scorer: String,
    pub export_path: String,
    pub items: Vec<Item>,
}

/// POST /api/batch
///
/// Generates a new batch, replacing the current one and any saved progress.
pub async fn new_batch(State(state): State<AppState>) -> Result<Json<BatchResponse>, ApiError> {
    let mut session = state.session.write().await;
    session.operator()?;

    let requests = session.generator.generate(state.config.batch_size)?;
    let batch = Batch::new(requests)?;
    let response = BatchResponse::from_batch(&batch);

    session.batch = Some(batch);
    session.results_path = None;
    state.discard_snapshot();
    info!(requests = response.requests.len(), "generated new batch");

    Ok(Json(response))
}

/// GET /api/batch
pub async fn get_batch(State(state): State<AppState>) -> Result<Json<BatchResponse>, ApiError> {
    let session = state.session.read().await;
    session.operator()?;

    Ok(Json(BatchResponse::from_batch(session.batch()?)))
}

/// POST /api/batch/export
pub async fn export_batch(State(state): State<AppState>) -> Result<Json<ExportResponse>, ApiError> {
    let session = state.session.read().await;
    session.operator()?;
    let batch = session.batch()?;

    let path = state.config.pending_export_path();
    write_requests(&path, batch.requests())?;

    Ok(Json(ExportResponse {
        path: path.display().to_string(),
        rows: batch.requests().len(),
    }))
}

/// POST /api/batch/score
///
/// Scores the batch once. Later calls return the same annotations. Scoring
/// runs on a copy that replaces the session batch only after the scored
/// export and the snapshot are written.
pub async fn score_batch(State(state): State<AppState>) -> Result<Json<ScoreResponse>, ApiError> {
    let mut session = state.session.write().await;
    session.operator()?;

    let export_path = state.config.scored_export_path();
    let batch = session.batch()?;
    let items = if batch.is_scored() {
        batch.queue()?.items().to_vec()
    } else {
        let mut scored = batch.clone();
        let items = scored.score(state.scorer.as_ref(), &state.config.band)?.to_vec();
        write_scored(&export_path, &items)?;
        scored.queue()?.save(&state.config.snapshot_path)?;
        session.batch = Some(scored);
        items
    };

    Ok(Json(ScoreResponse {
        scorer: state.scorer.name().to_string(),
        export_path: export_path.display().to_string(),
        items,
    }))
}
