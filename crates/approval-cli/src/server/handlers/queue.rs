//! Queue handlers: current item, decisions, summary, results.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use approval::sink::{FileResultSink, MergedRecord, ResultSink};
use approval::{Action, Decision, Item, Summary};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// The item awaiting a decision, or the terminal marker.
#[derive(Serialize)]
pub struct CurrentResponse {
    /// 1-based position of the current item; equals `total + 1` once terminal.
    pub position: usize,
    pub total: usize,
    pub terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
}

#[derive(Deserialize)]
pub struct DecideRequest {
    pub item_id: String,
    pub action: String,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub complete: bool,
    pub decided: usize,
    pub total: usize,
    pub summary: Summary,
}

#[derive(Serialize)]
pub struct FinalizeResponse {
    pub path: String,
    pub summary: Summary,
}

/// GET /api/queue/current
pub async fn get_current(State(state): State<AppState>) -> Result<Json<CurrentResponse>, ApiError> {
    let session = state.session.read().await;
    session.operator()?;
    let queue = session.queue()?;

    let current = queue.current();
    Ok(Json(CurrentResponse {
        position: queue.cursor() + 1,
        total: queue.len(),
        terminal: current.is_terminal(),
        item: current.item().cloned(),
    }))
}

/// POST /api/queue/decide
///
/// The decision is applied to a copy of the queue and swapped in only after
/// the snapshot is saved, so a failed save leaves the session untouched.
pub async fn decide(
    State(state): State<AppState>,
    Json(req): Json<DecideRequest>,
) -> Result<Json<Decision>, ApiError> {
    // The write guard covers check, append and advance, plus the snapshot.
    let mut session = state.session.write().await;
    let operator = session.operator()?.to_string();
    let action: Action = req.action.parse().map_err(ApiError::BadRequest)?;

    let mut queue = session.queue()?.clone();
    let decision = queue.decide_as(&req.item_id, action, &operator)?.clone();
    queue.save(&state.config.snapshot_path)?;

    let (decided, total) = queue.position();
    *session.batch_mut()?.queue_mut()? = queue;
    info!(
        item = %decision.item_id,
        action = %decision.action,
        decided,
        total,
        "recorded decision"
    );

    Ok(Json(decision))
}

/// GET /api/queue/summary
///
/// Counts so far; `complete` tells whether they are final.
pub async fn get_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, ApiError> {
    let session = state.session.read().await;
    session.operator()?;
    let queue = session.queue()?;

    let (decided, total) = queue.position();
    let summary = if queue.is_terminal() {
        queue.summary()?
    } else {
        queue.partial_summary()
    };

    Ok(Json(SummaryResponse {
        complete: queue.is_terminal(),
        decided,
        total,
        summary,
    }))
}

/// GET /api/queue/results
pub async fn get_results(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state.session.read().await;
    session.operator()?;
    let queue = session.queue()?;

    let merged = queue.merged_results()?;
    let records: Vec<MergedRecord<'_>> = merged
        .iter()
        .map(|(item, decision)| MergedRecord::new(item, decision))
        .collect();

    serde_json::to_value(&records)
        .map(Json)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// POST /api/queue/finalize
///
/// Persists the finished batch once; repeat calls return the same file.
pub async fn finalize(State(state): State<AppState>) -> Result<Json<FinalizeResponse>, ApiError> {
    let mut session = state.session.write().await;
    session.operator()?;
    let summary = session.queue()?.summary()?;

    let path = match session.results_path.clone() {
        Some(path) => path,
        None => {
            let sink = FileResultSink::new(&state.config.results_dir);
            let path = sink.persist(session.queue()?)?;
            session.results_path = Some(path.clone());
            state.discard_snapshot();
            info!(path = %path.display(), "finalized batch");
            path
        }
    };

    Ok(Json(FinalizeResponse {
        path: path.display().to_string(),
        summary,
    }))
}
