//! Operator login and logout.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::server::error::ApiError;
use crate::server::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub operator: Option<String>,
    pub has_batch: bool,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if !state.config.operator.matches(&req.username, &req.password) {
        warn!(username = %req.username, "rejected login");
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let mut session = state.session.write().await;
    session.operator = Some(req.username.clone());
    info!(operator = %req.username, "operator logged in");

    Ok(Json(SessionResponse {
        operator: session.operator.clone(),
        has_batch: session.batch.is_some(),
    }))
}

/// POST /api/logout
pub async fn logout(State(state): State<AppState>) -> Result<Json<SessionResponse>, ApiError> {
    let mut session = state.session.write().await;
    let operator = session.operator()?.to_string();
    session.operator = None;
    info!(operator = %operator, "operator logged out");

    Ok(Json(SessionResponse {
        operator: None,
        has_batch: session.batch.is_some(),
    }))
}
