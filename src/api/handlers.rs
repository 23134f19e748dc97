use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::session::{Session, SessionState};
use crate::services::submission::{self, SubmissionOutcome};
use crate::services::ensemble;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub participant: String,
    pub total_iterations: u32,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub participant: String,
    pub state: SessionState,
    pub iteration: Option<u32>,
    pub total_iterations: u32,
    pub completed_records: usize,
    pub history: Vec<IterationSummary>,
    pub started_at: DateTime<Utc>,
}

/// One completed iteration, shown as the session's pick history
#[derive(Debug, Serialize)]
pub struct IterationSummary {
    pub iteration: u32,
    pub input_menu: String,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        let history = session
            .records
            .iter()
            .map(|record| IterationSummary {
                iteration: record.iteration,
                input_menu: record.input_menu.clone(),
            })
            .collect();

        Self {
            id: session.id,
            participant: session.participant.clone(),
            state: session.state.clone(),
            iteration: session.iteration(),
            total_iterations: session.total_iterations,
            completed_records: session.records.len(),
            history,
            started_at: session.started_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub menu: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub menu: String,
    pub iteration: u32,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub ratings: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub delivered: usize,
    pub failed: usize,
    pub outcomes: Vec<SubmissionOutcome>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Get all selectable menu names
pub async fn list_menus(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.dataset.catalog.names().to_vec())
}

/// Start a new evaluation session
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    if request.participant.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Participant name cannot be empty".to_string(),
        ));
    }

    let session = Session::new(
        request.participant.trim().to_string(),
        request.total_iterations,
    );
    let response = SessionResponse::from(&session);

    tracing::info!(
        session_id = %session.id,
        participant = %session.participant,
        total_iterations = session.total_iterations,
        "Session started"
    );

    let mut sessions = state.sessions.write().await;
    sessions.insert(session.id, session);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a session snapshot
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("No session {}", id)))?;
    Ok(Json(SessionResponse::from(session)))
}

/// Score the picked menu and attach the ranked recommendations to the session
pub async fn recommend(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<RecommendResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("No session {}", id)))?;

    let recommendations = ensemble::recommend(
        &request.menu,
        &state.dataset.content,
        &state.dataset.collaborative,
        state.scoring.alpha,
        state.scoring.top_k,
    )
    .ok_or_else(|| AppError::NotFound(format!("Menu not found: {}", request.menu.trim())))?;

    let iteration =
        session.accept_recommendations(request.menu.trim().to_string(), recommendations.clone())?;

    tracing::info!(
        session_id = %id,
        iteration,
        menu = %request.menu.trim(),
        results = recommendations.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendResponse {
        menu: request.menu.trim().to_string(),
        iteration,
        recommendations,
    }))
}

/// Record relevance judgements for the pending recommendations
pub async fn rate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<SessionResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("No session {}", id)))?;

    session.accept_ratings(request.ratings)?;

    Ok(Json(SessionResponse::from(&*session)))
}

/// Upload all collected records to the spreadsheet endpoint
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SubmitResponse>> {
    // Take the records under the lock, upload without holding it.
    let records = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("No session {}", id)))?;
        session.begin_submission()?
    };

    let outcomes = submission::submit_all(state.sink.as_ref(), &records).await;

    {
        let mut sessions = state.sessions.write().await;
        if let Some(session) = sessions.get_mut(&id) {
            session.finish_submission();
        }
    }

    let delivered = outcomes
        .iter()
        .filter(|o| o.delivery == submission::DeliveryStatus::Delivered)
        .count();
    let failed = outcomes.len() - delivered;

    tracing::info!(
        session_id = %id,
        delivered,
        failed,
        "Session submission finished"
    );

    Ok(Json(SubmitResponse {
        delivered,
        failed,
        outcomes,
    }))
}
