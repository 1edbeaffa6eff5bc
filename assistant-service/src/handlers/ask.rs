use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

use crate::models::{AnswerMode, Headline};
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub mode: AnswerMode,
    /// Headlines the answer was enriched with; empty in direct mode.
    pub headlines: Vec<Headline>,
}

#[tracing::instrument(skip(state, request))]
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let result = state.assistant.answer(&request.question).await?;

    Ok(Json(AskResponse {
        answer: result.answer,
        mode: result.mode,
        headlines: result.headlines,
    }))
}
