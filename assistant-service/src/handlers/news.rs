use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

use crate::config::DEFAULT_NEWS_QUERY;
use crate::models::Headline;
use crate::startup::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct NewsRequest {
    #[serde(default = "default_query")]
    #[validate(length(min = 1, max = 200, message = "Query must be 1-200 characters"))]
    pub query: String,
    #[validate(range(min = 1, max = 20, message = "Page size must be between 1 and 20"))]
    pub page_size: Option<usize>,
    /// Two-letter ISO-639-1 code; the configured language when absent.
    #[validate(length(equal = 2, message = "Language must be a two-letter code"))]
    pub language: Option<String>,
}

fn default_query() -> String {
    DEFAULT_NEWS_QUERY.to_string()
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub summary: String,
    pub headlines: Vec<Headline>,
}

/// Explicit news digest: fetch recent articles for a query and summarise them.
#[tracing::instrument(skip(state, request))]
pub async fn news(
    State(state): State<AppState>,
    Json(request): Json<NewsRequest>,
) -> Result<Json<NewsResponse>, AppError> {
    request.validate()?;

    let digest = state
        .assistant
        .summarize_news(
            &request.query,
            request.page_size,
            request.language.as_deref(),
        )
        .await?;

    Ok(Json(NewsResponse {
        summary: digest.summary,
        headlines: digest.headlines,
    }))
}
