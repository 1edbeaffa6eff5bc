//! Upstream provider abstractions and implementations.
//!
//! The request handler only sees the [`NewsLookup`] and [`AnswerGenerator`]
//! traits, so the real HTTP clients (NewsAPI, OpenAI) and the recording mocks
//! are interchangeable.

pub mod mock;
pub mod newsapi;
pub mod openai;

use crate::models::Headline;
use async_trait::async_trait;
use thiserror::Error;

pub use mock::{MockAnswerGenerator, MockNewsLookup, RecordedSearch};
pub use newsapi::NewsApiClient;
pub use openai::OpenAiClient;

/// Error type for upstream calls.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Client configuration error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty response")]
    EmptyResponse,
}

impl UpstreamError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Client(_) => "client",
            UpstreamError::Network(_) => "network",
            UpstreamError::RateLimited => "rate_limited",
            UpstreamError::Api { .. } => "api",
            UpstreamError::InvalidResponse(_) => "invalid_response",
            UpstreamError::EmptyResponse => "empty_response",
        }
    }
}

/// Generation parameters for completion requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    /// Maximum output tokens.
    pub max_tokens: Option<u32>,

    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,
}

/// Looks up recent headlines for a query.
#[async_trait]
pub trait NewsLookup: Send + Sync {
    /// Return at most `limit` headlines in upstream order. `language` overrides
    /// the configured language for this call.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        language: Option<&str>,
    ) -> Result<Vec<Headline>, UpstreamError>;
}

/// Produces free text for a composed prompt.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, UpstreamError>;
}
