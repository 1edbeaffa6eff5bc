//! Mock provider implementations for testing.
//!
//! Both mocks record every call so tests can assert on call counts and on the
//! exact prompt that reached the generator.

use super::{AnswerGenerator, GenerationParams, NewsLookup, UpstreamError};
use crate::models::Headline;
use async_trait::async_trait;
use std::sync::Mutex;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock answer generator.
pub struct MockAnswerGenerator {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockAnswerGenerator {
    /// Always answers with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always fails with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        lock(&self.prompts).len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.prompts).last().cloned()
    }
}

#[async_trait]
impl AnswerGenerator for MockAnswerGenerator {
    async fn complete(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, UpstreamError> {
        lock(&self.prompts).push(prompt.to_string());

        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(UpstreamError::Api {
                status: 503,
                message: message.clone(),
            }),
        }
    }
}

/// Mock news lookup.
pub struct MockNewsLookup {
    result: Result<Vec<Headline>, String>,
    searches: Mutex<Vec<RecordedSearch>>,
}

/// One `search` call as the mock received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSearch {
    pub query: String,
    pub limit: usize,
    pub language: Option<String>,
}

impl MockNewsLookup {
    pub fn with_headlines(headlines: Vec<Headline>) -> Self {
        Self {
            result: Ok(headlines),
            searches: Mutex::new(Vec::new()),
        }
    }

    /// Headlines with only titles, in the given order.
    pub fn with_titles(titles: &[&str]) -> Self {
        Self::with_headlines(titles.iter().map(|t| Headline::new(*t)).collect())
    }

    pub fn empty() -> Self {
        Self::with_headlines(Vec::new())
    }

    /// Always fails with a network error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
            searches: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        lock(&self.searches).len()
    }

    /// Every `(query, limit)` pair received so far.
    pub fn queries(&self) -> Vec<(String, usize)> {
        lock(&self.searches)
            .iter()
            .map(|s| (s.query.clone(), s.limit))
            .collect()
    }

    pub fn searches(&self) -> Vec<RecordedSearch> {
        lock(&self.searches).clone()
    }
}

#[async_trait]
impl NewsLookup for MockNewsLookup {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        language: Option<&str>,
    ) -> Result<Vec<Headline>, UpstreamError> {
        lock(&self.searches).push(RecordedSearch {
            query: query.to_string(),
            limit,
            language: language.map(str::to_owned),
        });

        match &self.result {
            Ok(headlines) => Ok(headlines.iter().take(limit).cloned().collect()),
            Err(message) => Err(UpstreamError::Network(message.clone())),
        }
    }
}
