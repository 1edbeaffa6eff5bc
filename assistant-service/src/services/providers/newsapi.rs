//! NewsAPI headline lookup.
//!
//! Queries `/v2/everything` sorted by publication date and maps articles to
//! [`Headline`]s, keeping upstream order.

use super::{NewsLookup, UpstreamError};
use crate::config::NewsApiConfig;
use crate::models::Headline;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::Duration;

/// Placeholder title NewsAPI uses for articles taken down by the publisher.
const REMOVED_TITLE: &str = "[Removed]";

/// NewsAPI client.
pub struct NewsApiClient {
    config: NewsApiConfig,
    client: Client,
}

impl NewsApiClient {
    pub fn new(config: NewsApiConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn api_url(&self) -> String {
        format!("{}/v2/everything", self.config.base_url.trim_end_matches('/'))
    }

    /// Earliest publication date requested, as `YYYY-MM-DD`.
    fn from_date(&self) -> Result<String, UpstreamError> {
        chrono::Duration::try_days(self.config.lookback_days)
            .and_then(|lookback| Utc::now().checked_sub_signed(lookback))
            .map(|from| from.format("%Y-%m-%d").to_string())
            .ok_or_else(|| {
                UpstreamError::Client(format!(
                    "lookback of {} days is out of range",
                    self.config.lookback_days
                ))
            })
    }
}

#[async_trait]
impl NewsLookup for NewsApiClient {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        language: Option<&str>,
    ) -> Result<Vec<Headline>, UpstreamError> {
        let page_size = limit.to_string();
        let from = self.from_date()?;
        let language = language.unwrap_or(self.config.language.as_str());

        tracing::debug!(query = %query, limit, language = %language, from = %from, "Querying NewsAPI");

        let response = self
            .client
            .get(self.api_url())
            .header("X-Api-Key", self.config.api_key.expose_secret())
            .query(&[
                ("q", query),
                ("language", language),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("from", from.as_str()),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(UpstreamError::RateLimited);
        }

        let parsed: EverythingResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(UpstreamError::InvalidResponse(e.to_string()));
            }
            Err(_) => {
                return Err(UpstreamError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }
        };

        if !status.is_success() || parsed.status != "ok" {
            let message = match (parsed.code, parsed.message) {
                (Some(code), Some(message)) => format!("{}: {}", code, message),
                (_, Some(message)) => message,
                (Some(code), None) => code,
                (None, None) => format!("status '{}'", parsed.status),
            };
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(into_headlines(parsed.articles, limit))
    }
}

fn into_headlines(articles: Vec<Article>, limit: usize) -> Vec<Headline> {
    articles
        .into_iter()
        .filter_map(Article::into_headline)
        .take(limit)
        .collect()
}

// ============================================================================
// NewsAPI Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    #[serde(default)]
    source: Option<ArticleSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    #[serde(default)]
    name: Option<String>,
}

impl Article {
    fn into_headline(self) -> Option<Headline> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && t != REMOVED_TITLE)?;

        Some(Headline {
            title,
            source: self.source.and_then(|s| s.name),
            url: self.url,
            published_at: self
                .published_at
                .and_then(|p| DateTime::parse_from_rfc3339(&p).ok())
                .map(|p| p.with_timezone(&Utc)),
            description: self.description,
        })
    }
}
