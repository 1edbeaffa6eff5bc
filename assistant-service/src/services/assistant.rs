//! Request handler: answers questions, optionally enriched with news.
//!
//! Every call is independent. News lookup, when it happens, runs before the
//! single completion call and its failure only drops the enrichment.

use crate::config::AssistantSettings;
use crate::models::{AnswerMode, AnswerResult, Headline, NewsDigest};
use crate::services::intent::NewsIntent;
use crate::services::metrics;
use crate::services::prompt::{compose_answer_prompt, compose_digest_prompt};
use crate::services::providers::{AnswerGenerator, GenerationParams, NewsLookup, UpstreamError};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Digest returned when the news upstream has nothing for the query.
pub const NO_ARTICLES_SUMMARY: &str = "No recent relevant articles found.";

const NEWS_UPSTREAM: &str = "news";
const LLM_UPSTREAM: &str = "llm";

#[derive(Debug, Error)]
pub enum AskError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

impl From<AskError> for AppError {
    fn from(err: AskError) -> Self {
        match err {
            AskError::InvalidInput(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            AskError::Upstream(e) => AppError::BadGateway(e.to_string()),
        }
    }
}

/// Answers questions using the injected upstreams.
#[derive(Clone)]
pub struct AskService {
    news: Arc<dyn NewsLookup>,
    generator: Arc<dyn AnswerGenerator>,
    intent: Arc<dyn NewsIntent>,
    settings: AssistantSettings,
}

impl AskService {
    pub fn new(
        news: Arc<dyn NewsLookup>,
        generator: Arc<dyn AnswerGenerator>,
        intent: Arc<dyn NewsIntent>,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            news,
            generator,
            intent,
            settings,
        }
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    /// Answer one question.
    ///
    /// Fails with [`AskError::InvalidInput`] for an empty question (no upstream
    /// is called) and with [`AskError::Upstream`] only when the generator fails.
    #[tracing::instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn answer(&self, question: &str) -> Result<AnswerResult, AskError> {
        if question.is_empty() {
            return Err(AskError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }

        let headlines = if self.intent.is_news_seeking(question) {
            self.enrichment_headlines().await
        } else {
            Vec::new()
        };

        let prompt = compose_answer_prompt(question.trim(), &headlines);
        let answer = self
            .generate(&prompt, &self.settings.answer_params)
            .await?;

        let mode = if headlines.is_empty() {
            AnswerMode::Direct
        } else {
            AnswerMode::News
        };
        metrics::record_answer(mode.as_str());

        tracing::info!(
            mode = %mode,
            headline_count = headlines.len(),
            answer_len = answer.len(),
            "Question answered"
        );

        Ok(AnswerResult {
            answer,
            mode,
            headlines,
        })
    }

    /// Summarise recent articles for `query`.
    ///
    /// Here the lookup is the point of the call, so a news failure is fatal.
    /// `page_size` defaults to the configured page size and is clamped to
    /// `1..=max_page_size`. `language` overrides the configured news language.
    #[tracing::instrument(skip(self))]
    pub async fn summarize_news(
        &self,
        query: &str,
        page_size: Option<usize>,
        language: Option<&str>,
    ) -> Result<NewsDigest, AskError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AskError::InvalidInput("query must not be empty".to_string()));
        }

        let limit = page_size
            .unwrap_or(self.settings.default_page_size)
            .clamp(1, self.settings.max_page_size.max(1));

        let headlines = self.lookup(query, limit, language).await?;
        if headlines.is_empty() {
            return Ok(NewsDigest {
                summary: NO_ARTICLES_SUMMARY.to_string(),
                headlines,
            });
        }

        let prompt = compose_digest_prompt(query, &headlines);
        let summary = self
            .generate(&prompt, &self.settings.digest_params)
            .await?;

        Ok(NewsDigest { summary, headlines })
    }

    /// Best-effort headlines for enriching an answer.
    async fn enrichment_headlines(&self) -> Vec<Headline> {
        match self
            .lookup(&self.settings.news_query, self.settings.headline_limit, None)
            .await
        {
            Ok(headlines) => {
                if headlines.is_empty() {
                    tracing::debug!("News lookup returned no headlines");
                }
                headlines
            }
            Err(e) => {
                tracing::warn!(error = %e, "News enrichment failed, answering without headlines");
                Vec::new()
            }
        }
    }

    async fn lookup(
        &self,
        query: &str,
        limit: usize,
        language: Option<&str>,
    ) -> Result<Vec<Headline>, UpstreamError> {
        let start = Instant::now();
        let result = self.news.search(query, limit, language).await;
        record_upstream(NEWS_UPSTREAM, &result, start);
        result
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, UpstreamError> {
        let start = Instant::now();
        let result = self
            .generator
            .complete(prompt, params)
            .await
            .and_then(|text| {
                let text = text.trim();
                if text.is_empty() {
                    Err(UpstreamError::EmptyResponse)
                } else {
                    Ok(text.to_string())
                }
            });
        record_upstream(LLM_UPSTREAM, &result, start);

        if let Err(e) = &result {
            tracing::error!(error = %e, "Answer generation failed");
        }
        result
    }
}

fn record_upstream<T>(upstream: &str, result: &Result<T, UpstreamError>, start: Instant) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::record_upstream_call(upstream, outcome, start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::intent::KeywordIntent;
    use crate::services::providers::{MockAnswerGenerator, MockNewsLookup};

    fn service(
        news: Arc<MockNewsLookup>,
        generator: Arc<MockAnswerGenerator>,
    ) -> AskService {
        AskService::new(
            news,
            generator,
            Arc::new(KeywordIntent::default()),
            AssistantSettings::default(),
        )
    }

    #[tokio::test]
    async fn empty_question_is_rejected_without_upstream_calls() {
        let news = Arc::new(MockNewsLookup::with_titles(&["H1"]));
        let generator = Arc::new(MockAnswerGenerator::replying("unused"));
        let svc = service(news.clone(), generator.clone());

        let err = svc.answer("").await.unwrap_err();

        assert!(matches!(err, AskError::InvalidInput(_)));
        assert_eq!(news.calls(), 0);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn evergreen_question_skips_news() {
        let news = Arc::new(MockNewsLookup::with_titles(&["H1"]));
        let generator = Arc::new(MockAnswerGenerator::replying("42"));
        let svc = service(news.clone(), generator.clone());

        let result = svc.answer("What is NVIDIA's market cap?").await.unwrap();

        assert_eq!(result.answer, "42");
        assert_eq!(result.mode, AnswerMode::Direct);
        assert!(result.headlines.is_empty());
        assert_eq!(news.calls(), 0);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn news_question_embeds_headlines() {
        let news = Arc::new(MockNewsLookup::with_titles(&["H1", "H2"]));
        let generator = Arc::new(MockAnswerGenerator::replying("Busy week."));
        let svc = service(news.clone(), generator.clone());

        let result = svc.answer("What's the latest news?").await.unwrap();

        assert_eq!(result.mode, AnswerMode::News);
        assert_eq!(result.headlines.len(), 2);
        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("H1"));
        assert!(prompt.contains("H2"));
        assert!(prompt.contains("What's the latest news?"));
        assert_eq!(
            news.queries(),
            vec![("NVIDIA".to_string(), AssistantSettings::default().headline_limit)]
        );
    }

    #[tokio::test]
    async fn news_failure_is_not_fatal() {
        let news = Arc::new(MockNewsLookup::failing("connection refused"));
        let generator = Arc::new(MockAnswerGenerator::replying("Still answered."));
        let svc = service(news.clone(), generator.clone());

        let result = svc.answer("Any recent announcements?").await.unwrap();

        assert_eq!(result.answer, "Still answered.");
        assert_eq!(result.mode, AnswerMode::Direct);
        assert_eq!(news.calls(), 1);
        assert_eq!(generator.calls(), 1);
        assert!(!generator.last_prompt().unwrap().contains("Recent headlines"));
    }

    #[tokio::test]
    async fn empty_news_result_answers_directly() {
        let news = Arc::new(MockNewsLookup::empty());
        let generator = Arc::new(MockAnswerGenerator::replying("ok"));
        let svc = service(news.clone(), generator);

        let result = svc.answer("latest?").await.unwrap();

        assert_eq!(result.mode, AnswerMode::Direct);
        assert_eq!(news.calls(), 1);
    }

    #[tokio::test]
    async fn generator_failure_is_fatal_regardless_of_news() {
        for news in [
            MockNewsLookup::with_titles(&["H1"]),
            MockNewsLookup::failing("down"),
        ] {
            let news = Arc::new(news);
            let generator = Arc::new(MockAnswerGenerator::failing("quota exceeded"));
            let svc = service(news, generator.clone());

            let err = svc.answer("latest news").await.unwrap_err();

            assert!(matches!(err, AskError::Upstream(_)));
            assert_eq!(generator.calls(), 1);
        }
    }

    #[tokio::test]
    async fn blank_completion_is_upstream_error() {
        let news = Arc::new(MockNewsLookup::empty());
        let generator = Arc::new(MockAnswerGenerator::replying("  \n"));
        let svc = service(news, generator);

        let err = svc.answer("Explain NVLink").await.unwrap_err();

        assert!(matches!(
            err,
            AskError::Upstream(UpstreamError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn answer_is_trimmed() {
        let news = Arc::new(MockNewsLookup::empty());
        let generator = Arc::new(MockAnswerGenerator::replying("\n  Ada Lovelace.  \n"));
        let svc = service(news, generator);

        let result = svc.answer("Which architecture came before Hopper?").await.unwrap();
        assert_eq!(result.answer, "Ada Lovelace.");
    }

    #[tokio::test]
    async fn identical_questions_repeat_upstream_calls() {
        let news = Arc::new(MockNewsLookup::with_titles(&["H1"]));
        let generator = Arc::new(MockAnswerGenerator::replying("a"));
        let svc = service(news.clone(), generator.clone());

        svc.answer("latest?").await.unwrap();
        svc.answer("latest?").await.unwrap();

        assert_eq!(news.calls(), 2);
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn injected_predicate_controls_enrichment() {
        let news = Arc::new(MockNewsLookup::with_titles(&["H1"]));
        let generator = Arc::new(MockAnswerGenerator::replying("a"));
        let svc = AskService::new(
            news.clone(),
            generator,
            Arc::new(|_: &str| true),
            AssistantSettings::default(),
        );

        let result = svc.answer("What is NVIDIA's market cap?").await.unwrap();

        assert_eq!(result.mode, AnswerMode::News);
        assert_eq!(news.calls(), 1);
    }

    #[tokio::test]
    async fn summarize_news_without_articles_skips_generator() {
        let news = Arc::new(MockNewsLookup::empty());
        let generator = Arc::new(MockAnswerGenerator::replying("unused"));
        let svc = service(news, generator.clone());

        let digest = svc.summarize_news("NVIDIA", None, None).await.unwrap();

        assert_eq!(digest.summary, NO_ARTICLES_SUMMARY);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn summarize_news_clamps_page_size() {
        let news = Arc::new(MockNewsLookup::with_titles(&["A", "B", "C"]));
        let generator = Arc::new(MockAnswerGenerator::replying("digest"));
        let svc = service(news.clone(), generator.clone());
        let max = svc.settings().max_page_size;

        let digest = svc.summarize_news("  Blackwell ", Some(1000), None).await.unwrap();
        svc.summarize_news("Blackwell", Some(0), None).await.unwrap();

        assert_eq!(digest.summary, "digest");
        assert_eq!(digest.headlines.len(), 3);
        assert_eq!(
            news.queries(),
            vec![("Blackwell".to_string(), max), ("Blackwell".to_string(), 1)]
        );
        assert!(generator.last_prompt().unwrap().contains("1. A"));
    }

    #[tokio::test]
    async fn summarize_news_propagates_lookup_failure() {
        let news = Arc::new(MockNewsLookup::failing("401"));
        let generator = Arc::new(MockAnswerGenerator::replying("unused"));
        let svc = service(news, generator.clone());

        let err = svc.summarize_news("NVIDIA", None, None).await.unwrap_err();

        assert!(matches!(err, AskError::Upstream(_)));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn summarize_news_rejects_blank_query() {
        let news = Arc::new(MockNewsLookup::empty());
        let generator = Arc::new(MockAnswerGenerator::replying("unused"));
        let svc = service(news.clone(), generator);

        let err = svc.summarize_news("   ", None, None).await.unwrap_err();

        assert!(matches!(err, AskError::InvalidInput(_)));
        assert_eq!(news.calls(), 0);
    }

    #[tokio::test]
    async fn summarize_news_passes_language_through() {
        let news = Arc::new(MockNewsLookup::with_titles(&["A"]));
        let generator = Arc::new(MockAnswerGenerator::replying("digest"));
        let svc = service(news.clone(), generator);

        svc.summarize_news("NVIDIA", None, Some("de")).await.unwrap();
        svc.answer("latest news?").await.unwrap();

        let languages: Vec<Option<String>> =
            news.searches().into_iter().map(|s| s.language).collect();
        assert_eq!(languages, vec![Some("de".to_string()), None]);
    }
}
