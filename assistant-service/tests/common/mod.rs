#![allow(dead_code)]

use assistant_service::config::{AssistantConfig, AssistantSettings, NewsApiConfig, OpenAiConfig};
use assistant_service::services::providers::{MockAnswerGenerator, MockNewsLookup};
use assistant_service::services::{AskService, KeywordIntent};
use assistant_service::startup::{build_router, AppState, Application};
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_OPENAI_KEY: &str = "test-openai-key";
pub const TEST_NEWS_KEY: &str = "test-news-key";

/// Router backed by mock upstreams and the default keyword predicate.
pub fn router_with(news: Arc<MockNewsLookup>, generator: Arc<MockAnswerGenerator>) -> Router {
    let assistant = AskService::new(
        news,
        generator,
        Arc::new(KeywordIntent::default()),
        AssistantSettings::default(),
    );
    build_router(AppState::new(assistant))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Response body is not JSON")
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Router failed to respond");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub async fn post_json(router: &Router, path: &str, body: serde_json::Value) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

pub async fn get(router: &Router, path: &str) -> TestResponse {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(router, request).await
}

/// Configuration pointing both upstreams at local mock servers.
pub fn test_config(openai_url: &str, news_url: &str) -> AssistantConfig {
    AssistantConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        openai: OpenAiConfig {
            api_key: Secret::new(TEST_OPENAI_KEY.to_string()),
            base_url: openai_url.to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 5,
        },
        news: NewsApiConfig {
            api_key: Secret::new(TEST_NEWS_KEY.to_string()),
            base_url: news_url.to_string(),
            language: "en".to_string(),
            lookback_days: 7,
            timeout_secs: 5,
        },
        assistant: AssistantSettings::default(),
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(config: AssistantConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address,
            port,
            client: reqwest::Client::new(),
        }
    }

    pub async fn ask(&self, question: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/ask", self.address))
            .json(&serde_json::json!({ "question": question }))
            .send()
            .await
            .expect("Failed to send request")
    }
}

pub fn chat_completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
}

pub fn news_articles(titles: &[&str]) -> serde_json::Value {
    let articles: Vec<serde_json::Value> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            serde_json::json!({
                "source": { "id": null, "name": "Reuters" },
                "author": null,
                "title": title,
                "description": "desc",
                "url": format!("https://example.com/{}", i),
                "publishedAt": "2024-05-22T21:00:00Z",
                "content": null
            })
        })
        .collect();

    serde_json::json!({
        "status": "ok",
        "totalResults": articles.len(),
        "articles": articles
    })
}
