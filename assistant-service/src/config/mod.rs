use crate::services::providers::GenerationParams;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_NEWS_BASE_URL: &str = "https://newsapi.org";

/// Query sent to the news upstream when enriching `/ask` answers.
pub const DEFAULT_NEWS_QUERY: &str = "NVIDIA";

/// Headlines embedded into an enriched prompt.
pub const DEFAULT_HEADLINE_LIMIT: usize = 6;

/// Headlines returned by `/news` when the caller gives no page size.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Upper bound for any single news lookup.
pub const MAX_PAGE_SIZE: usize = 20;

/// Accepted range for `NEWS_API_LOOKBACK_DAYS`.
pub const MIN_LOOKBACK_DAYS: i64 = 1;
pub const MAX_LOOKBACK_DAYS: i64 = 30;

/// Terms that mark a question as asking about current events.
pub const DEFAULT_NEWS_KEYWORDS: &[&str] = &[
    "latest",
    "today",
    "this week",
    "recent",
    "news",
    "announce",
    "announced",
    "earnings",
    "quarter",
    "q1",
    "q2",
    "q3",
    "q4",
    "revenue",
    "guidance",
    "press release",
    "launch",
    "just released",
];

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub common: core_config::Config,
    pub openai: OpenAiConfig,
    pub news: NewsApiConfig,
    pub assistant: AssistantSettings,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub language: String,
    /// Only articles published within this many days are requested.
    pub lookback_days: i64,
    pub timeout_secs: u64,
}

/// Behaviour of the request handler itself.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub news_query: String,
    pub headline_limit: usize,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub news_keywords: Vec<String>,
    pub answer_params: GenerationParams,
    pub digest_params: GenerationParams,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            news_query: DEFAULT_NEWS_QUERY.to_string(),
            headline_limit: DEFAULT_HEADLINE_LIMIT,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            news_keywords: DEFAULT_NEWS_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            answer_params: GenerationParams {
                max_tokens: Some(300),
                temperature: Some(0.4),
            },
            digest_params: GenerationParams {
                max_tokens: Some(350),
                temperature: Some(0.3),
            },
        }
    }
}

impl AssistantConfig {
    /// Load configuration from the environment.
    ///
    /// Both API keys are required; a missing or blank key fails here so the
    /// process never starts without its upstreams.
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";
        let defaults = AssistantSettings::default();

        let news_keywords = require_keywords(&get_env(
            "ASSISTANT_NEWS_KEYWORDS",
            Some(&DEFAULT_NEWS_KEYWORDS.join(",")),
            is_prod,
        )?)?;

        Ok(AssistantConfig {
            common: common_config,
            openai: OpenAiConfig {
                api_key: get_secret("OPENAI_API_KEY")?,
                base_url: get_env("OPENAI_BASE_URL", Some(DEFAULT_OPENAI_BASE_URL), is_prod)?,
                model: get_env("OPENAI_MODEL", Some(DEFAULT_OPENAI_MODEL), is_prod)?,
                timeout_secs: parse_env("OPENAI_TIMEOUT_SECS", 30, is_prod)?,
            },
            news: NewsApiConfig {
                api_key: get_secret("NEWS_API_KEY")?,
                base_url: get_env("NEWS_API_BASE_URL", Some(DEFAULT_NEWS_BASE_URL), is_prod)?,
                language: get_env("NEWS_API_LANGUAGE", Some("en"), is_prod)?,
                lookback_days: check_lookback_days(parse_env(
                    "NEWS_API_LOOKBACK_DAYS",
                    7,
                    is_prod,
                )?)?,
                timeout_secs: parse_env("NEWS_API_TIMEOUT_SECS", 10, is_prod)?,
            },
            assistant: AssistantSettings {
                news_query: get_env("ASSISTANT_NEWS_QUERY", Some(DEFAULT_NEWS_QUERY), is_prod)?,
                headline_limit: parse_env(
                    "ASSISTANT_HEADLINE_LIMIT",
                    DEFAULT_HEADLINE_LIMIT,
                    is_prod,
                )?
                .clamp(1, MAX_PAGE_SIZE),
                news_keywords,
                answer_params: GenerationParams {
                    max_tokens: Some(parse_env("ASSISTANT_MAX_TOKENS", 300, is_prod)?),
                    temperature: Some(parse_env("ASSISTANT_TEMPERATURE", 0.4, is_prod)?),
                },
                ..defaults
            },
        })
    }
}

/// Split a comma separated keyword list, dropping blanks and normalising case.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Keyword list from its raw form; an empty list would disable enrichment.
fn require_keywords(raw: &str) -> Result<Vec<String>, AppError> {
    let keywords = parse_keywords(raw);
    if keywords.is_empty() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "ASSISTANT_NEWS_KEYWORDS must contain at least one keyword"
        )));
    }
    Ok(keywords)
}

fn check_lookback_days(days: i64) -> Result<i64, AppError> {
    if (MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(AppError::ConfigError(anyhow::anyhow!(
            "NEWS_API_LOOKBACK_DAYS must be between {} and {}, got {}",
            MIN_LOOKBACK_DAYS,
            MAX_LOOKBACK_DAYS,
            days
        )))
    }
}

fn get_secret(key: &str) -> Result<Secret<String>, AppError> {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => Ok(Secret::new(val)),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required but not set",
            key
        ))),
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T, is_prod: bool) -> Result<T, AppError>
where
    T: FromStr + ToString,
    T::Err: std::fmt::Display,
{
    let raw = get_env(key, Some(&default.to_string()), is_prod)?;
    raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}
