//! News-intent classification.

use crate::config::DEFAULT_NEWS_KEYWORDS;

/// Decides whether a question asks about current events.
///
/// Any `Fn(&str) -> bool` closure is a `NewsIntent`, so tests can swap in a
/// deterministic predicate.
pub trait NewsIntent: Send + Sync {
    fn is_news_seeking(&self, question: &str) -> bool;
}

impl<F> NewsIntent for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_news_seeking(&self, question: &str) -> bool {
        self(question)
    }
}

/// Case-insensitive substring match against a keyword list.
#[derive(Debug, Clone)]
pub struct KeywordIntent {
    keywords: Vec<String>,
}

impl KeywordIntent {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordIntent {
    fn default() -> Self {
        Self::new(DEFAULT_NEWS_KEYWORDS)
    }
}

impl NewsIntent for KeywordIntent {
    fn is_news_seeking(&self, question: &str) -> bool {
        let question = question.to_lowercase();
        self.keywords.iter().any(|k| question.contains(k.as_str()))
    }
}
