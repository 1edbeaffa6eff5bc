//! Results produced by the request handler.

use super::Headline;
use serde::Serialize;

/// How an answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    /// Generated from the question alone.
    Direct,
    /// Generated with news headlines embedded in the prompt.
    News,
}

impl AnswerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerMode::Direct => "direct",
            AnswerMode::News => "news",
        }
    }
}

impl std::fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of answering one question.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    pub answer: String,
    pub mode: AnswerMode,
    /// Headlines that were embedded in the prompt, if any.
    pub headlines: Vec<Headline>,
}

/// Summary of recent articles for an explicit news query.
#[derive(Debug, Clone)]
pub struct NewsDigest {
    pub summary: String,
    pub headlines: Vec<Headline>,
}
