//! Prompt templates.

use crate::models::Headline;
use std::fmt::Write;

pub const ASSISTANT_INSTRUCTION: &str = "You are an assistant specialized in NVIDIA, its GPUs, \
AI hardware and software. Be concise, accurate and practical.";

pub const DIGEST_INSTRUCTION: &str = "You are an NVIDIA news assistant. Answer succinctly and \
factually using only the information implied by the articles list. If timing is uncertain, \
say so. Include 2-4 bullet points and end with a short 'Sources' list of the most relevant URLs.";

/// Prompt for answering a question: instruction, question, then any
/// headlines as a bulleted list.
pub fn compose_answer_prompt(question: &str, headlines: &[Headline]) -> String {
    let mut prompt = format!("{}\n\nQuestion: {}", ASSISTANT_INSTRUCTION, question);

    if !headlines.is_empty() {
        prompt.push_str("\n\nRecent headlines (use them where relevant):");
        for headline in headlines {
            let _ = write!(prompt, "\n- {}", headline.title);
            if let Some(source) = &headline.source {
                let _ = write!(prompt, " ({})", source);
            }
        }
    }

    prompt
}

/// Prompt for summarising articles about `query`, one numbered line per
/// article with its source and link.
pub fn compose_digest_prompt(query: &str, headlines: &[Headline]) -> String {
    let mut prompt = format!(
        "{}\n\nRecent articles about {}:",
        DIGEST_INSTRUCTION, query
    );

    for (i, headline) in headlines.iter().enumerate() {
        let _ = write!(
            prompt,
            "\n{}. {} | {} | {}",
            i + 1,
            headline.title,
            headline.source.as_deref().unwrap_or("Unknown"),
            headline.url.as_deref().unwrap_or("")
        );
    }

    let _ = write!(
        prompt,
        "\n\nSummarize the latest about {} and answer:",
        query
    );
    prompt
}
