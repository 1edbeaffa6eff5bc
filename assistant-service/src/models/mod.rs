//! Domain models for the assistant service.

pub mod answer;
pub mod headline;

pub use answer::{AnswerMode, AnswerResult, NewsDigest};
pub use headline::Headline;
