pub mod assistant;
pub mod intent;
pub mod metrics;
pub mod prompt;
pub mod providers;

pub use assistant::{AskError, AskService};
pub use intent::{KeywordIntent, NewsIntent};
