//! HTTP handlers for the assistant service.

pub mod ask;
pub mod echo;
pub mod health;
pub mod news;

pub use ask::ask;
pub use echo::echo;
pub use health::{health_check, metrics};
pub use news::news;
