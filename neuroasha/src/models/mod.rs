//! Data models for assessment sessions.

mod message;
mod phase;
mod question;

pub use message::{Message, Sender};
pub use phase::{Phase, Progress};
pub use question::{Domain, QuestionSpec, ResponseKind};
