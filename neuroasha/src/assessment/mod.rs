//! Guided cognitive-assessment conversation.

mod engine;
mod error;
mod intent;
pub mod script;

pub use engine::{AssessmentEngine, EngineOptions, Pace};
pub use error::SubmitError;
pub use intent::ResponsePicker;
