//! Errors raised by the assessment engine.

use thiserror::Error;

/// Why a submission was rejected. Rejected submissions never touch the transcript.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("Assistant is still responding")]
    BusySubmission,
}

impl SubmitError {
    /// Stable identifier for API error bodies.
    pub const fn kind(self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::BusySubmission => "busy_submission",
        }
    }
}
