//! Message model representing one turn of an assessment conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The assessment assistant.
    Assistant,
    /// The person taking the assessment.
    Participant,
}

impl Sender {
    /// Convert sender to its wire label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assistant => "assistant",
            Self::Participant => "participant",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable record of one turn in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Position in the transcript, strictly increasing from 1.
    pub id: u64,
    /// Who produced the message.
    pub sender: Sender,
    /// Content; summaries span several lines.
    pub text: String,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current instant.
    pub fn new(id: u64, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id,
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }

    /// Clock time for chat rendering, e.g. `09:41`.
    pub fn clock_time(&self) -> String {
        self.timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_serializes_lowercase() {
        let json = serde_json::to_string(&Sender::Participant).unwrap();
        assert_eq!(json, "\"participant\"");
        let back: Sender = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(back, Sender::Assistant);
        assert_eq!(Sender::Participant.to_string(), "participant");
    }

    #[test]
    fn clock_time_is_hours_and_minutes() {
        let message = Message::new(1, Sender::Assistant, "hello");
        let clock = message.clock_time();
        assert_eq!(clock.len(), 5);
        assert_eq!(&clock[2..3], ":");
    }
}
