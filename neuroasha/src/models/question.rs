//! Question model for the assessment script.

use serde::{Deserialize, Serialize};

/// Cognitive domain a question is filed under. Descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Orientation,
    Memory,
    Attention,
    Language,
    ExecutiveFunction,
}

impl Domain {
    /// Every domain, in the order the summary reports them.
    pub const ALL: [Self; 5] = [
        Self::Orientation,
        Self::Memory,
        Self::Attention,
        Self::Language,
        Self::ExecutiveFunction,
    ];

    /// Human-readable label used in prompts.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Orientation => "Orientation",
            Self::Memory => "Memory",
            Self::Attention => "Attention",
            Self::Language => "Language",
            Self::ExecutiveFunction => "Executive Function",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of answer a question expects. Never checked against the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Date,
    Location,
    Recall,
    Calculation,
    DelayedRecall,
    Fluency,
    ProblemSolving,
}

impl ResponseKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Location => "location",
            Self::Recall => "recall",
            Self::Calculation => "calculation",
            Self::DelayedRecall => "delayed_recall",
            Self::Fluency => "fluency",
            Self::ProblemSolving => "problem_solving",
        }
    }
}

impl std::fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the fixed, ordered question script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionSpec {
    /// Text shown to the participant.
    pub prompt: &'static str,
    /// Domain label.
    pub domain: Domain,
    /// Expected answer kind (labeling only).
    pub response_kind: ResponseKind,
}

impl QuestionSpec {
    pub const fn new(prompt: &'static str, domain: Domain, response_kind: ResponseKind) -> Self {
        Self {
            prompt,
            domain,
            response_kind,
        }
    }

    /// Format as `Question {n} of {total} - {domain}: {prompt}`, `index` being 0-based.
    pub fn numbered(&self, index: usize, total: usize) -> String {
        format!(
            "Question {} of {} - {}: {}",
            index + 1,
            total,
            self.domain,
            self.prompt
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_prompt_uses_one_based_position() {
        let q = QuestionSpec::new("Name a colour.", Domain::ExecutiveFunction, ResponseKind::Fluency);
        assert_eq!(
            q.numbered(2, 7),
            "Question 3 of 7 - Executive Function: Name a colour."
        );
    }

    #[test]
    fn response_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ResponseKind::DelayedRecall).unwrap();
        assert_eq!(json, "\"delayed_recall\"");
        assert_eq!(ResponseKind::ProblemSolving.to_string(), "problem_solving");
    }
}
