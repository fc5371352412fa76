//! The fixed question script and every canned assistant text.
//!
//! Nothing here depends on what the participant answers: the summary is
//! the same for every completed session.

use crate::models::{Domain, QuestionSpec, ResponseKind};

/// The assessment questions, asked in order.
pub const QUESTIONS: &[QuestionSpec] = &[
    QuestionSpec::new(
        "Let's start with orientation. What is today's date? Please include the day, month, and year.",
        Domain::Orientation,
        ResponseKind::Date,
    ),
    QuestionSpec::new(
        "Can you tell me what city and state/country you are currently in?",
        Domain::Orientation,
        ResponseKind::Location,
    ),
    QuestionSpec::new(
        "I'm going to give you three words to remember: APPLE, PENNY, TABLE. Please repeat them back to me.",
        Domain::Memory,
        ResponseKind::Recall,
    ),
    QuestionSpec::new(
        "Now I'd like you to count backwards from 100 by 7s. Give me the first 5 numbers. (100, 93, 86...)",
        Domain::Attention,
        ResponseKind::Calculation,
    ),
    QuestionSpec::new(
        "Can you recall those three words I asked you to remember earlier? (APPLE, PENNY, TABLE)",
        Domain::Memory,
        ResponseKind::DelayedRecall,
    ),
    QuestionSpec::new(
        "Please name as many animals as you can think of in 60 seconds. Type them separated by commas.",
        Domain::Language,
        ResponseKind::Fluency,
    ),
    QuestionSpec::new(
        "If you have $100 and you buy items costing $15, $23, and $8, how much change would you receive?",
        Domain::ExecutiveFunction,
        ResponseKind::ProblemSolving,
    ),
];

/// First message of every session.
pub const GREETING: &str = "Hello! I'm NeuroAsha's cognitive assessment assistant. I'll guide you through a series of questions to evaluate your cognitive function. This assessment typically takes 10-15 minutes. Are you ready to begin?";

/// Replies used while waiting for the participant to start.
pub const WAITING_REPLIES: [&str; 3] = [
    "I understand. If you're ready to begin the cognitive assessment, just let me know by typing \"yes\" or \"ready\".",
    "I'm here to help with cognitive screening and assessment. Would you like to start the evaluation?",
    "Feel free to ask me any questions about the assessment process or our services. When you're ready, we can begin the cognitive evaluation.",
];

pub const ANALYZING: &str =
    "Thank you for completing the cognitive assessment! I'm now analyzing your responses...";

pub const SCHEDULING_INFO: &str = "I'd be happy to help you schedule a consultation! Please visit our About page to fill out the appointment booking form, or you can call our clinic directly at (555) 123-4567. Our specialists are available Monday through Friday, 9 AM to 5 PM.";

pub const SERVICES_INFO: &str = "Our comprehensive diagnostic services include advanced MRI analysis, detailed neuropsychological testing, biomarker analysis, and personalized care planning. Visit our MRI Predictor page to learn more about our AI-powered diagnostic tools.";

pub const CLOSING: &str = "Thank you for using NeuroAsha's cognitive assessment tool. Is there anything else I can help you with today? I can provide information about our services, help schedule appointments, or answer questions about cognitive health.";

const VERDICT: &str = "Overall Assessment: Your cognitive function appears to be within normal ranges for your age group.";

const DISCLAIMER: &str = "⚠️ Important Note: This is a preliminary screening tool and should not replace professional medical evaluation. If you have concerns about memory or cognitive changes, please consult with a healthcare provider.";

const NEXT_STEPS: &str = "Would you like to schedule a consultation with one of our specialists or learn more about our comprehensive diagnostic services?";

/// Acknowledgement sent when the participant agrees to start.
pub fn start_acknowledgement(total: usize) -> String {
    format!(
        "Great! Let's begin the cognitive assessment. I'll ask you {total} questions covering different areas of cognitive function."
    )
}

/// Prompt for the question at `index` following an answer.
pub fn next_question(question: &QuestionSpec, index: usize, total: usize) -> String {
    format!(
        "Thank you for your response. {}",
        question.numbered(index, total)
    )
}

const fn domain_finding(domain: Domain) -> &'static str {
    match domain {
        Domain::Orientation => "Good awareness of time and place",
        Domain::Memory => "Adequate short-term and delayed recall",
        Domain::Attention => "Satisfactory concentration abilities",
        Domain::Language => "Normal verbal fluency",
        Domain::ExecutiveFunction => "Good problem-solving skills",
    }
}

/// The completion summary. Identical for every session.
pub fn completion_summary() -> String {
    let findings = Domain::ALL
        .iter()
        .map(|d| format!("✅ {}: {}", d, domain_finding(*d)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Assessment Complete! \n\nBased on your responses, here's a summary:\n\n{findings}\n\n{VERDICT} \n\n{DISCLAIMER}\n\n{NEXT_STEPS}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_has_seven_questions_opening_with_orientation() {
        assert_eq!(QUESTIONS.len(), 7);
        assert_eq!(QUESTIONS[0].domain, Domain::Orientation);
        assert_eq!(QUESTIONS[6].domain, Domain::ExecutiveFunction);
    }

    #[test]
    fn summary_covers_every_domain() {
        let summary = completion_summary();
        for domain in Domain::ALL {
            assert!(summary.contains(&format!("✅ {domain}:")), "missing {domain}");
        }
        assert!(summary.contains("within normal ranges"));
        assert!(summary.contains("should not replace professional medical evaluation"));
        assert!(summary.ends_with(NEXT_STEPS));
    }

    #[test]
    fn acknowledgement_names_question_count() {
        assert!(start_acknowledgement(7).contains("ask you 7 questions"));
    }
}
