//! The assessment session state machine.
//!
//! `submit` records the participant's message and decides every reply it
//! provokes up front. Replies wait in a queue until `deliver_next` appends
//! them, so a presentation layer can pace them; the engine counts as busy
//! while anything is queued.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use super::error::SubmitError;
use super::intent::{classify_follow_up, classify_start, FollowUpIntent, ResponsePicker, StartIntent};
use super::script;
use crate::models::{Message, Phase, Progress, QuestionSpec, Sender};

/// How long a queued reply should be held back before it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// First reply to a participant message.
    Thinking,
    /// First question, sent after the start acknowledgement.
    FollowUp,
    /// Completion summary, sent after the analyzing acknowledgement.
    Analysis,
}

/// An assistant reply decided but not yet appended to the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub text: String,
    pub pace: Pace,
}

impl PendingReply {
    fn new(text: impl Into<String>, pace: Pace) -> Self {
        Self {
            text: text.into(),
            pace,
        }
    }
}

/// Construction options for an engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Ordered questions to ask.
    pub script: &'static [QuestionSpec],
    /// Selection among the "waiting to start" replies.
    pub picker: ResponsePicker,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            script: script::QUESTIONS,
            picker: ResponsePicker::default(),
        }
    }
}

/// A single participant's assessment session.
#[derive(Debug)]
pub struct AssessmentEngine {
    script: &'static [QuestionSpec],
    picker: ResponsePicker,
    phase: Phase,
    index: usize,
    transcript: Vec<Message>,
    pending: VecDeque<PendingReply>,
    next_id: u64,
}

impl AssessmentEngine {
    /// Create a session with the greeting already in the transcript.
    pub fn new(options: EngineOptions) -> Self {
        let mut engine = Self {
            script: options.script,
            picker: options.picker,
            phase: Phase::AwaitingStart,
            index: 0,
            transcript: Vec::new(),
            pending: VecDeque::new(),
            next_id: 1,
        };
        engine.append(Sender::Assistant, script::GREETING);
        engine
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// 0-based index of the question being asked; only present while in progress.
    pub const fn current_question_index(&self) -> Option<usize> {
        match self.phase {
            Phase::InProgress => Some(self.index),
            _ => None,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// True while replies to the last submission are still queued.
    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    pub const fn total_questions(&self) -> usize {
        self.script.len()
    }

    pub const fn progress(&self) -> Progress {
        let total = self.script.len();
        let current = match self.phase {
            Phase::AwaitingStart => 0,
            Phase::InProgress => self.index + 1,
            Phase::Completed => total,
        };
        Progress::new(current, total)
    }

    /// Pace of the reply `deliver_next` would append.
    pub fn next_pace(&self) -> Option<Pace> {
        self.pending.front().map(|r| r.pace)
    }

    /// Record a participant message and queue the replies it provokes.
    ///
    /// Returns the appended participant message. Blank input and input
    /// arriving while replies are queued are rejected without touching the
    /// transcript.
    pub fn submit(&mut self, text: &str) -> Result<Message, SubmitError> {
        if text.trim().is_empty() {
            warn!("Rejected empty submission");
            return Err(SubmitError::EmptyInput);
        }
        if self.is_busy() {
            warn!(pending = self.pending.len(), "Rejected submission while busy");
            return Err(SubmitError::BusySubmission);
        }

        let message = self.append(Sender::Participant, text).clone();
        debug!(id = message.id, phase = %self.phase, len = text.len(), "Participant message");

        match self.phase {
            Phase::AwaitingStart => self.on_awaiting_start(text),
            Phase::InProgress => self.on_answer(),
            Phase::Completed => self.on_follow_up(text),
        }

        Ok(message)
    }

    /// Append the next queued reply, if any.
    pub fn deliver_next(&mut self) -> Option<Message> {
        let reply = self.pending.pop_front()?;
        let message = self.append(Sender::Assistant, reply.text).clone();
        debug!(id = message.id, pace = ?reply.pace, remaining = self.pending.len(), "Delivered reply");
        Some(message)
    }

    /// Submit and deliver every reply immediately.
    pub fn respond(&mut self, text: &str) -> Result<Vec<Message>, SubmitError> {
        self.submit(text)?;
        Ok(std::iter::from_fn(|| self.deliver_next()).collect())
    }

    fn append(&mut self, sender: Sender, text: impl Into<String>) -> &Message {
        let message = Message::new(self.next_id, sender, text);
        self.next_id += 1;
        self.transcript.push(message);
        &self.transcript[self.transcript.len() - 1]
    }

    fn queue(&mut self, text: impl Into<String>, pace: Pace) {
        self.pending.push_back(PendingReply::new(text, pace));
    }

    fn transition(&mut self, to: Phase) {
        debug_assert!(to > self.phase, "phase may only move forward");
        info!(from = %self.phase, to = %to, "Assessment phase changed");
        self.phase = to;
    }

    fn on_awaiting_start(&mut self, text: &str) {
        match classify_start(text) {
            StartIntent::Begin => {
                let total = self.total_questions();
                self.queue(script::start_acknowledgement(total), Pace::Thinking);
                match self.script.first().copied() {
                    Some(first) => {
                        self.transition(Phase::InProgress);
                        self.index = 0;
                        self.queue(first.numbered(0, total), Pace::FollowUp);
                    }
                    None => self.complete(Pace::FollowUp),
                }
            }
            StartIntent::NotYet => {
                let reply = self.picker.pick(&script::WAITING_REPLIES);
                self.queue(reply, Pace::Thinking);
            }
        }
    }

    fn on_answer(&mut self) {
        let total = self.total_questions();
        if self.index + 1 < total {
            self.index += 1;
            let question = self.script[self.index];
            debug!(index = self.index, domain = %question.domain, "Advancing to next question");
            self.queue(script::next_question(&question, self.index, total), Pace::Thinking);
        } else {
            self.complete(Pace::Thinking);
        }
    }

    fn complete(&mut self, pace: Pace) {
        self.transition(Phase::Completed);
        self.queue(script::ANALYZING, pace);
        self.queue(script::completion_summary(), Pace::Analysis);
    }

    fn on_follow_up(&mut self, text: &str) {
        let reply = match classify_follow_up(text) {
            FollowUpIntent::Schedule => script::SCHEDULING_INFO,
            FollowUpIntent::Services => script::SERVICES_INFO,
            FollowUpIntent::Other => script::CLOSING,
        };
        self.queue(reply, Pace::Thinking);
    }
}

impl Default for AssessmentEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Domain, ResponseKind};

    const ANSWERS: [&str; 7] = [
        "March 5 2024",
        "Pune, India",
        "apple penny table",
        "93 86 79 72 65",
        "apple, penny, table",
        "cat, dog, horse",
        "$54",
    ];

    fn started() -> AssessmentEngine {
        let mut engine = AssessmentEngine::default();
        engine.respond("yes").unwrap();
        engine
    }

    fn completed() -> AssessmentEngine {
        let mut engine = started();
        for answer in ANSWERS {
            engine.respond(answer).unwrap();
        }
        engine
    }

    #[test]
    fn new_session_opens_with_greeting() {
        let engine = AssessmentEngine::default();
        assert_eq!(engine.phase(), Phase::AwaitingStart);
        assert_eq!(engine.current_question_index(), None);
        assert!(!engine.is_busy());
        assert_eq!(engine.transcript().len(), 1);
        assert_eq!(engine.transcript()[0].id, 1);
        assert_eq!(engine.transcript()[0].text, script::GREETING);
        assert!(engine.transcript()[0].is_assistant());
    }

    #[test]
    fn yes_starts_assessment() {
        let mut engine = AssessmentEngine::default();
        let replies = engine.respond("yes").unwrap();

        assert_eq!(engine.phase(), Phase::InProgress);
        assert_eq!(engine.current_question_index(), Some(0));
        assert_eq!(replies.len(), 2);
        assert!(replies[0].text.contains("7 questions"));
        assert!(replies[1].text.starts_with("Question 1 of 7 - Orientation: "));
    }

    #[test]
    fn answer_advances_to_next_question() {
        let mut engine = started();
        let replies = engine.respond("March 5 2024").unwrap();

        assert_eq!(engine.current_question_index(), Some(1));
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("Question 2 of 7 - Orientation"));
        assert!(replies[0].text.starts_with("Thank you for your response."));
    }

    #[test]
    fn seventh_answer_completes_with_summary() {
        let mut engine = started();
        for answer in &ANSWERS[..6] {
            engine.respond(answer).unwrap();
        }
        assert_eq!(engine.current_question_index(), Some(6));

        let replies = engine.respond(ANSWERS[6]).unwrap();
        assert_eq!(engine.phase(), Phase::Completed);
        assert_eq!(engine.current_question_index(), None);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].text, script::ANALYZING);
        assert_eq!(replies[1].text, script::completion_summary());
        assert!(replies[1].text.contains("Executive Function"));
    }

    #[test]
    fn completed_session_routes_follow_ups() {
        let mut engine = completed();

        let replies = engine.respond("I'd like to schedule a consultation").unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("(555) 123-4567"));

        let replies = engine.respond("what diagnostic services exist?").unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, script::SERVICES_INFO);

        let replies = engine.respond("thanks").unwrap();
        assert_eq!(replies[0].text, script::CLOSING);
        assert_eq!(engine.phase(), Phase::Completed);
    }

    #[test]
    fn whitespace_is_rejected_in_every_phase() {
        for mut engine in [AssessmentEngine::default(), started(), completed()] {
            let before = engine.transcript().to_vec();
            assert_eq!(engine.submit("   \t\n"), Err(SubmitError::EmptyInput));
            assert_eq!(engine.submit(""), Err(SubmitError::EmptyInput));
            assert_eq!(engine.transcript(), before.as_slice());
            assert!(!engine.is_busy());
        }
    }

    #[test]
    fn busy_engine_rejects_submissions() {
        let mut engine = AssessmentEngine::default();
        engine.submit("ready").unwrap();
        assert!(engine.is_busy());
        let len = engine.transcript().len();

        assert_eq!(engine.submit("hello?"), Err(SubmitError::BusySubmission));
        assert_eq!(engine.transcript().len(), len);

        assert!(engine.deliver_next().is_some());
        assert!(engine.is_busy(), "still busy until the question is delivered");
        assert!(engine.deliver_next().is_some());
        assert!(!engine.is_busy());
        assert!(engine.deliver_next().is_none());
    }

    #[test]
    fn replies_carry_their_pacing() {
        let mut engine = AssessmentEngine::default();
        engine.submit("start").unwrap();
        assert_eq!(engine.next_pace(), Some(Pace::Thinking));
        engine.deliver_next();
        assert_eq!(engine.next_pace(), Some(Pace::FollowUp));
        engine.deliver_next();

        for answer in &ANSWERS[..6] {
            engine.respond(answer).unwrap();
        }
        engine.submit(ANSWERS[6]).unwrap();
        assert_eq!(engine.next_pace(), Some(Pace::Thinking));
        engine.deliver_next();
        assert_eq!(engine.next_pace(), Some(Pace::Analysis));
    }

    #[test]
    fn no_keyword_keeps_waiting_and_rotates_replies() {
        let mut engine = AssessmentEngine::default();
        let mut seen = Vec::new();
        for text in ["hello", "what is this", "who are you", "hmm"] {
            let replies = engine.respond(text).unwrap();
            assert_eq!(replies.len(), 1);
            assert_eq!(engine.phase(), Phase::AwaitingStart);
            seen.push(replies[0].text.clone());
        }
        assert_eq!(seen[0], script::WAITING_REPLIES[0]);
        assert_eq!(seen[1], script::WAITING_REPLIES[1]);
        assert_eq!(seen[2], script::WAITING_REPLIES[2]);
        assert_eq!(seen[3], script::WAITING_REPLIES[0]);
    }

    #[test]
    fn seeded_picker_stays_within_pool() {
        let mut engine = AssessmentEngine::new(EngineOptions {
            picker: ResponsePicker::seeded(7),
            ..EngineOptions::default()
        });
        let replies = engine.respond("hello").unwrap();
        assert!(script::WAITING_REPLIES.contains(&replies[0].text.as_str()));
    }

    #[test]
    fn phase_only_moves_forward_and_asks_each_question_once() {
        let mut engine = AssessmentEngine::default();
        let mut phases = vec![engine.phase()];
        let mut indices = Vec::new();

        for text in ["no", "maybe", "yes"].into_iter().chain(ANSWERS).chain(["schedule", "yes"]) {
            engine.respond(text).unwrap();
            phases.push(engine.phase());
            if let Some(index) = engine.current_question_index() {
                indices.push(index);
            }
        }

        assert!(phases.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(phases.last(), Some(&Phase::Completed));
        assert_eq!(indices, (0..7).collect::<Vec<_>>());

        let question_prompts = engine
            .transcript()
            .iter()
            .filter(|m| m.is_assistant() && m.text.contains(" of 7 - "))
            .count();
        assert_eq!(question_prompts, 7);
    }

    #[test]
    fn ids_strictly_increase_and_participant_precedes_replies() {
        let mut engine = AssessmentEngine::default();
        let participant = engine.submit("yes").unwrap();
        let replies: Vec<_> = std::iter::from_fn(|| engine.deliver_next()).collect();

        assert_eq!(participant.sender, Sender::Participant);
        assert!(replies.iter().all(|r| r.id > participant.id));
        assert!(engine.transcript().windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn transcript_reads_are_idempotent() {
        let engine = completed();
        assert_eq!(engine.transcript(), engine.transcript());
        assert_eq!(engine.transcript().to_vec(), engine.transcript().to_vec());
    }

    #[test]
    fn progress_tracks_phase() {
        let mut engine = AssessmentEngine::default();
        assert_eq!(engine.progress(), Progress::new(0, 7));
        engine.respond("yes").unwrap();
        assert_eq!(engine.progress(), Progress::new(1, 7));
        engine.respond(ANSWERS[0]).unwrap();
        assert_eq!(engine.progress(), Progress::new(2, 7));
        assert_eq!(completed().progress().percent(), 100);
    }

    #[test]
    fn answers_are_never_scored() {
        let careful = completed();
        let mut careless = started();
        for _ in 0..7 {
            careless.respond("I don't know").unwrap();
        }
        let summary = |e: &AssessmentEngine| e.transcript().last().unwrap().text.clone();
        assert_eq!(summary(&careful), summary(&careless));
    }

    #[test]
    fn custom_script_is_honoured() {
        static SHORT: &[QuestionSpec] = &[QuestionSpec::new(
            "What year is it?",
            Domain::Orientation,
            ResponseKind::Date,
        )];
        let mut engine = AssessmentEngine::new(EngineOptions {
            script: SHORT,
            ..EngineOptions::default()
        });
        let replies = engine.respond("ready").unwrap();
        assert_eq!(replies[1].text, "Question 1 of 1 - Orientation: What year is it?");

        let replies = engine.respond("2024").unwrap();
        assert_eq!(engine.phase(), Phase::Completed);
        assert_eq!(replies.len(), 2);
    }

    #[test]
    fn empty_script_completes_on_start() {
        let mut engine = AssessmentEngine::new(EngineOptions {
            script: &[],
            ..EngineOptions::default()
        });
        let replies = engine.respond("yes").unwrap();
        assert_eq!(engine.phase(), Phase::Completed);
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[1].text, script::ANALYZING);
    }
}
