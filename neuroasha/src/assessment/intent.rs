//! Keyword intent detection.
//!
//! Free text is classified by case-insensitive substring containment
//! against ordered rule tables. The first matching rule wins.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// What the participant said while the session awaits its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartIntent {
    Begin,
    NotYet,
}

/// What the participant asked for after completing the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpIntent {
    Schedule,
    Services,
    Other,
}

/// Keywords that start the assessment.
/// NOTE: All keywords must be lowercase since we compare against lowercased input.
const START_KEYWORDS: &[&str] = &["yes", "ready", "start"];

/// Post-completion rules, checked top-down.
const FOLLOW_UP_RULES: &[(&[&str], FollowUpIntent)] = &[
    (&["consultation", "schedule"], FollowUpIntent::Schedule),
    (&["services", "diagnostic"], FollowUpIntent::Services),
];

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Classify a message received before the assessment has begun.
pub fn classify_start(text: &str) -> StartIntent {
    if contains_any(&text.to_lowercase(), START_KEYWORDS) {
        StartIntent::Begin
    } else {
        StartIntent::NotYet
    }
}

/// Classify a message received after the assessment has completed.
pub fn classify_follow_up(text: &str) -> FollowUpIntent {
    let lower = text.to_lowercase();
    FOLLOW_UP_RULES
        .iter()
        .find(|(keywords, _)| contains_any(&lower, keywords))
        .map_or(FollowUpIntent::Other, |(_, intent)| *intent)
}

/// Chooses among equivalent canned replies.
#[derive(Debug, Clone)]
pub enum ResponsePicker {
    /// Cycle through the pool in order.
    Rotating { next: usize },
    /// Uniform choice from a seeded generator.
    Seeded(StdRng),
}

impl ResponsePicker {
    pub const fn rotating() -> Self {
        Self::Rotating { next: 0 }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::Seeded(StdRng::seed_from_u64(seed))
    }

    /// Pick one entry of `pool`. Returns an empty string for an empty pool.
    pub fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        if pool.is_empty() {
            return "";
        }
        let index = match self {
            Self::Rotating { next } => {
                let index = *next % pool.len();
                *next = next.wrapping_add(1);
                index
            }
            Self::Seeded(rng) => rng.random_range(0..pool.len()),
        };
        pool[index]
    }
}

impl Default for ResponsePicker {
    fn default() -> Self {
        Self::rotating()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_keywords_match_case_insensitively() {
        assert_eq!(classify_start("YES"), StartIntent::Begin);
        assert_eq!(classify_start("I'm Ready now"), StartIntent::Begin);
        assert_eq!(classify_start("let's get started"), StartIntent::Begin);
        assert_eq!(classify_start("what is this?"), StartIntent::NotYet);
    }

    #[test]
    fn start_matching_is_substring_containment() {
        // "eyes" contains "yes"; the classifier is deliberately this loose.
        assert_eq!(classify_start("my eyes are tired"), StartIntent::Begin);
    }

    #[test]
    fn scheduling_takes_precedence_over_services() {
        assert_eq!(
            classify_follow_up("Schedule me for your diagnostic services"),
            FollowUpIntent::Schedule
        );
        assert_eq!(
            classify_follow_up("I'd like to schedule a consultation"),
            FollowUpIntent::Schedule
        );
        assert_eq!(
            classify_follow_up("Tell me about DIAGNOSTIC options"),
            FollowUpIntent::Services
        );
        assert_eq!(classify_follow_up("thanks, bye"), FollowUpIntent::Other);
    }

    #[test]
    fn rotating_picker_cycles_pool() {
        let pool = ["a", "b", "c"];
        let mut picker = ResponsePicker::rotating();
        let picked: Vec<_> = (0..4).map(|_| picker.pick(&pool)).collect();
        assert_eq!(picked, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn seeded_picker_is_reproducible() {
        let pool = ["a", "b", "c"];
        let mut first = ResponsePicker::seeded(42);
        let mut second = ResponsePicker::seeded(42);
        for _ in 0..10 {
            let picked = first.pick(&pool);
            assert_eq!(picked, second.pick(&pool));
            assert!(pool.contains(&picked));
        }
    }

    #[test]
    fn empty_pool_yields_empty_reply() {
        assert_eq!(ResponsePicker::rotating().pick(&[]), "");
    }
}
