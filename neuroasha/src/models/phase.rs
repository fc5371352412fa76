//! Session phase and progress.

use serde::{Deserialize, Serialize};

/// Coarse stage of a session. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Opening message shown, waiting for the participant to agree to begin.
    AwaitingStart,
    /// Questions are being asked.
    InProgress,
    /// All questions answered; summary delivered or pending.
    Completed,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingStart => "awaiting_start",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of how far through the script a session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// 1-based number of the question currently asked; 0 before start, `total` once completed.
    pub current: usize,
    /// Number of questions in the script.
    pub total: usize,
}

impl Progress {
    pub const fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }

    /// Whole-number percentage for a progress bar.
    pub const fn percent(self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.current * 100 / self.total
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} ({}%)", self.current, self.total, self.percent())
    }
}
