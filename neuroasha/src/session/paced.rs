//! Paced delivery of assistant replies.
//!
//! Wraps an [`AssessmentEngine`] so queued replies appear after a simulated
//! thinking time. Every appended message is published on a broadcast
//! channel for observers such as WebSocket clients.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::assessment::{AssessmentEngine, EngineOptions, Pace, SubmitError};
use crate::config::PacingConfig;
use crate::models::{Message, Phase, Progress};

/// Delays applied before each kind of reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub thinking: Duration,
    pub follow_up: Duration,
    pub analysis: Duration,
}

impl Pacing {
    /// No delays at all, for non-interactive use.
    pub const fn instant() -> Self {
        Self {
            thinking: Duration::ZERO,
            follow_up: Duration::ZERO,
            analysis: Duration::ZERO,
        }
    }

    pub const fn delay(&self, pace: Pace) -> Duration {
        match pace {
            Pace::Thinking => self.thinking,
            Pace::FollowUp => self.follow_up,
            Pace::Analysis => self.analysis,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from(&PacingConfig::default())
    }
}

impl From<&PacingConfig> for Pacing {
    fn from(config: &PacingConfig) -> Self {
        Self {
            thinking: Duration::from_millis(config.thinking_ms),
            follow_up: Duration::from_millis(config.follow_up_ms),
            analysis: Duration::from_millis(config.analysis_ms),
        }
    }
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub busy: bool,
    pub current_question_index: Option<usize>,
    pub progress: Progress,
    pub transcript: Vec<Message>,
}

/// An assessment session whose replies arrive over time.
pub struct PacedSession {
    engine: Arc<Mutex<AssessmentEngine>>,
    pacing: Pacing,
    tx: broadcast::Sender<Message>,
    delivery: Mutex<Option<JoinHandle<()>>>,
    created_at: DateTime<Utc>,
}

impl PacedSession {
    pub fn new(options: EngineOptions, pacing: Pacing) -> Self {
        let (tx, _rx) = broadcast::channel(256);
        Self {
            engine: Arc::new(Mutex::new(AssessmentEngine::new(options))),
            pacing,
            tx,
            delivery: Mutex::new(None),
            created_at: Utc::now(),
        }
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Receive every message appended from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.tx.subscribe()
    }

    /// Record a participant message and start delivering its replies.
    ///
    /// The participant message is appended before this returns; replies
    /// follow on a background task. Must be called within a tokio runtime.
    pub async fn submit(&self, text: &str) -> Result<Message, SubmitError> {
        let (message, first) = {
            let mut engine = self.engine.lock().await;
            let message = engine.submit(text)?;
            (message, engine.next_pace())
        };
        let _ = self.tx.send(message.clone());

        if let Some(pace) = first {
            let handle = tokio::spawn(deliver_pending(
                Arc::clone(&self.engine),
                self.pacing,
                self.tx.clone(),
                pace,
            ));
            *self.delivery.lock().await = Some(handle);
        }

        Ok(message)
    }

    /// Wait until every reply to the last submission has been appended.
    pub async fn wait_idle(&self) {
        let handle = self.delivery.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Reply delivery task failed: {e}");
            }
        }
    }

    pub async fn is_busy(&self) -> bool {
        self.engine.lock().await.is_busy()
    }

    pub async fn transcript(&self) -> Vec<Message> {
        self.engine.lock().await.transcript().to_vec()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let engine = self.engine.lock().await;
        SessionSnapshot {
            phase: engine.phase(),
            busy: engine.is_busy(),
            current_question_index: engine.current_question_index(),
            progress: engine.progress(),
            transcript: engine.transcript().to_vec(),
        }
    }
}

/// Deliver queued replies one by one until the queue drains.
///
/// The queue is checked and the reply published in the same critical
/// section as each delivery, so once the engine reports idle every reply
/// is already on the channel.
async fn deliver_pending(
    engine: Arc<Mutex<AssessmentEngine>>,
    pacing: Pacing,
    tx: broadcast::Sender<Message>,
    mut pace: Pace,
) {
    loop {
        let delay = pacing.delay(pace);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let next = {
            let mut engine = engine.lock().await;
            let Some(message) = engine.deliver_next() else {
                break;
            };
            debug!(id = message.id, "Reply published");
            let _ = tx.send(message);
            engine.next_pace()
        };

        match next {
            Some(p) => pace = p,
            None => break,
        }
    }
}
