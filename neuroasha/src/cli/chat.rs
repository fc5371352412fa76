//! Terminal chat front-ends: a local session or one hosted by a server.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::warn;
use uuid::Uuid;

use crate::assessment::{EngineOptions, ResponsePicker, SubmitError};
use crate::models::{Message, Phase, Progress, Sender};
use crate::server::{ErrorBody, SessionView, SubmitRequest};
use crate::session::{PacedSession, Pacing};

const QUIT: &str = "/quit";
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Render one transcript entry for the terminal.
pub fn format_message(message: &Message) -> String {
    let who = match message.sender {
        Sender::Assistant => "NeuroAsha",
        Sender::Participant => "You",
    };
    format!("[{}] {who}: {}", message.clock_time(), message.text)
}

fn print_progress(phase: Phase, progress: Progress) {
    if phase == Phase::InProgress {
        println!("  Assessment progress: {progress}");
    }
}

fn print_banner() {
    println!("NeuroAsha cognitive assessment");
    println!("This is a preliminary screening tool, not a diagnostic test.");
    println!("Type your answers and press Enter. {QUIT} or Ctrl-D to leave.");
    println!();
}

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Read the next line worth submitting. `None` means the participant left.
async fn next_input(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    loop {
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            return Ok(None);
        };
        let line = line.trim();
        if line == QUIT {
            return Ok(None);
        }
        if !line.is_empty() {
            return Ok(Some(line.to_string()));
        }
    }
}

// === Local ===

/// Hand every assistant reply to the last submission to `on_reply`, as it arrives.
///
/// Returns once the session is idle and the channel holds nothing more.
async fn receive_replies(
    session: &PacedSession,
    rx: &mut broadcast::Receiver<Message>,
    mut on_reply: impl FnMut(&Message),
) -> Result<()> {
    loop {
        let message = rx.recv().await.context("Session closed unexpectedly")?;
        if message.is_assistant() {
            on_reply(&message);
        }
        if !session.is_busy().await {
            break;
        }
    }

    // Replies published before the idle check may still be buffered.
    loop {
        match rx.try_recv() {
            Ok(message) if message.is_assistant() => on_reply(&message),
            Ok(_) => {}
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "Terminal fell behind the session");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

/// Run a session in-process.
pub async fn run_local(pacing: Pacing, fallback_seed: Option<u64>) -> Result<()> {
    let options = EngineOptions {
        picker: fallback_seed.map_or_else(ResponsePicker::rotating, ResponsePicker::seeded),
        ..EngineOptions::default()
    };
    let session = PacedSession::new(options, pacing);
    let mut rx = session.subscribe();
    let mut lines = stdin_lines();

    print_banner();
    for message in session.transcript().await {
        println!("{}", format_message(&message));
    }

    while let Some(input) = next_input(&mut lines).await? {
        match session.submit(&input).await {
            Ok(_) => {}
            Err(SubmitError::EmptyInput) => continue,
            Err(e @ SubmitError::BusySubmission) => bail!("{e}"),
        }

        println!("  NeuroAsha is typing...");
        receive_replies(&session, &mut rx, |message| {
            println!("{}", format_message(message));
        })
        .await?;

        let snapshot = session.snapshot().await;
        print_progress(snapshot.phase, snapshot.progress);
    }

    println!("Goodbye.");
    Ok(())
}

// === Remote ===

/// A session hosted by `neuroasha serve`.
struct RemoteSession {
    client: reqwest::Client,
    base_url: String,
    id: Uuid,
}

impl RemoteSession {
    async fn create(base_url: &str) -> Result<(Self, SessionView)> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base_url}/api/sessions"))
            .send()
            .await
            .with_context(|| format!("Failed to reach server at {base_url}"))?;
        if !resp.status().is_success() {
            bail!("Server returned {}", resp.status());
        }

        let view: SessionView = resp.json().await.context("Failed to parse session")?;
        Ok((
            Self {
                client,
                base_url,
                id: view.id,
            },
            view,
        ))
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/api/sessions/{}{suffix}", self.base_url, self.id)
    }

    /// Submit a message. Rejections come back as `Ok(Some(reason))`.
    async fn submit(&self, text: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .post(self.url("/messages"))
            .json(&SubmitRequest {
                text: text.to_string(),
            })
            .send()
            .await
            .context("Failed to submit message")?;

        if resp.status().is_success() {
            return Ok(None);
        }
        if resp.status().is_client_error() {
            let body: ErrorBody = resp.json().await.context("Failed to parse error")?;
            return Ok(Some(body.message));
        }
        bail!("Server returned {}", resp.status())
    }

    async fn fetch(&self) -> Result<SessionView> {
        let resp = self
            .client
            .get(self.url(""))
            .send()
            .await
            .context("Failed to fetch session")?;
        if !resp.status().is_success() {
            bail!("Server returned {}", resp.status());
        }
        resp.json().await.context("Failed to parse session")
    }

    /// Poll until the assistant has finished replying.
    async fn wait_idle(&self) -> Result<SessionView> {
        loop {
            let view = self.fetch().await?;
            if !view.snapshot.busy {
                return Ok(view);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn discard(&self) -> Result<()> {
        self.client
            .delete(self.url(""))
            .send()
            .await
            .context("Failed to discard session")?;
        Ok(())
    }
}

/// Run a session hosted by a server.
pub async fn run_remote(base_url: &str) -> Result<()> {
    let (remote, view) = RemoteSession::create(base_url).await?;
    let mut lines = stdin_lines();

    print_banner();
    let mut last_seen = 0;
    for message in &view.snapshot.transcript {
        println!("{}", format_message(message));
        last_seen = message.id;
    }

    while let Some(input) = next_input(&mut lines).await? {
        if let Some(reason) = remote.submit(&input).await? {
            println!("  ({reason})");
            continue;
        }

        println!("  NeuroAsha is typing...");
        let view = remote.wait_idle().await?;
        for message in &view.snapshot.transcript {
            if message.id <= last_seen {
                continue;
            }
            if message.is_assistant() {
                println!("{}", format_message(message));
            }
            last_seen = message.id;
        }
        print_progress(view.snapshot.phase, view.snapshot.progress);
    }

    remote.discard().await?;
    println!("Goodbye.");
    Ok(())
}
