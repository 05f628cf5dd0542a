//! Cancellable speech-transcript session.
//!
//! Speech recognition itself happens in the browser; the server side only
//! models the listening session: a long-lived, cancellable task that
//! receives interim and final transcript events, auto-stops after an idle
//! timeout with no events, and emits the accumulated final text exactly
//! once. The session is entirely decoupled from parsing and matching,
//! which stay pure and synchronous.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// A transcript fragment delivered by the recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// Unstable partial text; resets the idle timer but is not accumulated.
    Interim(String),
    /// Stable text, appended to the accumulated transcript.
    Final(String),
}

/// Terminal outcome of a listening session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Listening ended with accumulated final text.
    Finalized(String),
    /// Listening ended with nothing to process.
    Cancelled,
}

enum Command {
    Transcript(TranscriptEvent),
    Stop,
    Cancel,
}

/// Handle to a running listening session.
///
/// Dropping the handle cancels the session.
pub struct SpeechSession {
    tx: mpsc::Sender<Command>,
}

impl SpeechSession {
    /// Start a listening session that finalizes after `idle_timeout`
    /// without any transcript event.
    ///
    /// The returned receiver yields exactly one [`SessionEvent`].
    #[must_use]
    pub fn start(idle_timeout: Duration) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (tx, mut rx) = mpsc::channel::<Command>(16);
        let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(1);

        tokio::spawn(async move {
            let mut accumulated = String::new();
            let mut deadline = Instant::now() + idle_timeout;

            let outcome = loop {
                tokio::select! {
                    command = rx.recv() => match command {
                        Some(Command::Transcript(event)) => {
                            deadline = Instant::now() + idle_timeout;
                            match event {
                                TranscriptEvent::Interim(text) => {
                                    debug!(len = text.len(), "interim transcript");
                                }
                                TranscriptEvent::Final(text) => {
                                    if !accumulated.is_empty() {
                                        accumulated.push(' ');
                                    }
                                    accumulated.push_str(text.trim());
                                }
                            }
                        }
                        Some(Command::Stop) => break finalize(accumulated),
                        // Explicit cancel or all handles dropped.
                        Some(Command::Cancel) | None => break SessionEvent::Cancelled,
                    },
                    () = sleep_until(deadline) => {
                        debug!("listening idle timeout reached");
                        break finalize(accumulated);
                    }
                }
            };

            // Receiver may already be gone; nothing to do then.
            let _ = event_tx.send(outcome).await;
        });

        (Self { tx }, event_rx)
    }

    /// Push a transcript event into the session. Ignored once the session
    /// has ended.
    pub async fn push(&self, event: TranscriptEvent) {
        let _ = self.tx.send(Command::Transcript(event)).await;
    }

    /// Stop listening and finalize with whatever was accumulated.
    pub async fn stop(&self) {
        let _ = self.tx.send(Command::Stop).await;
    }

    /// Cancel the session, discarding any accumulated text.
    pub async fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel).await;
    }
}

fn finalize(accumulated: String) -> SessionEvent {
    if accumulated.trim().is_empty() {
        SessionEvent::Cancelled
    } else {
        SessionEvent::Finalized(accumulated)
    }
}
