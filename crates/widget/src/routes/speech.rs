//! WebSocket transport for the listening session.
//!
//! Recognition happens in the browser; this socket carries transcript
//! events server-side so the idle timeout and cancellation live in one
//! place. The socket never touches the cart: once the session finalizes,
//! the server replies with the final transcript and a parse preview, and
//! the widget POSTs `/api/assistant` over plain HTTP where the session
//! cookie applies.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vocalshop_core::ParsedQuery;

use crate::nlu;
use crate::speech::{SessionEvent, SpeechSession, TranscriptEvent};
use crate::state::AppState;

/// Messages the widget sends over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Interim { text: String },
    Final { text: String },
    Stop,
    Cancel,
}

/// Messages the server sends back.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    /// Listening ended; `query` is a preview of how the transcript parses.
    FinalTranscript { text: String, query: ParsedQuery },
    Cancelled,
}

/// Upgrade to a listening session socket.
pub async fn upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_session(state, socket))
}

async fn run_session(state: AppState, mut socket: WebSocket) {
    let (session, mut events) =
        SpeechSession::start(state.config().speech_idle_timeout);

    let outcome = loop {
        tokio::select! {
            event = events.recv() => {
                // The session task always emits exactly one event.
                break event.unwrap_or(SessionEvent::Cancelled);
            }
            message = socket.recv() => match message {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::Interim { text }) => {
                            session.push(TranscriptEvent::Interim(text)).await;
                        }
                        Ok(ClientMessage::Final { text }) => {
                            session.push(TranscriptEvent::Final(text)).await;
                        }
                        Ok(ClientMessage::Stop) => session.stop().await,
                        Ok(ClientMessage::Cancel) => session.cancel().await,
                        Err(error) => {
                            debug!(%error, "ignoring malformed speech message");
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    session.cancel().await;
                    break events.recv().await.unwrap_or(SessionEvent::Cancelled);
                }
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    warn!(%error, "speech socket error");
                    session.cancel().await;
                    break events.recv().await.unwrap_or(SessionEvent::Cancelled);
                }
            },
        }
    };

    let reply = match outcome {
        SessionEvent::Finalized(text) => {
            let query = nlu::parse_utterance(&text, state.policy().price_around_margin);
            ServerMessage::FinalTranscript { text, query }
        }
        SessionEvent::Cancelled => ServerMessage::Cancelled,
    };

    match serde_json::to_string(&reply) {
        Ok(json) => {
            if let Err(error) = socket.send(Message::Text(json.into())).await {
                debug!(%error, "speech socket closed before final message");
            }
        }
        Err(error) => warn!(%error, "failed to serialize speech reply"),
    }
    let _ = socket.send(Message::Close(None)).await;
}
