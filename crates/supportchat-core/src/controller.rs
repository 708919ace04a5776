//! One-turn-at-a-time conversation controller.
//!
//! The controller owns the conversation log and the request state. A turn is
//! started with [`ChatController::begin`], which hands back the request to
//! send, and finished with [`ChatController::settle`]. Frontends that run the
//! request on a background task call those two directly; everything else can
//! use [`ChatController::submit`].

use serde_json::Value;

use crate::client::{ChatBackend, ChatRequest, ChatResponse, ClientError};
use crate::state::{ChatMessage, ChatRole, ConversationLog, RequestState};

pub const API_ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";
pub const TRANSPORT_ERROR_MESSAGE: &str =
    "Sorry, I'm having trouble connecting. Please check your connection and try again.";

/// How an outstanding request finished
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Reply(String),
    /// The backend answered but flagged an error.
    ApiError(Value),
    /// The exchange itself failed (connection, unreadable body).
    TransportError(String),
}

impl From<Result<ChatResponse, ClientError>> for ChatOutcome {
    fn from(result: Result<ChatResponse, ClientError>) -> Self {
        match result {
            Ok(response) => match response.api_error() {
                Some(error) => ChatOutcome::ApiError(error.clone()),
                None => ChatOutcome::Reply(response.reply_text()),
            },
            Err(e) => ChatOutcome::TransportError(e.to_string()),
        }
    }
}

/// Which kind of agent entry a settled turn produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Replied,
    ApiError,
    TransportError,
}

impl Settlement {
    pub fn is_error(&self) -> bool {
        !matches!(self, Settlement::Replied)
    }
}

#[derive(Debug, Default)]
pub struct ChatController {
    log: ConversationLog,
    state: RequestState,
}

impl ChatController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Start a turn. Returns `None` without touching any state when a request
    /// is already pending or the text is blank.
    pub fn begin(&mut self, text: &str) -> Option<ChatRequest> {
        let message = text.trim();
        if self.state.is_pending() {
            tracing::debug!("ignoring submission while a response is pending");
            return None;
        }
        if message.is_empty() {
            tracing::debug!("ignoring empty submission");
            return None;
        }

        self.log.push(ChatRole::User, message);
        self.state = RequestState::Pending;
        tracing::info!(entries = self.log.len(), "chat turn started");

        Some(ChatRequest {
            message: message.to_string(),
            history: self.log.entries().to_vec(),
        })
    }

    /// Finish the pending turn by appending exactly one agent entry and
    /// returning to idle. Ignored if nothing is pending.
    pub fn settle(&mut self, outcome: ChatOutcome) -> Option<Settlement> {
        if !self.state.is_pending() {
            tracing::warn!("received a chat outcome with no request pending");
            return None;
        }

        let settlement = match outcome {
            ChatOutcome::Reply(text) => {
                self.log.push(ChatRole::Agent, text);
                Settlement::Replied
            }
            ChatOutcome::ApiError(error) => {
                tracing::warn!(%error, "support backend returned an error");
                self.log.push(ChatRole::Agent, API_ERROR_MESSAGE);
                Settlement::ApiError
            }
            ChatOutcome::TransportError(error) => {
                tracing::error!(%error, "chat request failed");
                self.log.push(ChatRole::Agent, TRANSPORT_ERROR_MESSAGE);
                Settlement::TransportError
            }
        };

        self.state = RequestState::Idle;
        tracing::info!(?settlement, entries = self.log.len(), "chat turn settled");
        Some(settlement)
    }

    /// Run a whole turn inline: one request, no retry.
    pub async fn submit<B>(&mut self, backend: &B, text: &str) -> Option<Settlement>
    where
        B: ChatBackend + ?Sized,
    {
        let request = self.begin(text)?;
        let outcome = ChatOutcome::from(backend.send(&request).await);
        self.settle(outcome)
    }

    /// The most recent agent entry, if any
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.log
            .entries()
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Agent)
    }
}
