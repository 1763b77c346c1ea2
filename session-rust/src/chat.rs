use crate::state::lock;
use drivegen_sdk::{
    api::{ChatRequest, ChatResponse, CHAT_PATH},
    call, ChatMessage, ClientError, ClientResult, Transport, TransportRequest,
};
use std::sync::{Arc, Mutex};
use tracing::{debug, info_span, warn};
use tracing_futures::Instrument;

pub const INITIAL_GREETING: &str = "Hello! I'm your automotive design assistant. Ask me anything \
     about car design, automotive history, emerging technologies, or concept vehicles. I can help \
     you brainstorm ideas for your next automotive project!";

pub const CLEARED_GREETING: &str =
    "Chat cleared! How can I help you with automotive design today?";

const SUGGESTED_QUESTIONS: [&str; 4] = [
    "What's the future of electric vehicle design?",
    "Tell me about the history of sports car aerodynamics",
    "What materials are used in modern car interiors?",
    "How do autonomous vehicles influence interior design?",
];

struct ChatState {
    messages: Vec<ChatMessage>,
    sending: bool,
    /// Bumped by `clear`, so a reply to a pre-clear turn is discarded.
    epoch: u64,
}

/// A multi-turn conversation with the assistant.
///
/// The transcript only grows: each `send` appends the user turn right away,
/// then exactly one assistant turn once the call resolves. Failures become an
/// assistant turn carrying the error text instead of an `Err`. The service
/// keeps no conversation state, so every call carries the whole transcript.
pub struct ChatSession {
    transport: Arc<dyn Transport>,
    context: Option<String>,
    state: Mutex<ChatState>,
}

impl ChatSession {
    /// Start a conversation with the standard greeting.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_transcript(transport, vec![ChatMessage::assistant(INITIAL_GREETING)])
    }

    /// Continue an existing conversation.
    pub fn with_transcript(transport: Arc<dyn Transport>, transcript: Vec<ChatMessage>) -> Self {
        Self {
            transport,
            context: None,
            state: Mutex::new(ChatState {
                messages: transcript,
                sending: false,
                epoch: 0,
            }),
        }
    }

    /// Extra context forwarded with every turn.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = (!context.trim().is_empty()).then_some(context);
        self
    }

    /// Snapshot of the transcript, including a pending user turn.
    #[must_use]
    pub fn transcript(&self) -> Vec<ChatMessage> {
        lock(&self.state).messages.clone()
    }

    #[must_use]
    pub fn is_sending(&self) -> bool {
        lock(&self.state).sending
    }

    #[must_use]
    pub fn suggested_questions() -> &'static [&'static str] {
        &SUGGESTED_QUESTIONS
    }

    /// Replace the transcript with a single greeting.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.messages = vec![ChatMessage::assistant(CLEARED_GREETING)];
        state.epoch += 1;
    }

    /// Send one user turn and return the transcript after the reply.
    ///
    /// Blank input, or input arriving while another turn is pending, leaves
    /// the transcript unchanged and sends nothing.
    pub async fn send(&self, message: &str) -> Vec<ChatMessage> {
        if message.trim().is_empty() {
            return self.transcript();
        }

        let (messages, epoch) = {
            let mut state = lock(&self.state);
            if state.sending {
                debug!("chat turn already in flight, ignoring send");
                return state.messages.clone();
            }
            state.messages.push(ChatMessage::user(message));
            state.sending = true;
            (state.messages.clone(), state.epoch)
        };
        let guard = SendingGuard {
            state: &self.state,
            epoch,
            resolved: false,
        };

        let span = info_span!("drivegen.chat", turns = messages.len());
        let reply = match self.request_reply(messages).instrument(span).await {
            Ok(content) => ChatMessage::assistant(content),
            Err(error) => {
                warn!(%error, "chat turn failed");
                ChatMessage::assistant(format!("Error: {}", error.user_message()))
            }
        };

        guard.resolve(reply)
    }

    async fn request_reply(&self, messages: Vec<ChatMessage>) -> ClientResult<String> {
        let request = TransportRequest::post(
            CHAT_PATH,
            &ChatRequest {
                messages,
                context: self.context.clone(),
            },
        )?;
        let response: ChatResponse = call(self.transport.as_ref(), request, "chat").await?;

        response
            .response
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                ClientError::Invariant("chat", "The assistant returned an empty reply".into())
            })
    }
}

const ABANDONED_REPLY: &str = "Error: The request was abandoned before a reply arrived";

/// Holds the pending turn. Every pending user turn gets exactly one assistant
/// turn, even when the `send` future is dropped early.
struct SendingGuard<'a> {
    state: &'a Mutex<ChatState>,
    epoch: u64,
    resolved: bool,
}

impl SendingGuard<'_> {
    fn resolve(mut self, reply: ChatMessage) -> Vec<ChatMessage> {
        self.resolved = true;
        self.finish(reply)
    }

    fn finish(&self, reply: ChatMessage) -> Vec<ChatMessage> {
        let mut state = lock(self.state);
        if state.epoch == self.epoch {
            state.messages.push(reply);
        } else {
            debug!("transcript was cleared while waiting, dropping reply");
        }
        state.sending = false;
        state.messages.clone()
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            warn!("chat turn dropped while in flight");
            self.finish(ChatMessage::assistant(ABANDONED_REPLY));
        }
    }
}
