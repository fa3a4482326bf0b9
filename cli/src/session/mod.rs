//! # MedChat Chat Session
//!
//! File: cli/src/session/mod.rs
//!
//! ## Overview
//!
//! `ChatSession` is the layer between whatever captures user input and
//! whatever answers it. It owns the conversation, draws onto an injected
//! `Surface`, and reaches the responder through an injected `Transport`, so
//! it runs the same way in a terminal, behind a test double, or headless.
//!
//! ## Submission lifecycle
//!
//! Each submission goes `idle -> awaiting-reply -> (resolved | failed) -> idle`:
//! 1. `submit` trims the input. Empty input is dropped: nothing is appended
//!    and the transport is not called.
//! 2. The `user` message is appended immediately and the typing indicator is
//!    shown.
//! 3. The transport call runs on its own task. Its outcome comes back over an
//!    mpsc channel as a `Settlement`; the call cannot be cancelled.
//! 4. `apply` reacts to a settlement: it removes the indicator, then appends
//!    the reply (or `FALLBACK_ERROR` on failure) as a `bot` message.
//!
//! Submissions are not serialized. Several can be pending at once and they
//! settle in completion order, not submission order. The indicator stays a
//! single entry throughout: after a settlement it is re-shown at the tail only
//! if other submissions are still waiting.
//!
//! ## Examples
//!
//! ```rust
//! let transport = LocalTransport::new(Arc::new(RuleSet::builtin()));
//! let mut session = ChatSession::new(transport, surface);
//! let reply = session.send("hello").await;
//! ```
//!
pub mod conversation;
pub mod input;
pub mod message;
pub mod surface;
pub mod transport;

use conversation::Conversation;
use message::Message;
use std::collections::HashSet;
use std::sync::Arc;
use surface::Surface;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use transport::{Transport, TransportError};

/// Bot message shown in place of a reply when the transport fails.
pub const FALLBACK_ERROR: &str = "Sorry, I encountered an error. Please try again.";

/// Identifies one submission within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(u64);

/// The outcome of one pending submission.
#[derive(Debug)]
pub struct Settlement {
    pub id: SubmissionId,
    pub outcome: Result<String, TransportError>,
}

pub struct ChatSession<T, S> {
    transport: Arc<T>,
    surface: S,
    conversation: Conversation,
    pending: HashSet<SubmissionId>,
    next_id: u64,
    settled_tx: mpsc::UnboundedSender<Settlement>,
    settled_rx: mpsc::UnboundedReceiver<Settlement>,
}

impl<T: Transport, S: Surface> ChatSession<T, S> {
    pub fn new(transport: T, surface: S) -> Self {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        Self {
            transport: Arc::new(transport),
            surface,
            conversation: Conversation::new(),
            pending: HashSet::new(),
            next_id: 0,
            settled_tx,
            settled_rx,
        }
    }

    /// Starts a submission. Returns `None` for empty or whitespace-only input.
    ///
    /// Must be called from within a Tokio runtime: the transport call is
    /// spawned onto it.
    pub fn submit(&mut self, input: &str) -> Option<SubmissionId> {
        let utterance = input.trim();
        if utterance.is_empty() {
            debug!("Ignoring empty submission");
            return None;
        }

        let id = SubmissionId(self.next_id);
        self.next_id += 1;

        self.append(Message::user(utterance));
        self.pending.insert(id);
        self.show_typing();

        let transport = Arc::clone(&self.transport);
        let settled_tx = self.settled_tx.clone();
        let utterance = utterance.to_string();
        tokio::spawn(async move {
            let outcome = transport.ask(&utterance).await;
            // The receiver lives as long as the session; a send error only
            // means the session was dropped and nobody is waiting.
            let _ = settled_tx.send(Settlement { id, outcome });
        });
        debug!("Submitted {:?}", id);
        Some(id)
    }

    /// Waits for the next pending submission to settle.
    ///
    /// Returns `None` when nothing is pending.
    pub async fn next_settlement(&mut self) -> Option<Settlement> {
        if self.pending.is_empty() {
            return None;
        }
        self.settled_rx.recv().await
    }

    /// Renders a settlement into the conversation.
    pub fn apply(&mut self, settlement: Settlement) {
        if !self.pending.remove(&settlement.id) {
            warn!("Ignoring settlement for unknown {:?}", settlement.id);
            return;
        }

        self.hide_typing();
        let text = match settlement.outcome {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Error sending message: {}", e);
                FALLBACK_ERROR.to_string()
            }
        };
        self.append(Message::bot(text));

        if !self.pending.is_empty() {
            self.show_typing();
        }
    }

    /// Submits `input` and waits until its own reply has been appended.
    ///
    /// Settlements of earlier submissions that arrive first are applied along
    /// the way. Returns `None` if the input was empty.
    pub async fn send(&mut self, input: &str) -> Option<&Message> {
        let id = self.submit(input)?;
        loop {
            let settlement = self.settled_rx.recv().await?;
            let done = settlement.id == id;
            self.apply(settlement);
            if done {
                return self.conversation.last_message();
            }
        }
    }

    /// Settles everything currently pending.
    pub async fn drain(&mut self) {
        while let Some(settlement) = self.next_settlement().await {
            self.apply(settlement);
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn append(&mut self, message: Message) {
        debug!("Appending {} message", message.sender);
        self.surface.append(&message);
        self.conversation.push(message);
        self.surface.scroll_to_end();
    }

    fn show_typing(&mut self) {
        if self.conversation.show_typing() {
            self.surface.set_typing(true);
            self.surface.scroll_to_end();
        }
    }

    fn hide_typing(&mut self) {
        if self.conversation.hide_typing() {
            self.surface.set_typing(false);
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::{replies, RuleSet};
    use crate::session::conversation::Entry;
    use crate::session::message::Sender;
    use crate::session::transport::LocalTransport;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    enum Event {
        Append(Sender, String),
        Typing(bool),
        Scroll,
    }

    #[derive(Default)]
    struct RecordingSurface {
        events: Vec<Event>,
    }

    impl Surface for RecordingSurface {
        fn append(&mut self, message: &Message) {
            self.events
                .push(Event::Append(message.sender, message.text.clone()));
        }
        fn set_typing(&mut self, visible: bool) {
            self.events.push(Event::Typing(visible));
        }
        fn scroll_to_end(&mut self) {
            self.events.push(Event::Scroll);
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        async fn ask(&self, _utterance: &str) -> Result<String, TransportError> {
            Err(TransportError::Status(500))
        }
    }

    /// Replies with the utterance after sleeping for the number of
    /// milliseconds it starts with ("80 slow" sleeps 80ms).
    struct DelayedEcho;

    impl Transport for DelayedEcho {
        async fn ask(&self, utterance: &str) -> Result<String, TransportError> {
            let ms: u64 = utterance
                .split_whitespace()
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(format!("re: {utterance}"))
        }
    }

    fn local_session() -> ChatSession<LocalTransport, RecordingSurface> {
        ChatSession::new(
            LocalTransport::new(Arc::new(RuleSet::builtin())),
            RecordingSurface::default(),
        )
    }

    fn texts<T: Transport, S: Surface>(session: &ChatSession<T, S>) -> Vec<(Sender, String)> {
        session
            .conversation()
            .messages()
            .map(|m| (m.sender, m.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_hello_adds_two_messages() {
        let mut session = local_session();
        let reply = session.send("hello").await.map(|m| m.text.clone());

        assert_eq!(reply.as_deref(), Some(replies::GREETING));
        assert_eq!(
            texts(&session),
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::Bot, replies::GREETING.to_string()),
            ]
        );
        assert!(!session.conversation().is_typing());
    }

    #[tokio::test]
    async fn test_user_message_trimmed_and_appended_before_reply() {
        let mut session = local_session();
        session.submit("  I have a headache \n");

        assert_eq!(
            texts(&session),
            vec![(Sender::User, "I have a headache".to_string())]
        );
        assert!(session.conversation().is_typing());

        session.drain().await;
        assert_eq!(
            session.conversation().last_message().map(|m| m.text.as_str()),
            Some(replies::HEADACHE)
        );
    }

    #[tokio::test]
    async fn test_blank_input_never_submitted() {
        let mut session = local_session();
        assert!(session.submit("").is_none());
        assert!(session.submit("   \t\n").is_none());
        assert!(session.send("  ").await.is_none());

        assert!(session.conversation().entries().is_empty());
        assert!(session.surface().events.is_empty());
        assert_eq!(session.pending(), 0);
        assert!(session.next_settlement().await.is_none());
    }

    #[tokio::test]
    async fn test_failure_shows_fallback_and_clears_indicator() {
        let mut session = ChatSession::new(FailingTransport, RecordingSurface::default());
        session.send("hello").await;

        assert_eq!(
            texts(&session),
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::Bot, FALLBACK_ERROR.to_string()),
            ]
        );
        assert!(!session.conversation().is_typing());
        assert_eq!(session.conversation().entries().len(), 2);
    }

    #[tokio::test]
    async fn test_surface_event_order() {
        let mut session = local_session();
        session.send("xyz123").await;

        assert_eq!(
            session.surface().events,
            vec![
                Event::Append(Sender::User, "xyz123".into()),
                Event::Scroll,
                Event::Typing(true),
                Event::Scroll,
                Event::Typing(false),
                Event::Append(Sender::Bot, replies::DEFAULT.into()),
                Event::Scroll,
            ]
        );
    }

    #[tokio::test]
    async fn test_same_utterance_same_reply() {
        let mut session = local_session();
        let first = session.send("fever").await.map(|m| m.text.clone());
        let second = session.send("fever").await.map(|m| m.text.clone());
        assert_eq!(first, second);
        assert_eq!(session.conversation().len(), 4);
    }

    #[tokio::test]
    async fn test_overlapping_submissions_settle_in_completion_order() {
        let mut session = ChatSession::new(DelayedEcho, RecordingSurface::default());
        let slow = session.submit("150 slow").unwrap();
        let fast = session.submit("0 fast").unwrap();
        assert_eq!(session.pending(), 2);

        // One indicator, at the tail, for both.
        let typing = session
            .conversation()
            .entries()
            .iter()
            .filter(|e| matches!(e, Entry::Typing))
            .count();
        assert_eq!(typing, 1);

        let first = session.next_settlement().await.unwrap();
        assert_eq!(first.id, fast);
        session.apply(first);
        // The slow one is still pending, so the indicator comes back.
        assert!(session.conversation().is_typing());
        assert_eq!(session.conversation().entries().last(), Some(&Entry::Typing));

        let second = session.next_settlement().await.unwrap();
        assert_eq!(second.id, slow);
        session.apply(second);
        assert!(!session.conversation().is_typing());

        assert_eq!(
            texts(&session),
            vec![
                (Sender::User, "150 slow".to_string()),
                (Sender::User, "0 fast".to_string()),
                (Sender::Bot, "re: 0 fast".to_string()),
                (Sender::Bot, "re: 150 slow".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_send_applies_earlier_settlements() {
        let mut session = ChatSession::new(DelayedEcho, RecordingSurface::default());
        session.submit("0 first");
        // Give the first call time to finish before the second is sent.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let reply = session.send("100 second").await.map(|m| m.text.clone());

        assert_eq!(reply.as_deref(), Some("re: 100 second"));
        assert_eq!(session.pending(), 0);
        assert_eq!(session.conversation().len(), 4);
    }

    #[tokio::test]
    async fn test_http_500_settles_with_fallback() {
        use axum::http::StatusCode;
        use axum::routing::post;
        use axum::Router;
        use crate::session::transport::HttpTransport;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route(
            "/api/chat",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let transport = HttpTransport::new(format!("http://{addr}/api/chat"), None).unwrap();
        let mut session = ChatSession::new(transport, RecordingSurface::default());
        let reply = session.send("hello").await.map(|m| m.text.clone());

        assert_eq!(reply.as_deref(), Some(FALLBACK_ERROR));
        assert_eq!(
            texts(&session),
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::Bot, FALLBACK_ERROR.to_string()),
            ]
        );
        assert!(!session.conversation().is_typing());
        assert_eq!(session.pending(), 0);
    }
}
