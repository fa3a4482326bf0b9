//! # MedChat Messages
//!
//! File: cli/src/session/message.rs
//!
//! ## Overview
//!
//! A `Message` is one rendered line of a conversation: who sent it, its text,
//! and when it was created. Messages are never edited after they are appended;
//! the session only ever adds new ones.
//!
//! The timestamp is taken in UTC when the message is built and converted to
//! local time only for display (see the `chat` command's transcript lines).
//!

use chrono::{DateTime, Utc};
use std::fmt;

/// Who a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// A rendered chat entry. Immutable once appended to a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    /// # New Message (`new`)
    ///
    /// Stamps a message with the current time.
    ///
    /// ## Arguments
    ///
    /// * `sender`: Which side of the conversation the text came from.
    /// * `text`: The message body, stored as given.
    ///
    /// ## Returns
    ///
    /// * `Message`: The timestamped message.
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}
