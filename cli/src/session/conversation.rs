//! # MedChat Conversation State
//!
//! File: cli/src/session/conversation.rs
//!
//! The ordered list a session renders. Messages are only ever appended. The
//! one exception is the typing indicator: a placeholder entry that can be
//! added at the tail and later removed, and of which there is never more
//! than one.
//!
use super::message::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message(Message),
    Typing,
}

#[derive(Debug, Default, Clone)]
pub struct Conversation {
    entries: Vec<Entry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message after every existing entry, including the indicator.
    ///
    /// Callers remove the indicator first when the message is the reply it
    /// stood in for.
    pub fn push(&mut self, message: Message) {
        self.entries.push(Entry::Message(message));
    }

    /// Adds the indicator at the tail. Returns false if one is already shown.
    pub fn show_typing(&mut self) -> bool {
        if self.is_typing() {
            return false;
        }
        self.entries.push(Entry::Typing);
        true
    }

    /// Removes the indicator. Returns false if none was shown.
    pub fn hide_typing(&mut self) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !matches!(e, Entry::Typing));
        self.entries.len() != before
    }

    pub fn is_typing(&self) -> bool {
        self.entries.iter().any(|e| matches!(e, Entry::Typing))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries().iter().filter_map(|e| match e {
            Entry::Message(m) => Some(m),
            Entry::Typing => None,
        })
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages().last()
    }

    /// Number of messages, not counting the indicator.
    pub fn len(&self) -> usize {
        self.messages().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
