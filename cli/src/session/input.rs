//! # MedChat Input Box
//!
//! File: cli/src/session/input.rs
//!
//! ## Overview
//!
//! Keyboard handling for the message box. Characters accumulate in a buffer
//! until Enter is pressed without Shift, which hands the buffer to the caller
//! and clears it. Shift+Enter is reserved for multi-line input and does
//! nothing here.
//!
//! The box does not trim or filter; `ChatSession::submit` decides whether the
//! submitted text is worth sending.
//!

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter { shift: bool },
}

#[derive(Debug, Default, Clone)]
pub struct InputBox {
    buffer: String,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Handle Key (`key`)
    ///
    /// Feeds one key press into the box.
    ///
    /// ## Arguments
    ///
    /// * `key`: The key that was pressed.
    ///
    /// ## Returns
    ///
    /// * `Some(String)`: The buffered text, when the key submits it. The box
    ///   is left empty.
    /// * `None`: For every other key, including Shift+Enter.
    pub fn key(&mut self, key: Key) -> Option<String> {
        match key {
            Key::Char(c) => {
                self.buffer.push(c);
                None
            }
            Key::Backspace => {
                self.buffer.pop();
                None
            }
            Key::Enter { shift: true } => None,
            Key::Enter { shift: false } => Some(std::mem::take(&mut self.buffer)),
        }
    }

    /// Types every character of `text`.
    pub fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            self.key(Key::Char(c));
        }
    }

    #[cfg(test)]
    pub fn contents(&self) -> &str {
        &self.buffer
    }
}
