//! # MedChat Rendering Surface
//!
//! File: cli/src/session/surface.rs
//!
//! ## Overview
//!
//! The rendering callback a `ChatSession` draws onto. The session never
//! touches a terminal or DOM directly; whatever shows the conversation
//! implements `Surface` and is handed to `ChatSession::new`.
//!
//! Calls arrive in conversation order. For a successful exchange a surface
//! sees: `append(user)`, `scroll_to_end`, `set_typing(true)`,
//! `scroll_to_end`, then `set_typing(false)`, `append(bot)`, `scroll_to_end`.
//!
//! Implementations:
//! - `TerminalSurface` in `commands/chat.rs` prints bot replies.
//! - `HeadlessSurface` draws nothing, for one-shot callers like `medchat ask`.
//!

use super::message::Message;

pub trait Surface {
    /// A message was appended to the conversation.
    fn append(&mut self, message: &Message);

    /// The typing indicator was shown (`true`) or removed (`false`).
    fn set_typing(&mut self, visible: bool);

    /// Called after every append so the newest entry is in view.
    fn scroll_to_end(&mut self);
}

/// Draws nothing. For one-shot callers that only read the conversation.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessSurface;

impl Surface for HeadlessSurface {
    fn append(&mut self, _message: &Message) {}

    fn set_typing(&mut self, _visible: bool) {}

    fn scroll_to_end(&mut self) {}
}
