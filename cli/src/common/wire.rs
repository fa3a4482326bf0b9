//! # MedChat Chat Wire Format
//!
//! File: cli/src/common/wire.rs
//!
//! JSON bodies shared by the server endpoints and the HTTP transport.
//!
//! Request: `{"message": "<text>"}`. The widget's older `{"query": "<text>"}`
//! is accepted as an alias on input; everything this crate sends uses
//! `message`.
//!
//! Response: `{"response": "<text>"}`. This is the only reply field the server
//! produces. Clients reading the widget's old `content` field need to switch.
//!
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(alias = "query")]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// What a client will accept as a reply body.
///
/// `content` is read only as a fallback for older servers.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReplyBody {
    pub response: Option<String>,
    pub content: Option<String>,
}
