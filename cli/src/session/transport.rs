//! # MedChat Chat Transports
//!
//! File: cli/src/session/transport.rs
//!
//! ## Overview
//!
//! A `Transport` takes one utterance and eventually yields one reply or one
//! `TransportError`. Two implementations exist:
//! - `LocalTransport`: calls a `RuleSet` in process; never fails.
//! - `HttpTransport`: POSTs `{"message": ...}` to a remote `/api/chat`.
//!
//! ## HTTP failure mapping
//!
//! | condition                              | result                     |
//! |----------------------------------------|----------------------------|
//! | connect/read error                     | `TransportError::Network`  |
//! | request exceeded the configured bound  | `TransportError::Timeout`  |
//! | non-2xx status                         | `TransportError::Status`   |
//! | body is not the expected JSON object   | `TransportError::Malformed`|
//! | JSON object with no usable reply field | `Ok(NO_RESPONSE)`          |
//!
//! There is no retry. A timeout only applies when one was configured.
//!
use crate::common::wire::{ChatRequest, ReplyBody};
use crate::core::error::Result;
use crate::responder::RuleSet;
use anyhow::Context;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Reply used when a server answers with JSON that carries no reply text.
pub const NO_RESPONSE: &str = "No response from backend";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP error! Status: {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

/// Something that can answer an utterance, possibly asynchronously.
pub trait Transport: Send + Sync + 'static {
    fn ask(
        &self,
        utterance: &str,
    ) -> impl Future<Output = std::result::Result<String, TransportError>> + Send;
}

/// Answers from an in-process rule table.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    rules: Arc<RuleSet>,
}

impl LocalTransport {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }
}

impl Transport for LocalTransport {
    async fn ask(&self, utterance: &str) -> std::result::Result<String, TransportError> {
        Ok(self.rules.respond(utterance).to_string())
    }
}

/// Answers by calling a remote chat endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn ask(&self, utterance: &str) -> std::result::Result<String, TransportError> {
        debug!("POST {} ({} bytes)", self.endpoint, utterance.len());
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest {
                message: utterance.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_reply(&body)
    }
}

/// Extracts reply text from a response body.
pub(crate) fn parse_reply(body: &str) -> std::result::Result<String, TransportError> {
    let reply: ReplyBody =
        serde_json::from_str(body).map_err(|e| TransportError::Malformed(e.to_string()))?;
    let non_empty = |text: &String| !text.trim().is_empty();
    Ok(reply
        .response
        .filter(non_empty)
        .or_else(|| reply.content.filter(non_empty))
        .unwrap_or_else(|| NO_RESPONSE.to_string()))
}
