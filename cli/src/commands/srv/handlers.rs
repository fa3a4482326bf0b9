//! # MedChat HTTP Handlers
//!
//! File: cli/src/commands/srv/handlers.rs
//!
//! Request handlers for the chat API. Both `/api/chat` and the widget's
//! `/api/v1/chat` route here and share one responder, so the two endpoints
//! cannot drift apart.
//!
use crate::common::wire::{ChatRequest, ChatResponse};
use crate::responder::RuleSet;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct AppState {
    pub rules: Arc<RuleSet>,
    /// Slept before every reply to mimic a real backend.
    pub reply_delay: Duration,
    pub base_path: String,
}

pub type AppStateArg = State<Arc<AppState>>;

/// `POST /api/chat` and `POST /api/v1/chat`.
///
/// Malformed bodies never reach this function: the `Json` extractor rejects
/// them with a 4xx status.
pub async fn chat(State(state): AppStateArg, Json(body): Json<ChatRequest>) -> Json<ChatResponse> {
    let matched = state
        .rules
        .matching_rule(&body.message)
        .map(|r| r.name.as_str())
        .unwrap_or("default");
    debug!("chat({:?}) -> rule '{}'", body.message, matched);

    let response = state.rules.respond(&body.message).to_string();
    if !state.reply_delay.is_zero() {
        tokio::time::sleep(state.reply_delay).await;
    }
    Json(ChatResponse { response })
}

/// `GET /` sends visitors to the documentation site.
pub async fn root(State(state): AppStateArg) -> impl IntoResponse {
    Redirect::temporary(&state.base_path)
}
