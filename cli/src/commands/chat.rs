//! # MedChat Interactive Chat
//!
//! File: cli/src/commands/chat.rs
//!
//! ## Overview
//!
//! `medchat chat` runs a `ChatSession` in the terminal. Replies come from the
//! local rule table, or from a remote `/api/chat` endpoint when `--remote`
//! (or `client.endpoint` in the config) is given.
//!
//! Each line read from stdin is typed into an `InputBox` and submitted with
//! Enter. The prompt stays live while replies are pending, so a slow remote
//! does not block further input; replies are printed as they settle.
//! `/quit` or end of input leaves after outstanding replies arrive.
//!
use crate::core::config;
use crate::core::error::Result;
use crate::responder::RuleSet;
use crate::session::input::{InputBox, Key};
use crate::session::message::{Message, Sender};
use crate::session::surface::Surface;
use crate::session::transport::{HttpTransport, LocalTransport, Transport};
use crate::session::ChatSession;
use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

const QUIT_COMMAND: &str = "/quit";

#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Send messages to this chat endpoint instead of answering locally,
    /// e.g. `http://127.0.0.1:3000/api/chat`.
    #[arg(long)]
    pub remote: Option<String>,

    /// Give up on a remote reply after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

pub async fn handle_chat(args: ChatArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let endpoint = args.remote.or(cfg.client.endpoint);
    let timeout = args
        .timeout_secs
        .or(cfg.client.request_timeout_secs)
        .map(Duration::from_secs);

    match endpoint {
        Some(endpoint) => {
            info!("Chatting with remote endpoint {}", endpoint);
            let transport = HttpTransport::new(endpoint, timeout)?;
            println!("Connected to {}. Type {} to leave.", transport.endpoint(), QUIT_COMMAND);
            run_repl(transport).await
        }
        None => {
            let rules = RuleSet::from_config(&cfg.responder)
                .context("Invalid [responder] configuration")?;
            info!("Chatting with local responder ({} rules)", rules.rules().len());
            println!("Online doctor assistant. Type {} to leave.", QUIT_COMMAND);
            run_repl(LocalTransport::new(Arc::new(rules))).await
        }
    }
}

async fn run_repl<T: Transport>(transport: T) -> Result<()> {
    let mut session = ChatSession::new(transport, TerminalSurface::new());
    let mut input = InputBox::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    session.surface().prompt();
    while input_open {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read from stdin")? {
                    Some(line) if line.trim() == QUIT_COMMAND => input_open = false,
                    Some(line) => {
                        input.type_str(&line);
                        if let Some(text) = input.key(Key::Enter { shift: false }) {
                            session.submit(&text);
                        }
                        if session.pending() == 0 {
                            session.surface().prompt();
                        }
                    }
                    None => input_open = false,
                }
            }
            Some(settlement) = session.next_settlement() => {
                session.apply(settlement);
                session.surface().prompt();
            }
        }
    }

    if session.pending() > 0 {
        debug!("Waiting for {} outstanding reply(ies)", session.pending());
    }
    session.drain().await;
    println!();

    let conversation = session.conversation();
    if conversation.is_empty() {
        debug!("Chat ended without any messages");
    } else {
        info!("Chat ended after {} message(s)", conversation.len());
    }
    Ok(())
}

/// `[HH:MM:SS] doc> text`, stamped with the local time the reply arrived.
fn bot_line(message: &Message) -> String {
    format!(
        "[{}] doc> {}",
        message.sent_at.with_timezone(&Local).format("%H:%M:%S"),
        message.text
    )
}

/// Prints bot messages to stdout. The user's own lines are already on screen.
struct TerminalSurface;

impl TerminalSurface {
    fn new() -> Self {
        Self
    }

    fn prompt(&self) {
        print!("you> ");
        let _ = std::io::stdout().flush();
    }
}

impl Surface for TerminalSurface {
    fn append(&mut self, message: &Message) {
        if message.sender == Sender::Bot {
            println!("\r{}", bot_line(message));
        }
    }

    fn set_typing(&mut self, visible: bool) {
        if visible {
            print!("doc> ...");
        } else {
            print!("\r        \r");
        }
    }

    fn scroll_to_end(&mut self) {
        let _ = std::io::stdout().flush();
    }
}
