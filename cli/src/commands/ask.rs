//! # MedChat Ask Command
//!
//! File: cli/src/commands/ask.rs
//!
//! `medchat ask <UTTERANCE>...` prints the reply the configured rule table
//! gives for one utterance. Words are joined with single spaces, so quoting
//! is optional.
//!
//! The utterance goes through a headless `ChatSession` backed by the local
//! transport, the same submit/settle path `medchat chat` uses.
//!
use crate::core::config;
use crate::core::error::Result;
use crate::responder::RuleSet;
use crate::session::surface::HeadlessSurface;
use crate::session::transport::LocalTransport;
use crate::session::ChatSession;
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// What to ask, e.g. `medchat ask I have a headache`.
    #[arg(required = true, num_args = 1..)]
    pub utterance: Vec<String>,

    /// Also print which rule produced the reply.
    #[arg(long)]
    pub explain: bool,
}

pub async fn handle_ask(args: AskArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let rules = Arc::new(
        RuleSet::from_config(&cfg.responder).context("Invalid [responder] configuration")?,
    );

    let utterance = args.utterance.join(" ");
    if args.explain && !utterance.trim().is_empty() {
        let rule = rules
            .matching_rule(&utterance)
            .map(|r| r.name.as_str())
            .unwrap_or("default");
        println!("[rule: {}]", rule);
    }

    let mut session = ChatSession::new(LocalTransport::new(rules), HeadlessSurface);
    match session.send(&utterance).await {
        Some(reply) => println!("{}", reply.text),
        None => debug!("Empty utterance, nothing to ask"),
    }
    Ok(())
}
