//! # MedChat Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! One module per top-level subcommand. Each defines its clap arguments
//! struct and an async `handle_*` function that `main.rs` dispatches to.
//!

/// One-shot reply from the local rule table.
pub mod ask;
/// Interactive terminal chat, local or against a remote endpoint.
pub mod chat;
/// Lists the effective rule table.
pub mod rules;
/// HTTP server for the chat API and the documentation site.
pub mod srv;
