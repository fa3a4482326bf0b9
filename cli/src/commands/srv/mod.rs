//! # MedChat Server Command
//!
//! File: cli/src/commands/srv/mod.rs
//!
//! ## Overview
//!
//! `medchat srv` runs the chat API and, when a built site is available,
//! serves the documentation site beside it.
//!
//! ## Architecture
//!
//! - `config.rs`: merges CLI arguments over the `[server]` config section
//! - `handlers.rs`: the chat endpoint handlers
//! - `server_logic.rs`: router construction, port selection, serving
//! - `utils.rs`: startup diagnostics
//!
//! ## Examples
//!
//! ```bash
//! # Chat API only, on port 3000
//! medchat srv
//!
//! # Serve a built site under /ai-book/ without the artificial delay
//! medchat srv ./build --delay-ms 0
//!
//! # Listen on all interfaces
//! medchat srv ./build --host 0.0.0.0 --port 8080
//! ```
//!
use crate::core::config as core_config;
use crate::core::error::Result;
use tracing::info;

pub use config::SrvArgs;

pub mod config;
pub mod handlers;
pub mod server_logic;
pub mod utils;

/// Entry point for `medchat srv`.
pub async fn handle_srv(args: SrvArgs) -> Result<()> {
    info!("Handling srv command with args: {:?}", args);

    let file_config = core_config::load_config()?;
    let server_config = config::load_and_merge_config(args, &file_config).await?;
    info!("Effective server config: {:?}", server_config);

    server_logic::run_server(server_config).await
}
