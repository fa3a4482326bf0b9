//! # MedChat Server Configuration
//!
//! File: cli/src/commands/srv/config.rs
//!
//! ## Overview
//!
//! Produces the effective `ServerConfig` for `medchat srv` from three layers:
//! 1. Command-line arguments (highest priority, when they differ from the
//!    clap defaults)
//! 2. The `[server]` section of the loaded `core::config::Config`
//! 3. Built-in defaults
//!
//! An argument that is left at its default value does not override the
//! config file, which is the same rule the rest of the CLI follows. The boolean
//! `--no-cors` flag only ever turns CORS off.
//!
//! The responder rule table is built here too, from `[responder]`, so a bad
//! rule is reported before the server binds.
//!
use crate::core::config::{self as core_config, Config};
use crate::core::error::{MedchatError, Result};
use crate::responder::RuleSet;
use anyhow::{anyhow, Context};
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// # Server Command Arguments (`SrvArgs`)
#[derive(Parser, Debug)]
pub struct SrvArgs {
    /// Built documentation site to serve under the base path.
    /// Without it (and without `server.site_dir`), only the chat API is served.
    pub site_dir: Option<PathBuf>,

    /// Port to listen on. Falls back to the next free port if busy.
    #[arg(long, short, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind. Use `0.0.0.0` to accept connections from the network.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// URL prefix the site is served under.
    #[arg(long, default_value = "/ai-book/")]
    pub base_path: String,

    /// Simulated processing delay before each chat reply, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Do not send CORS headers.
    #[arg(long)]
    pub no_cors: bool,
}

/// # Effective Server Configuration (`ServerConfig`)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: IpAddr,
    /// Absolute, canonical site directory, if one is being served.
    pub site_dir: Option<PathBuf>,
    pub base_path: String,
    pub reply_delay: Duration,
    pub enable_cors: bool,
    pub rules: Arc<RuleSet>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: core_config::default_port(),
            host: core_config::default_host(),
            site_dir: None,
            base_path: core_config::default_base_path(),
            reply_delay: Duration::from_millis(core_config::default_reply_delay_ms()),
            enable_cors: true,
            rules: Arc::new(RuleSet::builtin()),
        }
    }
}

/// Merges `args` over `file_config` and validates the result.
pub async fn load_and_merge_config(args: SrvArgs, file_config: &Config) -> Result<ServerConfig> {
    let server = &file_config.server;

    // Arguments still at their clap default do not override the file.
    let port = if args.port != core_config::default_port() {
        args.port
    } else {
        server.port
    };
    let host = if args.host != core_config::default_host() {
        args.host
    } else {
        server.host
    };
    let base_path = if args.base_path != core_config::default_base_path() {
        args.base_path
    } else {
        server.base_path.clone()
    };
    let delay_ms = if args.delay_ms != core_config::default_reply_delay_ms() {
        args.delay_ms
    } else {
        server.reply_delay_ms
    };
    let site_dir = args
        .site_dir
        .or_else(|| server.site_dir.as_ref().map(PathBuf::from));

    core_config::validate_base_path(&base_path)?;
    if port == 0 {
        return Err(anyhow!(MedchatError::Config(
            "port must be non-zero".to_string()
        )));
    }
    let rules = RuleSet::from_config(&file_config.responder)
        .context("Invalid [responder] configuration")?;

    let mut config = ServerConfig {
        port,
        host,
        site_dir,
        base_path,
        reply_delay: Duration::from_millis(delay_ms),
        enable_cors: server.enable_cors && !args.no_cors,
        rules: Arc::new(rules),
    };
    config.resolve_site_dir().await?;
    debug!("Merged server config: {:?}", config);
    Ok(config)
}

impl ServerConfig {
    /// Makes `site_dir` absolute and canonical, or drops it if it is missing.
    ///
    /// A missing site is not fatal: the chat API is still useful on its own.
    /// A path that exists but is not a directory is an error.
    async fn resolve_site_dir(&mut self) -> Result<()> {
        let Some(dir) = self.site_dir.take() else {
            return Ok(());
        };
        let absolute = if dir.is_absolute() {
            dir
        } else {
            env::current_dir()
                .context("Failed to get current working directory")?
                .join(dir)
        };

        match tokio::fs::canonicalize(&absolute).await {
            Ok(canonical) => {
                let metadata = tokio::fs::metadata(&canonical)
                    .await
                    .with_context(|| format!("Failed to get metadata for '{}'", canonical.display()))?;
                if !metadata.is_dir() {
                    anyhow::bail!("Site path is not a directory: {}", canonical.display());
                }
                debug!("Resolved site directory to: {}", canonical.display());
                self.site_dir = Some(canonical);
            }
            Err(e) => {
                warn!(
                    "Site directory '{}' could not be found ({}); serving the chat API only.",
                    absolute.display(),
                    e
                );
            }
        }
        Ok(())
    }
}
