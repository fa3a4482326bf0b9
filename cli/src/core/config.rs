//! # MedChat Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! Loads, merges, and validates MedChat configuration. Two TOML files are
//! consulted, in increasing order of precedence:
//! 1. User config: `<platform config dir>/medchat/config.toml`
//! 2. Project config: `.medchat.toml` in the current directory or an ancestor
//!    (the search stops at the first directory containing `.git`)
//!
//! Built-in defaults fill anything neither file sets. Command-line flags are
//! layered on top later, by the command that owns them (see
//! `commands::srv::config`).
//!
//! ## File format
//!
//! ```toml
//! [server]
//! port = 3000
//! host = "127.0.0.1"
//! site_dir = "~/ai-book/build"
//! base_path = "/ai-book/"
//! reply_delay_ms = 1000
//! enable_cors = true
//!
//! [client]
//! endpoint = "http://127.0.0.1:3000/api/chat"
//! request_timeout_secs = 30
//!
//! [responder]
//! default_reply = "Please consult a healthcare professional."
//!
//! [[responder.rules]]
//! name = "greeting"
//! triggers = ["hello", "hi"]
//! reply = "Hello! How can I help you today?"
//! ```
//!
//! Unknown keys are rejected so typos surface as errors rather than being
//! silently ignored.
//!
use crate::core::error::{MedchatError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub responder: ResponderConfig,
}

/// Settings for `medchat srv`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: IpAddr,
    /// Built documentation site to serve. `~` is expanded.
    #[serde(default)]
    pub site_dir: Option<String>,
    /// URL prefix the site is mounted under. Must start and end with `/`.
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Simulated processing latency before each chat reply.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

/// Settings for remote chat sessions (`medchat chat --remote`).
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    /// Full URL of a `/api/chat` endpoint. When set, `medchat chat` uses it
    /// without needing `--remote`.
    pub endpoint: Option<String>,
    /// Upper bound on a single request. Unset means wait indefinitely.
    pub request_timeout_secs: Option<u64>,
}

/// Optional replacement for the built-in responder table.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ResponderConfig {
    pub default_reply: Option<String>,
    /// Evaluated in file order; the first match wins.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub name: String,
    pub triggers: Vec<String>,
    pub reply: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            site_dir: None,
            base_path: default_base_path(),
            reply_delay_ms: default_reply_delay_ms(),
            enable_cors: default_enable_cors(),
        }
    }
}

pub(crate) fn default_port() -> u16 {
    3000
}
pub(crate) fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}
pub(crate) fn default_base_path() -> String {
    "/ai-book/".to_string()
}
pub(crate) fn default_reply_delay_ms() -> u64 {
    1000
}
fn default_enable_cors() -> bool {
    true
}

const USER_CONFIG_FILENAME: &str = "config.toml";
const PROJECT_CONFIG_FILENAME: &str = ".medchat.toml";

/// Loads the effective configuration for the current working directory.
pub fn load_config() -> Result<Config> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let user_config = load_user_config()?;
    let project_config = match find_project_config_path(&current_dir) {
        Some(path) => {
            info!("Loading project configuration from: {}", path.display());
            Some(load_config_from_path(&path)?)
        }
        None => {
            debug!("No project configuration file (.medchat.toml) found in current directory or ancestors.");
            None
        }
    };
    let mut merged = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged);
    validate_config(&merged).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged);
    Ok(merged)
}

fn load_user_config() -> Result<Option<Config>> {
    let Some(proj_dirs) = ProjectDirs::from("com", "MedChat", "medchat") else {
        warn!("Could not determine user config directory.");
        return Ok(None);
    };
    let config_path = proj_dirs.config_dir().join(USER_CONFIG_FILENAME);
    if config_path.is_file() {
        info!("Loading user configuration from: {}", config_path.display());
        load_config_from_path(&config_path).map(Some)
    } else {
        debug!(
            "User configuration file not found at {}",
            config_path.display()
        );
        Ok(None)
    }
}

/// Walks from `start` towards the filesystem root looking for `.medchat.toml`.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let candidate = path.join(PROJECT_CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values win wherever they differ from the built-in default.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let Some(project) = project else {
        return user;
    };
    let defaults = ServerSection::default();

    let server = ServerSection {
        port: if project.server.port != defaults.port {
            project.server.port
        } else {
            user.server.port
        },
        host: if project.server.host != defaults.host {
            project.server.host
        } else {
            user.server.host
        },
        site_dir: project.server.site_dir.or(user.server.site_dir),
        base_path: if project.server.base_path != defaults.base_path {
            project.server.base_path
        } else {
            user.server.base_path
        },
        reply_delay_ms: if project.server.reply_delay_ms != defaults.reply_delay_ms {
            project.server.reply_delay_ms
        } else {
            user.server.reply_delay_ms
        },
        // Either file can switch CORS off.
        enable_cors: project.server.enable_cors && user.server.enable_cors,
    };
    let client = ClientSection {
        endpoint: project.client.endpoint.or(user.client.endpoint),
        request_timeout_secs: project
            .client
            .request_timeout_secs
            .or(user.client.request_timeout_secs),
    };
    let responder = ResponderConfig {
        default_reply: project
            .responder
            .default_reply
            .or(user.responder.default_reply),
        rules: if !project.responder.rules.is_empty() {
            project.responder.rules
        } else {
            user.responder.rules
        },
    };
    Config {
        server,
        client,
        responder,
    }
}

fn expand_config_paths(config: &mut Config) {
    if let Some(site_dir) = config.server.site_dir.as_mut() {
        *site_dir = shellexpand::tilde(site_dir.as_str()).into_owned();
        debug!("Expanded site directory: {}", site_dir);
    }
}

/// Checks values that would otherwise fail much later (at bind or route time).
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating configuration...");
    validate_base_path(&config.server.base_path)?;
    if config.server.port == 0 {
        return Err(anyhow!(MedchatError::Config(
            "server.port must be non-zero".to_string()
        )));
    }
    if let Some(endpoint) = &config.client.endpoint {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(anyhow!(MedchatError::Config(format!(
                "client.endpoint '{}' must be an http:// or https:// URL",
                endpoint
            ))));
        }
    }
    if config.client.request_timeout_secs == Some(0) {
        return Err(anyhow!(MedchatError::Config(
            "client.request_timeout_secs must be at least 1".to_string()
        )));
    }
    if let Some(site_dir) = &config.server.site_dir {
        let path = Path::new(site_dir);
        if path.exists() && !path.is_dir() {
            return Err(anyhow!(MedchatError::Config(format!(
                "Configured site path '{}' exists but is not a directory.",
                path.display()
            ))));
        }
    }
    Ok(())
}

pub fn validate_base_path(base_path: &str) -> Result<()> {
    if !base_path.starts_with('/') || !base_path.ends_with('/') {
        return Err(anyhow!(MedchatError::Config(format!(
            "base_path '{}' must start and end with '/'",
            base_path
        ))));
    }
    Ok(())
}
