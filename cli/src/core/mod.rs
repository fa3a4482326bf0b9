//! # MedChat Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces used by every command:
//! - `config`: loading and merging `config.toml` / `.medchat.toml`
//! - `error`: the `MedchatError` enum and the crate-wide `Result` alias
//!
//! ```rust
//! use crate::core::config;
//! use crate::core::error::{MedchatError, Result};
//! ```
//!
pub mod config;
pub mod error;
