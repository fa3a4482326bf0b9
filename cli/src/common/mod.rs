//! # MedChat Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! Pieces shared by more than one command. Today that is only the JSON wire
//! format, which both the server (`commands::srv`) and the HTTP transport
//! (`session::transport`) speak.
//!

/// Request/response bodies for the chat endpoints.
pub mod wire;
