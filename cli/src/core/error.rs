//! # MedChat Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! Error types shared across the MedChat crate. Two layers are used:
//! - `MedchatError`: a `thiserror` enum for failures that callers may want to
//!   match on (bad configuration, invalid responder rules, server startup).
//! - `Result<T>`: an alias for `anyhow::Result<T>` used for application flow,
//!   so errors can pick up `.context(...)` on their way to `main`.
//!
//! Transport failures inside a chat session are *not* part of this enum. They
//! live in `session::transport::TransportError` because the session never lets
//! them escape: each one is normalized into fallback text for the user.
//!
//! ## Examples
//!
//! ```rust
//! if !base_path.starts_with('/') {
//!     return Err(MedchatError::Config(format!("base_path '{}' must start with '/'", base_path)))?;
//! }
//!
//! let content = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read file: {}", path.display()))?;
//! ```
//!
use thiserror::Error;

/// Custom error type for the MedChat application.
#[derive(Error, Debug)]
pub enum MedchatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid responder rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },

    #[error("Responder default reply must not be empty.")]
    EmptyDefaultReply,

    #[error("Server error: {0}")]
    Server(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = MedchatError::Config("port must be non-zero".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: port must be non-zero"
        );

        let rule_err = MedchatError::InvalidRule {
            name: "greeting".into(),
            reason: "no triggers".into(),
        };
        assert_eq!(
            rule_err.to_string(),
            "Invalid responder rule 'greeting': no triggers"
        );

        assert_eq!(
            MedchatError::EmptyDefaultReply.to_string(),
            "Responder default reply must not be empty."
        );
    }

    #[test]
    fn test_error_downcasts_through_anyhow() {
        let err: anyhow::Error = MedchatError::Server("bind failed".into()).into();
        assert!(matches!(
            err.downcast_ref::<MedchatError>(),
            Some(MedchatError::Server(_))
        ));
    }
}
