//! # MedChat Built-in Replies
//!
//! File: cli/src/responder/replies.rs
//!
//! ## Overview
//!
//! Canned reply texts for the built-in rule table (`RuleSet::builtin`).
//! `DEFAULT` is used when no rule matches. Configured tables may override
//! the default reply through `responder.default_reply`.
//!
//! These strings are part of the observable contract: the server returns them
//! verbatim and the integration tests compare against them.
//!

pub const GREETING: &str =
    "Hello! I'm your online doctor assistant. How can I help you today?";

pub const HEADACHE: &str = "For headaches, try resting in a quiet, dark room. Stay hydrated and consider taking paracetamol if appropriate. If severe or persistent, consult a doctor.";

pub const FEVER: &str = "For fever, rest and stay hydrated. You can take paracetamol to reduce temperature. Monitor your symptoms. Seek medical attention if it persists or worsens.";

pub const COLD: &str = "For cold symptoms, rest, drink warm fluids, and maintain humidity in the air. Over-the-counter remedies may help. See a doctor if symptoms persist.";

pub const THANKS: &str = "You're welcome! Is there anything else I can assist you with?";

pub const FAREWELL: &str = "Take care! Remember, I'm here if you need any health advice. For serious conditions, always consult a healthcare professional.";

pub const DEFAULT: &str = "Thank you for your message. As an online doctor, I recommend consulting with a healthcare professional for medical advice.";
