//! # MedChat Keyword Responder
//!
//! File: cli/src/responder/mod.rs
//!
//! ## Overview
//!
//! Maps an utterance to a canned reply. Matching is plain substring
//! containment against the lower-cased utterance; there is no tokenizing,
//! stemming, or scoring.
//!
//! ## Architecture
//!
//! - `Rule`: a named set of trigger substrings plus the reply they produce.
//! - `RuleSet`: an ordered list of rules and a default reply. `respond` walks
//!   the list front to back and returns the reply of the first rule with any
//!   trigger contained in the utterance, or the default reply when none match.
//!
//! Rule order is part of the contract. An utterance that hits triggers from
//! several rules ("hi, I have a fever") always resolves to the earliest rule
//! in the table (the greeting), and tests depend on that.
//!
//! The built-in table (`RuleSet::builtin`) is:
//!
//! | # | name       | triggers                  |
//! |---|------------|---------------------------|
//! | 1 | greeting   | `hello`, `hi`             |
//! | 2 | headache   | `headache`, `head pain`   |
//! | 3 | fever      | `fever`, `temperature`    |
//! | 4 | cold       | `cold`, `cough`           |
//! | 5 | thanks     | `thank`                   |
//! | 6 | farewell   | `bye`, `goodbye`          |
//! | - | (default)  | anything else             |
//!
//! A table can also be supplied through the `[responder]` config section;
//! see `RuleSet::from_config`.
//!
//! ## Examples
//!
//! ```rust
//! let rules = RuleSet::builtin();
//! assert_eq!(rules.respond("HELLO there"), replies::GREETING);
//! assert_eq!(rules.respond("xyz123"), replies::DEFAULT);
//! ```
//!
pub mod replies;

use crate::core::config::ResponderConfig;
use crate::core::error::MedchatError;
use tracing::{debug, trace};

/// One entry in the rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Short identifier used in logs and `medchat rules` output.
    pub name: String,
    /// Lower-cased substrings; any one of them triggers the rule.
    pub triggers: Vec<String>,
    /// Reply returned verbatim when the rule wins.
    pub reply: String,
}

impl Rule {
    /// Builds a rule, lower-casing the triggers so matching stays case-insensitive.
    pub fn new<I, S>(name: impl Into<String>, triggers: I, reply: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            triggers: triggers
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
            reply: reply.into(),
        }
    }

    /// Whether any trigger occurs in `lowered`. The caller lower-cases once.
    fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|t| lowered.contains(t.as_str()))
    }

    fn validate(&self) -> Result<(), MedchatError> {
        let invalid = |reason: &str| MedchatError::InvalidRule {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.triggers.is_empty() {
            return Err(invalid("no triggers"));
        }
        if self.triggers.iter().any(|t| t.trim().is_empty()) {
            return Err(invalid("empty trigger"));
        }
        if self.reply.trim().is_empty() {
            return Err(invalid("empty reply"));
        }
        Ok(())
    }
}

/// Ordered rule table with a fallback reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    default_reply: String,
}

impl RuleSet {
    /// Creates a rule set after checking every rule and the default reply.
    ///
    /// Rejecting empty replies here is what keeps `respond` returning a
    /// non-empty string for every input.
    pub fn new(rules: Vec<Rule>, default_reply: impl Into<String>) -> Result<Self, MedchatError> {
        let default_reply = default_reply.into();
        if default_reply.trim().is_empty() {
            return Err(MedchatError::EmptyDefaultReply);
        }
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self {
            rules,
            default_reply,
        })
    }

    /// The committed built-in table.
    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules(),
            default_reply: replies::DEFAULT.to_string(),
        }
    }

    /// Builds the effective rule set from the `[responder]` config section.
    ///
    /// An empty `rules` list keeps the built-in table, and a missing
    /// `default_reply` keeps the built-in disclaimer, so a config can override
    /// either half independently.
    pub fn from_config(cfg: &ResponderConfig) -> Result<Self, MedchatError> {
        let rules = if cfg.rules.is_empty() {
            builtin_rules()
        } else {
            debug!("Using {} configured responder rules", cfg.rules.len());
            cfg.rules
                .iter()
                .map(|r| Rule::new(r.name.clone(), &r.triggers, r.reply.clone()))
                .collect()
        };
        let default_reply = cfg
            .default_reply
            .clone()
            .unwrap_or_else(|| replies::DEFAULT.to_string());
        Self::new(rules, default_reply)
    }

    /// Returns the first rule matching `utterance`, if any.
    pub fn matching_rule(&self, utterance: &str) -> Option<&Rule> {
        let lowered = utterance.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&lowered))
    }

    /// Maps an utterance to its reply. Total: falls back to the default reply.
    pub fn respond(&self, utterance: &str) -> &str {
        match self.matching_rule(utterance) {
            Some(rule) => {
                trace!("Utterance matched rule '{}'", rule.name);
                &rule.reply
            }
            None => {
                trace!("Utterance matched no rule, using default reply");
                &self.default_reply
            }
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn default_reply(&self) -> &str {
        &self.default_reply
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule::new("greeting", ["hello", "hi"], replies::GREETING),
        Rule::new("headache", ["headache", "head pain"], replies::HEADACHE),
        Rule::new("fever", ["fever", "temperature"], replies::FEVER),
        Rule::new("cold", ["cold", "cough"], replies::COLD),
        Rule::new("thanks", ["thank"], replies::THANKS),
        Rule::new("farewell", ["bye", "goodbye"], replies::FAREWELL),
    ]
}
