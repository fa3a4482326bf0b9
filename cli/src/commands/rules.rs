//! # MedChat Rules Command
//!
//! File: cli/src/commands/rules.rs
//!
//! `medchat rules` lists the effective rule table in evaluation order.
//!
use crate::core::config;
use crate::core::error::Result;
use crate::responder::RuleSet;
use anyhow::Context;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct RulesArgs {}

pub async fn handle_rules(_args: RulesArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let rules = RuleSet::from_config(&cfg.responder).context("Invalid [responder] configuration")?;
    print!("{}", render_rules(&rules));
    Ok(())
}

fn render_rules(rules: &RuleSet) -> String {
    let mut out = String::new();
    for (i, rule) in rules.rules().iter().enumerate() {
        out.push_str(&format!(
            "{}. {} [{}]\n   {}\n",
            i + 1,
            rule.name,
            rule.triggers.join(", "),
            rule.reply
        ));
    }
    out.push_str(&format!("-. default\n   {}\n", rules.default_reply()));
    out
}
