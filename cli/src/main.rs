//! # MedChat Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the `medchat` CLI:
//! - parses arguments with clap
//! - sets up `tracing` output from the `-v` count (or `RUST_LOG`)
//! - dispatches to the subcommand handler and reports its error, if any
//!
//! ## Examples
//!
//! ```bash
//! medchat ask I have a fever
//! medchat -v srv ./build
//! medchat chat --remote http://127.0.0.1:3000/api/chat
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Subcommand handlers (ask, chat, rules, srv)
mod common; // Wire format shared by server and client
mod core; // Configuration and errors
mod responder; // Keyword rule table
mod session; // Chat session, conversation, transports

#[derive(Parser, Debug)]
#[command(
    name = "medchat",
    about = "💬 MedChat: keyword-matching online doctor assistant",
    long_about = "Answers health questions from a fixed keyword table.\n\
                  Run it in the terminal, or serve it over HTTP next to the textbook site.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "a")]
    Ask(commands::ask::AskArgs),
    #[command(alias = "c")]
    Chat(commands::chat::ChatArgs),
    Rules(commands::rules::RulesArgs),
    Srv(commands::srv::SrvArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Ask(args) => commands::ask::handle_ask(args).await,
        Commands::Chat(args) => commands::chat::handle_chat(args).await,
        Commands::Rules(args) => commands::rules::handle_rules(args).await,
        Commands::Srv(args) => commands::srv::handle_srv(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
