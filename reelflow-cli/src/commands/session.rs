//! Session command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// Session subcommands
#[derive(Subcommand)]
pub enum SessionCommands {
    /// Show the session id, flags and stored keys
    Show,
    /// Start a new session
    New,
    /// Store the user token
    Token {
        /// Opaque user token
        token: String,
    },
    /// Remove everything from the store, token included
    Clear,
}

/// Handle session commands
pub fn handle_session_command(command: SessionCommands, config: &Config) -> Result<()> {
    let session = &config.session;

    match command {
        SessionCommands::Show => {
            println!("{}", "Session:".bold());
            println!(
                "  ID:               {}",
                session
                    .session_id()
                    .map(|id| id.cyan())
                    .unwrap_or_else(|| "none".dimmed())
            );
            println!(
                "  Token:            {}",
                if session.token().is_some() {
                    "set".green()
                } else {
                    "not set".yellow()
                }
            );
            println!("  Script generated: {}", session.has_generated_script());
            println!("  Video type set:   {}", session.video_type_set());

            let keys = session.store().keys();
            if !keys.is_empty() {
                println!("\n{}", "Stored keys:".bold());
                for key in keys {
                    println!("  {}", key.dimmed());
                }
            }
        }
        SessionCommands::New => {
            let id = session.start_new_session()?;
            println!("{} {}", "✓ Started session".green(), id.cyan());
        }
        SessionCommands::Token { token } => {
            session.set_token(&token)?;
            println!("{}", "✓ Token stored".green());
        }
        SessionCommands::Clear => {
            session.clear()?;
            println!("{}", "✓ Session store cleared".green());
        }
    }

    Ok(())
}
