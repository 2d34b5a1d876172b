//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod session;
mod wizard;

pub use job::JobCommands;
pub use session::SessionCommands;
pub use wizard::WizardCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generation job status
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Wizard position and step data
    Wizard {
        #[command(subcommand)]
        command: WizardCommands,
    },
    /// Local session store
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Wizard { command } => wizard::handle_wizard_command(command, config),
        Commands::Session { command } => session::handle_session_command(command, config),
    }
}
