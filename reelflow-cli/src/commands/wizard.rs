//! Wizard command handlers
//!
//! Reads and moves the wizard state persisted in the session store.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use reelflow_core::domain::wizard::WizardStep;
use reelflow_flow::StepWizard;

use crate::config::Config;

/// Wizard subcommands
#[derive(Subcommand)]
pub enum WizardCommands {
    /// Show the current step and the stored step data
    Show,
    /// Jump to any step
    Goto {
        /// Step name, e.g. chat, script_editor, final_video
        step: WizardStep,

        /// JSON payload to store on the step
        #[arg(short, long)]
        payload: Option<String>,
    },
    /// Move to the next step
    Next,
    /// Move to the previous step
    Back,
    /// Clear all steps and start a new session
    Reset,
}

/// Handle wizard commands
pub fn handle_wizard_command(command: WizardCommands, config: &Config) -> Result<()> {
    let mut wizard = StepWizard::resume(config.session.clone(), &config.flow);

    match command {
        WizardCommands::Show => {}
        WizardCommands::Goto { step, payload } => {
            let payload = payload
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .context("Payload is not valid JSON")?;
            wizard.go_to(step, payload);
        }
        WizardCommands::Next => {
            wizard.advance(None);
        }
        WizardCommands::Back => {
            wizard.back();
        }
        WizardCommands::Reset => {
            wizard.reset();
            println!("{}", "✓ Wizard reset".green());
        }
    }

    print_wizard(&wizard);
    Ok(())
}

/// Print the step list with the current step highlighted
fn print_wizard(wizard: &StepWizard) {
    println!("{}", "Wizard:".bold());
    for step in WizardStep::ALL {
        let marker = if step == wizard.current_step() {
            "▸".cyan()
        } else {
            " ".normal()
        };
        let name = if step == wizard.current_step() {
            step.to_string().bold()
        } else {
            step.to_string().dimmed()
        };
        let data = if wizard.payload(step).is_some() {
            "(data)".dimmed()
        } else {
            "".normal()
        };
        println!("  {} {} {}", marker, name, data);
    }

    if let Some(payload) = wizard.payload(wizard.current_step()) {
        println!("\n{}", "Step data:".bold());
        match serde_json::to_string_pretty(payload) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{:?}", payload),
        }
    }
}
