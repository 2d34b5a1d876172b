//! Job command handlers
//!
//! Fetches the status of generation jobs once, or polls until they finish.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use reelflow_core::domain::job::{JobKind, JobSnapshot, ResultPayload};
use reelflow_core::domain::status::JobStatus;
use reelflow_core::dto::status::StatusReport;
use reelflow_flow::JobPoller;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Poll a job until it succeeds or fails
    Watch {
        /// Job ID issued by the backend
        id: String,

        /// Job kind: images, videos, merge or script
        #[arg(short, long)]
        kind: JobKind,

        /// Seconds between status requests (defaults to the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Fetch the current status of a job once
    Status {
        /// Job ID issued by the backend
        id: String,

        /// Job kind: images, videos, merge or script
        #[arg(short, long)]
        kind: JobKind,
    },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    match command {
        JobCommands::Watch { id, kind, interval } => watch_job(config, &id, kind, interval).await,
        JobCommands::Status { id, kind } => job_status(config, &id, kind).await,
    }
}

/// Poll a job and print every snapshot
async fn watch_job(config: &Config, id: &str, kind: JobKind, interval: Option<u64>) -> Result<()> {
    let mut flow = config.flow.clone();
    if let Some(secs) = interval {
        flow.poll_interval = Duration::from_secs(secs.max(1));
    }

    let poller = JobPoller::new(Arc::new(config.client()), &flow);
    let (handle, mut updates) = poller.watch(id, kind)?;

    println!(
        "{}",
        format!("Watching {} job {} (every {:?})", kind, id, poller.poll_interval()).bold()
    );

    let mut last = None;
    while let Some(snapshot) = updates.recv().await {
        print_snapshot_line(&snapshot);
        last = Some(snapshot);
    }

    let terminal = last
        .or_else(|| handle.terminal_snapshot())
        .context("Polling stopped before the job finished")?;

    if let Err(e) = config
        .session
        .record_job_status(&terminal.job_id, terminal.status)
    {
        tracing::warn!("Failed to record job status: {}", e);
    }

    println!();
    print_result(&terminal);

    if terminal.status == JobStatus::Failed {
        bail!(
            "{} job {} failed: {}",
            kind,
            id,
            terminal.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

/// Fetch and display the status of a job once
async fn job_status(config: &Config, id: &str, kind: JobKind) -> Result<()> {
    let report = config
        .client()
        .fetch_status(kind, id)
        .await
        .with_context(|| format!("Failed to fetch status of {} job {}", kind, id))?;

    print_report(id, kind, &report);
    Ok(())
}

/// Print one progress line
fn print_snapshot_line(snapshot: &JobSnapshot) {
    let progress = snapshot
        .progress
        .as_ref()
        .map(|p| match &p.phase {
            Some(phase) => format!("{:>3}% {}", p.percent, phase),
            None => format!("{:>3}%", p.percent),
        })
        .unwrap_or_default();

    println!(
        "{} {:<12} {}",
        snapshot
            .observed_at
            .format("%H:%M:%S")
            .to_string()
            .dimmed(),
        colorize_status(&snapshot.status),
        progress
    );
}

/// Print a single status report
fn print_report(id: &str, kind: JobKind, report: &StatusReport) {
    println!("{}", "Job Status:".bold());
    println!("  ID:       {}", id.cyan());
    println!("  Kind:     {}", kind);
    println!("  Status:   {}", colorize_status(&report.status));
    if let Some(percent) = report.percent {
        println!("  Progress: {:.0}%", percent.clamp(0.0, 100.0));
    }
    if let Some(phase) = &report.phase {
        println!("  Phase:    {}", phase.dimmed());
    }
    if let Some(result) = &report.result {
        println!("\n{}", "Result:".bold());
        print_payload(result);
    }
    if let Some(error) = &report.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

/// Print the outcome of a finished job
fn print_result(snapshot: &JobSnapshot) {
    match snapshot.status {
        JobStatus::Succeeded => {
            println!("{} {} job {} succeeded", "✓".green(), snapshot.kind, snapshot.job_id);
            if let Some(result) = &snapshot.result {
                print_payload(result);
            }
        }
        _ => {
            println!("{} {} job {} failed", "✗".red(), snapshot.kind, snapshot.job_id);
            if let Some(error) = &snapshot.error {
                println!("  {}", error.red());
            }
        }
    }
}

fn print_payload(result: &ResultPayload) {
    match result {
        ResultPayload::Url(url) => println!("  {}", url.cyan()),
        ResultPayload::Urls(urls) => {
            for url in urls {
                println!("  {} {}", "▸".cyan(), url);
            }
        }
        ResultPayload::Document(doc) => match serde_json::to_string_pretty(doc) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{:?}", doc),
        },
        ResultPayload::Raw(raw) => println!("{}", raw.dimmed()),
    }
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Queued => status_str.yellow(),
        JobStatus::Processing => status_str.cyan(),
        JobStatus::Succeeded => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}
