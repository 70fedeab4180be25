//! CLI for the NovaTask network layer.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use novanet_core::config;

use commands::{
    run_classify, run_errors, run_fetch, run_probe, run_queue_add, run_queue_flush,
    run_queue_list, run_watch, FetchArgs,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "novanet")]
#[command(about = "NovaTask network layer: requests with retries, error classification, connectivity", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Send one request with retries and print the response.
    Fetch {
        #[command(flatten)]
        args: FetchArgs,
        /// Probe connectivity first and queue the request if offline.
        #[arg(long)]
        queue_offline: bool,
    },

    /// Run one liveness probe and print round-trip time.
    Probe {
        /// URL to probe (defaults to `connectivity.probe_url`).
        url: Option<String>,
    },

    /// Monitor connectivity and print every change until Ctrl-C.
    Watch,

    /// Classify a free-text failure message.
    Classify {
        message: String,
        /// Context tag attached to the classified error.
        #[arg(long)]
        context: Option<String>,
    },

    /// Inspect or replay the offline request queue.
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },

    /// Show (or clear) the persisted error log.
    Errors {
        /// Number of most recent entries to show.
        #[arg(long, default_value = "20")]
        limit: u32,
        /// Delete all entries instead of listing them.
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum QueueAction {
    /// List queued requests, oldest first.
    List,
    /// Queue a request without sending it.
    Add {
        #[command(flatten)]
        args: FetchArgs,
    },
    /// Replay queued requests now.
    Flush,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                args,
                queue_offline,
            } => run_fetch(&cfg, &args, queue_offline).await?,
            CliCommand::Probe { url } => run_probe(&cfg, url.as_deref()).await?,
            CliCommand::Watch => run_watch(&cfg).await?,
            CliCommand::Classify { message, context } => {
                run_classify(&message, context.as_deref())
            }
            CliCommand::Queue { action } => match action {
                QueueAction::List => run_queue_list().await?,
                QueueAction::Add { args } => run_queue_add(&cfg, &args).await?,
                QueueAction::Flush => run_queue_flush(&cfg).await?,
            },
            CliCommand::Errors { limit, clear } => run_errors(limit, clear).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
