//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Orderflow using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Orderflow - queue-driven order pipeline
#[derive(Parser, Debug)]
#[command(name = "orderflow")]
#[command(version, about, long_about = None)]
#[command(author = "Orderflow Contributors")]
pub struct Cli {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long, env = "ORDERFLOW_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ORDERFLOW_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enqueue one or more orders
    Send(commands::send::SendArgs),

    /// Process orders from the queue until stopped
    Consume(commands::consume::ConsumeArgs),

    /// Send orders and consume them in the same process
    Run(commands::run::RunArgs),

    /// Create the queue, bucket, table, log stream and topic
    Provision(commands::provision::ProvisionArgs),

    /// Show queue depths
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
