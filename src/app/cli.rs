//! Command-line interface.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "fanward",
    version,
    about = "Supervised BMC fan control: local thermal loop with remote supervisor takeover"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the JSON config file (default: config.json beside the binary)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log filter, e.g. "info" or "fanward=debug"
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log hardware commands instead of executing them
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the local controller on the managed node
    Node,
    /// Run a remote supervisor ("master" or "checker") against a node
    Supervisor,
    /// Write a default config file and exit
    InitConfig,
}
