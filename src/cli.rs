//! CLI argument parsing for the harborlight-worker binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "harborlight-worker", about = "Harborlight staff portal backend worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Reconcile a roster export file into the person registry and exit
    ImportRoster {
        /// Path to the raw delimited-text export
        file: PathBuf,
        /// Role assigned to rows without a contractor signal
        #[arg(long)]
        default_role: Option<String>,
    },
}
