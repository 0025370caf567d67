//! CLI module for Repo Card Proxy

pub mod serve;

use clap::{Parser, Subcommand};

/// Repo Card Proxy - cached repository cards for portfolio sites
#[derive(Parser)]
#[command(name = "repo-card-proxy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
}
