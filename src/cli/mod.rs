//! CLI module for the customer care workflow service

pub mod serve;

use clap::{Parser, Subcommand};

/// Customer care workflow service - fixed nine-stage event pipeline
#[derive(Parser)]
#[command(name = "carebot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP ingress server
    Serve,
}
