//! CLI module for Hent.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Hent - YouTube to MP3
///
/// A single-purpose web tool: paste a YouTube link into the form, get an MP3
/// back. The name "Hent" comes from the Norwegian word for "fetch."
#[derive(Parser, Debug)]
#[command(name = "hent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web UI (the default when no command is given)
    Serve {
        /// Host to bind to (overrides the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check system requirements and configuration
    Doctor,
}
