//! Command-line interface for papercast
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Turn extracted document text into a two-host audio podcast
#[derive(Parser, Debug)]
#[command(
    name = "papercast",
    version,
    about = "Turn extracted document text into a two-host audio podcast"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: pipeline progress, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a podcast from an extracted-text file (or stdin)
    Generate {
        /// Plain-text input file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Target episode length in minutes
        #[arg(long, short = 'd', value_name = "MINUTES")]
        duration: Option<u32>,

        /// Output directory for the assembled episode
        #[arg(long, short = 'o', value_name = "DIR")]
        output: Option<PathBuf>,

        /// Document name used in logs; defaults to the input file name
        #[arg(long, value_name = "NAME")]
        name: Option<String>,

        /// Write the generated script next to the audio file
        #[arg(long)]
        save_script: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default config file to the config directory
    Init,
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}
