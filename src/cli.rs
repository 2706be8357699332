//! Command-line interface for akin.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Akin - think of a character, the service guesses who it is
#[derive(Parser, Debug)]
#[command(name = "akin")]
#[command(about = "Character guessing game with line, terminal and HTTP front ends", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (optional)
    #[arg(long, global = true, default_value = "akin.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal, one prompt per question
    Play(GameArgs),

    /// Play in a full-screen terminal UI
    Tui(GameArgs),

    /// Run the HTTP forwarding service
    Serve {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Options shared by the interactive front ends.
#[derive(Args, Debug, Clone)]
pub struct GameArgs {
    /// Language code or English name
    #[arg(default_value = "en")]
    pub language: String,

    /// Show step and progression after each answer
    #[arg(long)]
    pub debug: bool,

    /// Play through a forwarding service instead of the local engine
    #[arg(long)]
    pub engine_url: Option<String>,
}
