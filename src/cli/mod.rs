//! CLI module for Lese.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Lese - AI Library Assistant
///
/// A CLI library assistant over a local book catalog.
/// The name "Lese" comes from the Norwegian/Scandinavian word for "read."
#[derive(Parser, Debug)]
#[command(name = "lese")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the catalog database with demo data
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Log in and chat with the library assistant
    Chat {
        /// Your member ID
        #[arg(short = 'i', long)]
        member_id: i64,

        /// Your member name
        #[arg(short, long)]
        name: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Search the book catalog directly
    Search {
        /// Title or author substring (case-sensitive)
        query: String,

        /// Skip cover art lookup
        #[arg(long)]
        no_covers: bool,
    },

    /// Sign up as a new library member
    Signup {
        /// Full name
        name: String,

        /// Email address
        email: String,
    },

    /// Add a book to the catalog (admin)
    AddBook {
        /// Book title
        title: String,

        /// Author name
        author: String,

        /// Genre
        #[arg(short, long)]
        genre: Option<String>,

        /// Number of copies
        #[arg(short, long, default_value = "1")]
        copies: i64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
