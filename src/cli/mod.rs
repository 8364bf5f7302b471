//! CLI module for Podium.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Podium - Presentation Content Assistant
///
/// A content library server for live presentations: commands from the
/// presenter are resolved to the most relevant video in the library.
#[derive(Parser, Debug)]
#[command(name = "podium")]
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
    /// Initialize Podium and verify system requirements
    Init,

    /// Check configuration and upstream connectivity
    Doctor,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve a single command against the content library
    Resolve {
        /// The free-text command to resolve
        command: String,

        /// Presentation id to record the interaction under
        #[arg(short, long)]
        presentation: Option<String>,
    },

    /// Manage the content library
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },

    /// Manage knowledge documents
    Document {
        #[command(subcommand)]
        action: DocumentAction,
    },

    /// Show interaction history for a presentation
    History {
        /// Presentation id
        presentation_id: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContentAction {
    /// Add a content item to the library
    Add {
        /// Content title
        title: String,

        /// Content description
        #[arg(short, long)]
        description: String,

        /// Video URL
        #[arg(short, long)]
        url: String,

        /// Keyword tags (repeatable)
        #[arg(short, long)]
        keyword: Vec<String>,
    },

    /// List the content library
    List,

    /// Remove a content item
    Rm {
        /// Content id to remove
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DocumentAction {
    /// Register a local file as a knowledge document
    Add {
        /// Path to the file to register
        file: String,

        /// User the document belongs to
        #[arg(short, long)]
        user: String,
    },

    /// Run ingestion for a registered document
    Process {
        /// Document id
        id: String,

        /// User the document belongs to
        #[arg(short, long)]
        user: String,
    },

    /// List a user's documents
    List {
        /// User whose documents to list
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
