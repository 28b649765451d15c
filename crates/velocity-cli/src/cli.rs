//! CLI argument parsing and command definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Hybrid keyword + vector contractor search.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "VELOCITY_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server.
    Serve {
        /// Address to bind (overrides server.host).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run a hybrid search and print the JSON response.
    Search {
        /// Query text (web-search syntax).
        query: String,

        /// Maximum number of results.
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        embedding: EmbeddingArgs,
    },

    /// Run a vector-only search and print the JSON response.
    Semantic {
        /// Maximum number of results.
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        embedding: EmbeddingArgs,
    },

    /// Print corpus statistics and search capabilities.
    Status,

    /// Load the corpus, build the indexes, and report.
    Health,

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Where to read a query embedding from.
#[derive(Args, Debug, Default)]
pub struct EmbeddingArgs {
    /// Query embedding as a JSON array, e.g. "[0.1, 0.2]".
    #[arg(long, conflicts_with = "embedding_file")]
    pub embedding: Option<String>,

    /// File containing the query embedding as a JSON array.
    #[arg(long)]
    pub embedding_file: Option<PathBuf>,
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "search.rrf.k").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "server.port").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
