//! CLI module for DocQA
//!
//! Provides command-line interface parsing for the `docqa` binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// DocQA - Document Question Answering
///
/// Upload PDFs, build embeddings with Ollama, store them in Chroma and ask
/// questions grounded in your documents.
#[derive(Parser, Debug)]
#[command(
    name = "docqa",
    version,
    about = "DocQA - ask questions about your PDFs",
    long_about = "Upload PDFs, build embeddings using Ollama, store them in Chroma and ask\n\
                  questions answered from the most relevant passages.\n\n\
                  Run without arguments to start the web server.",
    after_help = "EXAMPLES:\n    \
                  docqa init                     # Scaffold docqa.toml, data/ and db/\n    \
                  docqa                          # Start the server (web UI on port 8501)\n    \
                  docqa upload report.pdf        # Copy a PDF into data/\n    \
                  docqa index                    # Process documents and (re)build the index\n    \
                  docqa ask \"What is covered?\"   # Ask a question from the terminal"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "docqa.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Keep vectors in process memory instead of Chroma
    #[arg(long, global = true)]
    pub in_memory: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server and web UI (default)
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize a new DocQA project with configuration files
    ///
    /// Creates docqa.toml, .env.example and the data/ and db/ directories.
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "8501")]
        port: u16,

        /// Ollama model for answers and embeddings
        #[arg(long, default_value = "gemma:2b")]
        model: String,
    },

    /// Copy documents into the data directory
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Process documents and (re)build the index
    Index,

    /// Ask a question about the indexed documents
    Ask {
        /// The question
        question: String,

        /// Number of chunks to retrieve (overrides rag.top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the retrieved sources below the answer
        #[arg(short, long)]
        sources: bool,
    },

    /// Show uploaded documents and index status
    Status,

    /// Remove uploaded files, the index, or both
    Clear {
        /// What to clear
        #[arg(value_enum)]
        target: ClearTarget,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// Targets for `docqa clear`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearTarget {
    /// Uploaded files in data/
    Uploads,
    /// Vector collection and db/
    Index,
    /// Both
    All,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
