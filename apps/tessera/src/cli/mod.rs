//! # Tessera CLI Module
//!
//! This module implements the CLI interface for Tessera.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Summarize every storage
//! - `storages` - List storage names
//! - `storage` - Reconstruct and print one storage
//! - `instance` - Print the single-record view of one instance
//! - `ingest` - Load raw records from a JSON file into a collection
//! - `init` - Initialize a new database

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tessera_core::TesseraError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Tessera - Instance Navigator
///
/// Reconstructs labelled instances, their concepts and relational triples
/// from flat record collections.
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the record database
    #[arg(short = 'D', long, global = true, default_value = "tessera.redb")]
    pub database: PathBuf,

    /// Path to a TOML schema file (falls back to TESSERA_SCHEMA, then defaults)
    #[arg(short = 'S', long, global = true)]
    pub schema: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Summarize every storage
    Status,

    /// List storage names
    Storages,

    /// Reconstruct one storage
    Storage {
        /// Storage (collection) name
        name: String,
    },

    /// Show the instance built from the first record with this subject
    Instance {
        /// Instance label
        label: String,

        /// Storage (collection) name
        #[arg(short, long)]
        storage: String,
    },

    /// Load raw records from a JSON array into a collection
    Ingest {
        /// Target collection
        #[arg(short, long)]
        collection: String,

        /// Path to the input file (JSON array of flat objects)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), TesseraError> {
    let db = cli.database.as_path();
    let schema = cli.schema.as_deref();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(db, schema, &host, port).await,
        Some(Commands::Status) | None => cmd_status(db, schema, json_mode),
        Some(Commands::Storages) => cmd_storages(db, schema, json_mode),
        Some(Commands::Storage { name }) => cmd_storage(db, schema, json_mode, &name),
        Some(Commands::Instance { label, storage }) => {
            cmd_instance(db, schema, json_mode, &label, &storage)
        }
        Some(Commands::Ingest { collection, file }) => {
            cmd_ingest(db, json_mode, &collection, &file)
        }
        Some(Commands::Init { force }) => cmd_init(db, force),
    }
}
