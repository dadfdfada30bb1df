//! ShelfDB CLI
//!
//! Command-line tools for ShelfDB stores.
//!
//! # Commands
//!
//! - `inspect` - List collections with record and index counts
//! - `dump` - Print the records of a collection as JSON
//! - `reindex` - Rebuild a collection's index from its record files

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ShelfDB command-line store tools.
#[derive(Parser)]
#[command(name = "shelfdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the store
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Store name under the path
    #[arg(global = true, short, long, default_value = "default")]
    store: String,

    /// Codec the store was written with (cbor, json, msgpack)
    #[arg(global = true, short, long, default_value = "cbor")]
    codec: String,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List collections with record and index counts
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print every record of a collection as JSON
    Dump {
        /// Collection name
        collection: String,

        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Rebuild a collection's index from its record files
    Reindex {
        /// Collection name
        collection: String,

        /// Field to index (repeatable)
        #[arg(short, long = "field", required = true)]
        fields: Vec<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Store path required for inspect")?;
            let store = commands::open_store(&path, &cli.store, &cli.codec)?;
            commands::inspect::run(&store, &format)?;
        }
        Commands::Dump { collection, limit } => {
            let path = cli.path.ok_or("Store path required for dump")?;
            let store = commands::open_store(&path, &cli.store, &cli.codec)?;
            commands::dump::run(&store, &collection, limit)?;
        }
        Commands::Reindex { collection, fields } => {
            let path = cli.path.ok_or("Store path required for reindex")?;
            let store = commands::open_store(&path, &cli.store, &cli.codec)?;
            commands::reindex::run(&store, &collection, fields)?;
        }
        Commands::Version => {
            println!("ShelfDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("ShelfDB Core v{}", shelfdb_core::VERSION);
        }
    }

    Ok(())
}
