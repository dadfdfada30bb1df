//! Inspect command implementation.

use crate::commands::open_collection;
use serde::Serialize;
use shelfdb_core::Store;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store path.
    pub path: String,
    /// Codec used to read the store.
    pub codec: String,
    /// Per-collection summaries, sorted by name.
    pub collections: Vec<CollectionSummary>,
}

/// Summary of a single collection.
#[derive(Debug, Serialize)]
pub struct CollectionSummary {
    /// Collection name.
    pub name: String,
    /// Number of record files.
    pub records: usize,
    /// Number of index entries.
    pub index_entries: usize,
    /// Indexed fields recorded in the index file.
    pub indexed_fields: Vec<String>,
}

/// Runs the inspect command.
pub fn run(store: &Store, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(store)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects a summary of every collection in the store.
pub fn inspect(store: &Store) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let mut collections = Vec::new();
    for name in store.collection_names()? {
        let stats = open_collection(store, &name)?.stats()?;
        collections.push(CollectionSummary {
            name: stats.name,
            records: stats.records,
            index_entries: stats.index_entries,
            indexed_fields: stats.indexed_fields,
        });
    }

    Ok(InspectResult {
        path: store.path().display().to_string(),
        codec: store.config().codec.name().to_string(),
        collections,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("ShelfDB Store Inspection");
    println!("========================");
    println!();
    println!("Path:  {}", result.path);
    println!("Codec: {}", result.codec);
    println!();

    if result.collections.is_empty() {
        println!("No collections.");
        return;
    }

    println!("Collections:");
    for col in &result.collections {
        let fields = if col.indexed_fields.is_empty() {
            "-".to_string()
        } else {
            col.indexed_fields.join(", ")
        };
        println!(
            "  {}: {} records, {} index entries, indexed: {}",
            col.name, col.records, col.index_entries, fields
        );
    }
}
