//! Reindex command implementation.

use shelfdb_codec::Value;
use shelfdb_core::{Collection, CollectionConfig, CollectionStats, Store};

/// Runs the reindex command.
pub fn run(store: &Store, collection: &str, fields: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let stats = reindex(store, collection, fields)?;
    println!("Reindexed {collection}: {} index entries", stats.index_entries);
    Ok(())
}

/// Opens `collection` with `fields` indexed and rebuilds its index once.
///
/// Opening with fields that differ from the persisted ones already
/// rebuilds; otherwise the rebuild is forced.
pub fn reindex(
    store: &Store,
    collection: &str,
    fields: Vec<String>,
) -> Result<CollectionStats, Box<dyn std::error::Error>> {
    if !store.collection_names()?.iter().any(|c| c == collection) {
        return Err(format!("No collection named {collection:?}").into());
    }
    let records: Collection<Value> =
        store.collection(collection, CollectionConfig::new().indexed_fields(fields))?;

    if !records.stats()?.rebuilt_on_open {
        records.reindex()?;
    }
    Ok(records.stats()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::persisted_fields;
    use crate::commands::tests::seeded_store;
    use tempfile::TempDir;

    #[test]
    fn rebuilds_with_new_fields() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        let stats = reindex(&store, "users", vec!["id".into(), "email".into()]).unwrap();
        assert_eq!(stats.index_entries, 4);
        assert!(stats.rebuilt_on_open);
        assert_eq!(stats.operations.rebuilds, 1);
        assert_eq!(persisted_fields(&store, "users").unwrap(), vec!["id", "email"]);
    }

    #[test]
    fn same_fields_force_one_rebuild() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        let stats = reindex(&store, "users", vec!["email".into()]).unwrap();
        assert_eq!(stats.index_entries, 2);
        assert!(!stats.rebuilt_on_open);
        assert_eq!(stats.operations.rebuilds, 1);
    }

    #[test]
    fn unknown_collection_fails() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        assert!(reindex(&store, "orders", vec!["email".into()]).is_err());
        assert!(!store.path().join("orders").exists());
    }
}
