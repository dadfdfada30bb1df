//! CLI command implementations.

pub mod dump;
pub mod inspect;
pub mod reindex;

use shelfdb_codec::{codec_by_name, Value};
use shelfdb_core::{
    decode_index, Collection, CollectionConfig, CollectionDir, CoreError, Store, StoreConfig,
};
use std::io;
use std::path::Path;

/// Opens an existing store with the named codec.
pub fn open_store(path: &Path, name: &str, codec: &str) -> Result<Store, Box<dyn std::error::Error>> {
    let codec = codec_by_name(codec).ok_or_else(|| format!("Unknown codec: {codec}"))?;
    let config = StoreConfig::new().codec(codec).create_if_missing(false);

    match Store::open(path, name, config) {
        Ok(store) => Ok(store),
        Err(CoreError::NotFound) => {
            Err(format!("No store found at {:?}", path.join(name)).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Reads the indexed fields recorded in a collection's index file.
///
/// A collection without an index file has no indexed fields.
pub fn persisted_fields(store: &Store, collection: &str) -> Result<Vec<String>, CoreError> {
    let config = store.config();
    let dir = CollectionDir::new(store.path(), collection, config.dir_mode, config.file_mode);

    match dir.read_index() {
        Ok(bytes) => Ok(decode_index(&bytes, config.codec.as_ref())?.fields().to_vec()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(CoreError::storage("loading index", e)),
    }
}

/// Opens a collection schema-less, keeping its persisted index fields so
/// that opening does not trigger a rebuild.
pub fn open_collection(store: &Store, name: &str) -> Result<Collection<Value>, Box<dyn std::error::Error>> {
    if !store.collection_names()?.iter().any(|c| c == name) {
        return Err(format!("No collection named {name:?}").into());
    }
    let fields = persisted_fields(store, name)?;
    let collection = store.collection(name, CollectionConfig::new().indexed_fields(fields))?;
    Ok(collection)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn seeded_store(temp: &TempDir) -> Store {
        let store = Store::open(temp.path(), "main", StoreConfig::default()).unwrap();
        let users = store
            .collection::<Value>("users", CollectionConfig::new().indexed_fields(["email"]))
            .unwrap();
        for (id, email) in [("1", "a@x"), ("2", "b@x")] {
            let record = Value::map(vec![
                (Value::from("id"), Value::from(id)),
                (Value::from("email"), Value::from(email)),
            ]);
            users.create(id, &record).unwrap();
        }
        store
    }

    #[test]
    fn open_missing_store_fails() {
        let temp = TempDir::new().unwrap();
        let err = open_store(temp.path(), "main", "cbor").unwrap_err();
        assert!(err.to_string().contains("No store found"));
    }

    #[test]
    fn open_with_unknown_codec_fails() {
        let temp = TempDir::new().unwrap();
        seeded_store(&temp);
        let err = open_store(temp.path(), "main", "yaml").unwrap_err();
        assert_eq!(err.to_string(), "Unknown codec: yaml");
    }

    #[test]
    fn reads_persisted_fields() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        assert_eq!(persisted_fields(&store, "users").unwrap(), vec!["email"]);
        assert!(persisted_fields(&store, "missing").unwrap().is_empty());
    }

    #[test]
    fn open_collection_keeps_index() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        let users = open_collection(&store, "users").unwrap();
        let stats = users.stats().unwrap();
        assert!(!stats.rebuilt_on_open);
        assert_eq!(stats.index_entries, 2);

        assert!(open_collection(&store, "orders").is_err());
    }
}
