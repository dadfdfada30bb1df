//! Store handle.
//!
//! A store is a named directory holding one subdirectory per collection:
//!
//! ```text
//! <root>/<name>/
//! ├─ users/
//! └─ orders/
//! ```

use crate::collection::{Collection, Record};
use crate::config::{CollectionConfig, StoreConfig};
use crate::dir::{create_dir_all, validate_id};
use crate::error::{CoreError, CoreResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// An open store.
///
/// The store itself holds no state beyond its location and defaults;
/// every [`Collection`] it hands out is independent.
///
/// # Example
///
/// ```rust,ignore
/// use shelfdb_core::{CollectionConfig, Store, StoreConfig};
///
/// let store = Store::open("/var/lib/app", "main", StoreConfig::default())?;
/// let users = store.collection::<User>(
///     "users",
///     CollectionConfig::new().indexed_fields(["email"]),
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct Store {
    name: String,
    path: PathBuf,
    config: StoreConfig,
}

impl Store {
    /// Opens the store `name` under `root`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `name` cannot be used as a directory name
    /// - `NotFound` if the directory is missing and `create_if_missing`
    ///   is false
    pub fn open(root: impl AsRef<Path>, name: &str, config: StoreConfig) -> CoreResult<Self> {
        validate_id(name).map_err(CoreError::invalid_argument)?;
        let path = root.as_ref().join(name);

        if !path.is_dir() {
            if !config.create_if_missing {
                return Err(CoreError::NotFound);
            }
            create_dir_all(&path, config.dir_mode)
                .map_err(|e| CoreError::storage("creating directory", e))?;
        }

        info!(store = name, path = %path.display(), codec = config.codec.name(), "store opened");
        Ok(Self {
            name: name.to_string(),
            path,
            config,
        })
    }

    /// Opens the store `name` under `root` with default configuration.
    pub fn open_default(root: impl AsRef<Path>, name: &str) -> CoreResult<Self> {
        Self::open(root, name, StoreConfig::default())
    }

    /// Returns the store name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the store directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Opens and initializes a collection.
    ///
    /// Unset values in `config` fall back to the store's codec and modes.
    pub fn collection<T: Record>(
        &self,
        name: &str,
        config: CollectionConfig,
    ) -> CoreResult<Collection<T>> {
        Collection::open(name, &self.path, config.with_store_defaults(&self.config))
    }

    /// Lists the collections present on disk, sorted by name.
    pub fn collection_names(&self) -> CoreResult<Vec<String>> {
        let entries =
            fs::read_dir(&self.path).map_err(|e| CoreError::storage("listing collections", e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::storage("listing collections", e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| CoreError::storage("listing collections", e))?
                .is_dir();
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfdb_codec::{JsonCodec, Value};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn open_creates_directory() {
        let temp = TempDir::new().unwrap();
        let store = Store::open_default(temp.path(), "main").unwrap();

        assert_eq!(store.name(), "main");
        assert_eq!(store.path(), temp.path().join("main"));
        assert!(store.path().is_dir());
    }

    #[test]
    fn open_without_create_fails_on_missing_directory() {
        let temp = TempDir::new().unwrap();
        let config = StoreConfig::new().create_if_missing(false);

        let err = Store::open(temp.path(), "main", config).unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
    }

    #[test]
    fn open_rejects_bad_name() {
        let temp = TempDir::new().unwrap();
        let err = Store::open_default(temp.path(), "a/b").unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument { .. }));
    }

    #[test]
    fn collections_inherit_store_codec() {
        let temp = TempDir::new().unwrap();
        let config = StoreConfig::new().codec(Arc::new(JsonCodec::new()));
        let store = Store::open(temp.path(), "main", config).unwrap();

        let users = store
            .collection::<Value>("users", CollectionConfig::new())
            .unwrap();
        let record = Value::map(vec![(Value::from("id"), Value::from("1"))]);
        users.create("1", &record).unwrap();

        let raw = fs::read(users.path().join("1.sds")).unwrap();
        assert_eq!(raw, br#"{"id":"1"}"#);
    }

    #[test]
    fn collection_names_are_sorted() {
        let temp = TempDir::new().unwrap();
        let store = Store::open_default(temp.path(), "main").unwrap();

        store.collection::<Value>("orders", CollectionConfig::new()).unwrap();
        store.collection::<Value>("users", CollectionConfig::new()).unwrap();
        fs::write(store.path().join("stray.txt"), b"x").unwrap();

        assert_eq!(store.collection_names().unwrap(), vec!["orders", "users"]);
    }
}
