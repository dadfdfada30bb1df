//! Store and collection configuration.

use shelfdb_codec::{CborCodec, Codec};
use std::sync::Arc;

/// Default permission bits for created directories (owner rwx).
pub const DEFAULT_DIR_MODE: u32 = 0o700;

/// Default permission bits for created files (owner rw).
pub const DEFAULT_FILE_MODE: u32 = 0o600;

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Codec handed to every collection that does not override it.
    pub codec: Arc<dyn Codec>,

    /// Permission bits for the store and collection directories.
    pub dir_mode: u32,

    /// Permission bits for record and index files.
    pub file_mode: u32,

    /// Whether to create the store directory if it doesn't exist.
    pub create_if_missing: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            codec: Arc::new(CborCodec),
            dir_mode: DEFAULT_DIR_MODE,
            file_mode: DEFAULT_FILE_MODE,
            create_if_missing: true,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the codec shared by the store's collections.
    #[must_use]
    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    /// Sets directory permission bits.
    #[must_use]
    pub fn dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Sets file permission bits.
    #[must_use]
    pub fn file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Sets whether to create the store directory if missing.
    #[must_use]
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }
}

/// Configuration for a single collection.
///
/// Unset values fall back to the store's defaults when the collection is
/// opened through [`Store::collection`](crate::Store::collection).
#[derive(Debug, Clone, Default)]
pub struct CollectionConfig {
    /// Fields to maintain secondary indexes for, in order.
    pub indexed_fields: Vec<String>,

    /// Codec override. A collection without any codec fails to initialize.
    pub codec: Option<Arc<dyn Codec>>,

    /// Directory permission override.
    pub dir_mode: Option<u32>,

    /// File permission override.
    pub file_mode: Option<u32>,
}

impl CollectionConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indexed fields. Duplicates are dropped, first occurrence wins.
    ///
    /// Field names must be non-empty and free of `:`; other names are
    /// rejected when the collection is initialized.
    #[must_use]
    pub fn indexed_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexed_fields.clear();
        for field in fields {
            let field = field.into();
            if !self.indexed_fields.contains(&field) {
                self.indexed_fields.push(field);
            }
        }
        self
    }

    /// Overrides the codec for this collection.
    #[must_use]
    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Overrides directory permission bits.
    #[must_use]
    pub fn dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = Some(mode);
        self
    }

    /// Overrides file permission bits.
    #[must_use]
    pub fn file_mode(mut self, mode: u32) -> Self {
        self.file_mode = Some(mode);
        self
    }

    /// Fills unset values from the store configuration.
    pub(crate) fn with_store_defaults(mut self, store: &StoreConfig) -> Self {
        if self.codec.is_none() {
            self.codec = Some(Arc::clone(&store.codec));
        }
        self.dir_mode.get_or_insert(store.dir_mode);
        self.file_mode.get_or_insert(store.file_mode);
        self
    }
}
