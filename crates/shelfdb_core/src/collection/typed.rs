//! Typed collection implementation.

use crate::collection::page::{paginate, Page};
use crate::collection::record::{field_of, Record};
use crate::config::{CollectionConfig, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use crate::dir::{validate_id, CollectionDir};
use crate::error::{CoreError, CoreResult};
use crate::index::{decode_index, encode_index, validate_field, IndexTable};
use crate::stats::{CollectionCounters, CollectionStats};
use parking_lot::RwLock;
use shelfdb_codec::{from_value, to_value, Codec, Value};
use std::any::type_name;
use std::io;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A typed collection of records stored one file per record.
///
/// `Collection<T>` owns a directory, an [`IndexTable`] over the configured
/// fields and a codec. Records are plain files (`<id>.sds`); the index is
/// mirrored to `<name>.sdx` after every mutation.
///
/// # Concurrency
///
/// A single reader/writer lock guards the index table. `create`, `update`,
/// `delete` and `get_indexed` take the write lock and are serialized.
/// `get` and `query` take no lock and may observe either side of a
/// concurrent write.
///
/// # Language-Native Querying
///
/// Filtering is a closure over typed records, evaluated during a full scan:
///
/// ```rust,ignore
/// let adults = users.query(|u| u.age >= 18)?;
/// let page = users.query_paginated(|u| u.age >= 18, 2, 20)?;
/// ```
///
/// # Example
///
/// ```rust,ignore
/// let mut users: Collection<User> = Collection::new(
///     "users",
///     "/var/lib/app/store",
///     CollectionConfig::new()
///         .indexed_fields(["email"])
///         .codec(Arc::new(CborCodec)),
/// );
/// users.init()?;
///
/// users.create("1", &user)?;
/// let by_email = users.get_indexed("email", "a@x")?;
/// ```
pub struct Collection<T: Record> {
    /// Collection name.
    name: String,
    /// On-disk layout.
    dir: CollectionDir,
    /// Record and index codec.
    codec: Option<Arc<dyn Codec>>,
    /// Indexed fields as configured at construction.
    indexed_fields: Vec<String>,
    /// Secondary index, guarded by the collection lock.
    index: RwLock<IndexTable>,
    /// Set once `init` succeeds.
    initialized: bool,
    /// Whether `init` had to rebuild the index.
    rebuilt_on_open: bool,
    /// Operation counters.
    counters: CollectionCounters,
    /// Record shape.
    _marker: PhantomData<T>,
}

impl<T: Record> Collection<T> {
    /// Creates an uninitialized collection `name` under the store
    /// directory `root`.
    ///
    /// Nothing is touched on disk until [`Collection::init`].
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>, config: CollectionConfig) -> Self {
        let name = name.into();
        let dir = CollectionDir::new(
            root.as_ref(),
            &name,
            config.dir_mode.unwrap_or(DEFAULT_DIR_MODE),
            config.file_mode.unwrap_or(DEFAULT_FILE_MODE),
        );

        Self {
            name,
            dir,
            codec: config.codec,
            index: RwLock::new(IndexTable::new(config.indexed_fields.clone())),
            indexed_fields: config.indexed_fields,
            initialized: false,
            rebuilt_on_open: false,
            counters: CollectionCounters::new(),
            _marker: PhantomData,
        }
    }

    /// Creates and initializes a collection in one step.
    pub fn open(
        name: impl Into<String>,
        root: impl AsRef<Path>,
        config: CollectionConfig,
    ) -> CoreResult<Self> {
        let mut collection = Self::new(name, root, config);
        collection.init()?;
        Ok(collection)
    }

    /// Initializes the collection.
    ///
    /// Creates the directory, registers the record shape with the codec and
    /// loads the index file. If the persisted indexed fields differ from
    /// the configured ones, the index is rebuilt from the record files and
    /// saved.
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized` on a second call
    /// - `Config` if no codec is set
    /// - `InvalidArgument` if the name cannot be used as a directory name,
    ///   or an indexed field name is empty or contains `:`
    /// - storage or codec errors while loading the index
    pub fn init(&mut self) -> CoreResult<()> {
        if self.initialized {
            return Err(CoreError::AlreadyInitialized);
        }
        let codec = self
            .codec
            .clone()
            .ok_or_else(|| CoreError::config("no codec configured for collection"))?;
        validate_id(&self.name).map_err(CoreError::invalid_argument)?;
        for field in &self.indexed_fields {
            validate_field(field).map_err(CoreError::invalid_argument)?;
        }

        self.dir
            .create()
            .map_err(|e| CoreError::storage("creating directory", e))?;
        codec
            .register(type_name::<T>())
            .map_err(|e| CoreError::codec("registering record shape", e))?;

        let loaded = match self.dir.read_index() {
            Ok(bytes) => Some(decode_index(&bytes, codec.as_ref())?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(CoreError::storage("loading index", e)),
        };
        let persisted = loaded.as_ref().map(IndexTable::fields).unwrap_or_default();

        if persisted == self.indexed_fields.as_slice() {
            if let Some(table) = loaded {
                *self.index.get_mut() = table;
            }
        } else {
            info!(
                collection = %self.name,
                configured = ?self.indexed_fields,
                persisted = ?persisted,
                "indexed fields changed, rebuilding index"
            );
            let table = self.build_index(codec.as_ref())?;
            self.save_index(&table, codec.as_ref())?;
            *self.index.get_mut() = table;
            self.rebuilt_on_open = true;
        }

        self.initialized = true;
        info!(
            collection = %self.name,
            path = %self.dir.path().display(),
            codec = codec.name(),
            index_entries = self.index.read().len(),
            "collection opened"
        );
        Ok(())
    }

    /// Returns the collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the collection directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the configured indexed fields.
    pub fn indexed_fields(&self) -> &[String] {
        &self.indexed_fields
    }

    /// Returns true once [`Collection::init`] has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Stores a new record under `id`.
    ///
    /// Index entries are committed and persisted before the record file
    /// is written. A crash in between leaves an index entry without a
    /// record, which `get_indexed` reports as `NotFound`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `id` is empty or not a valid file name
    /// - `InvalidRecordType` if the record does not encode to a map
    /// - `IdNotUnique` if a record with `id` already exists
    /// - `IndexedValueNotUnique` if another record holds one of its indexed
    ///   values; nothing is changed in that case
    pub fn create(&self, id: &str, record: &T) -> CoreResult<()> {
        let codec = self.codec()?;
        validate_id(id).map_err(CoreError::invalid_argument)?;
        let bytes = encode_record(codec, record)?;
        let values = self.indexed_values(record);

        let mut index = self.index.write();
        if self.dir.record_exists(id) {
            return Err(CoreError::IdNotUnique { id: id.to_string() });
        }
        for (field, value) in &values {
            index.check_unique(field, value, id)?;
        }

        for (field, value) in &values {
            index.insert(field, value, id);
        }
        if let Err(err) = self.save_index(&index, codec) {
            restore(&mut index, id, &values, &[]);
            return Err(err);
        }

        if let Err(err) = self.dir.write_record(id, &bytes) {
            restore(&mut index, id, &values, &[]);
            self.save_index_best_effort(&index, codec);
            return Err(CoreError::storage("saving record", err));
        }

        self.counters.record_write();
        debug!(collection = %self.name, id, "record created");
        Ok(())
    }

    /// Loads the record stored under `id`.
    ///
    /// Takes no lock.
    ///
    /// # Errors
    ///
    /// `NotFound` if no record exists for `id`.
    pub fn get(&self, id: &str) -> CoreResult<T> {
        let codec = self.codec()?;
        validate_id(id).map_err(CoreError::invalid_argument)?;
        self.load(codec, id)
    }

    /// Loads the record whose indexed `field` holds `value`.
    ///
    /// Serialized with writers: the lookup and the load both run under the
    /// write lock.
    ///
    /// # Errors
    ///
    /// `NotFound` if no record holds the value, if `field` is not indexed,
    /// or if the index points at a record file that does not exist.
    pub fn get_indexed(&self, field: &str, value: impl Into<Value>) -> CoreResult<T> {
        let codec = self.codec()?;
        let value = value.into();

        let index = self.index.write();
        self.counters.record_index_lookup();
        let id = index.lookup(field, &value).ok_or(CoreError::NotFound)?;
        self.load(codec, id)
    }

    /// Replaces the record stored under `id`.
    ///
    /// The previous record is decoded into its dynamic form to find the
    /// index entries it owned. Stale entries are removed and the new
    /// values are indexed before the file is overwritten.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record exists for `id`
    /// - `InvalidRecordType` if the record does not encode to a map
    /// - `IndexedValueNotUnique` if another record holds one of the new
    ///   indexed values; nothing is changed in that case
    pub fn update(&self, id: &str, record: &T) -> CoreResult<()> {
        let codec = self.codec()?;
        validate_id(id).map_err(CoreError::invalid_argument)?;
        let bytes = encode_record(codec, record)?;
        let values = self.indexed_values(record);

        let mut index = self.index.write();
        let old_bytes = self.dir.read_record(id).map_err(|e| not_found_or(e, "loading record"))?;
        let old = codec
            .decode(&old_bytes)
            .map_err(|e| CoreError::codec("decoding data", e))?;
        let old_values = self.prior_values(&old);

        for (field, value) in &values {
            index.check_unique(field, value, id)?;
        }

        let removed: Vec<(String, Value)> = old_values
            .into_iter()
            .filter(|(field, value)| index.remove_if_owned(field, value, id))
            .collect();
        for (field, value) in &values {
            index.insert(field, value, id);
        }
        if let Err(err) = self.save_index(&index, codec) {
            restore(&mut index, id, &values, &removed);
            return Err(err);
        }

        if let Err(err) = self.dir.write_record(id, &bytes) {
            restore(&mut index, id, &values, &removed);
            self.save_index_best_effort(&index, codec);
            return Err(CoreError::storage("saving record", err));
        }

        self.counters.record_write();
        debug!(collection = %self.name, id, "record updated");
        Ok(())
    }

    /// Removes the record stored under `id` and every index entry that
    /// points at it.
    ///
    /// # Errors
    ///
    /// `NotFound` if no record exists for `id`.
    pub fn delete(&self, id: &str) -> CoreResult<()> {
        let codec = self.codec()?;
        validate_id(id).map_err(CoreError::invalid_argument)?;

        let mut index = self.index.write();
        if !self.dir.record_exists(id) {
            return Err(CoreError::NotFound);
        }
        self.dir
            .remove_record(id)
            .map_err(|e| not_found_or(e, "deleting record"))?;

        let removed = index.remove_id(id);
        self.save_index(&index, codec)?;

        self.counters.record_delete();
        debug!(collection = %self.name, id, index_entries = removed, "record deleted");
        Ok(())
    }

    /// Returns every record for which `predicate` returns true.
    ///
    /// **Warning**: This is a full scan and takes no lock. Records that
    /// fail to decode, or vanish while the scan runs, are skipped. Results
    /// are ordered by id.
    pub fn query<F>(&self, mut predicate: F) -> CoreResult<Vec<T>>
    where
        F: FnMut(&T) -> bool,
    {
        let codec = self.codec()?;
        self.counters.record_scan();

        let mut matches = Vec::new();
        for id in self.record_ids()? {
            let bytes = match self.dir.read_record(&id) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(collection = %self.name, id, "record vanished during scan");
                    continue;
                }
                Err(e) => return Err(CoreError::storage("loading record", e)),
            };
            let record = match decode_record::<T>(codec, &bytes) {
                Ok(record) => record,
                Err(err) => {
                    self.counters.record_skipped();
                    debug!(collection = %self.name, id, error = %err, "skipping undecodable record");
                    continue;
                }
            };
            if predicate(&record) {
                matches.push(record);
            }
        }
        Ok(matches)
    }

    /// Runs [`Collection::query`] and returns one page of the matches.
    ///
    /// Pages are numbered from 1. `page == 0 && rows == 0` returns every
    /// match with `pages == 0`, and a page past the end is clamped to the
    /// last page.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if only one of `page` and `rows` is zero.
    pub fn query_paginated<F>(&self, predicate: F, page: usize, rows: usize) -> CoreResult<Page<T>>
    where
        F: FnMut(&T) -> bool,
    {
        paginate(self.query(predicate)?, page, rows)
    }

    /// Checks if a record exists for `id`. Takes no lock.
    pub fn exists(&self, id: &str) -> CoreResult<bool> {
        self.codec()?;
        Ok(validate_id(id).is_ok() && self.dir.record_exists(id))
    }

    /// Returns the ids of all stored records, sorted.
    pub fn ids(&self) -> CoreResult<Vec<String>> {
        self.codec()?;
        self.record_ids()
    }

    /// Returns the number of stored records.
    ///
    /// **Warning**: This lists the collection directory.
    pub fn count(&self) -> CoreResult<usize> {
        Ok(self.ids()?.len())
    }

    /// Returns the number of index entries.
    pub fn index_len(&self) -> usize {
        self.index.read().len()
    }

    /// Rebuilds the index from the record files and persists it.
    ///
    /// Use this to repair an index left stale by a crash. Holds the write
    /// lock for the whole rebuild. Returns the number of index entries.
    pub fn reindex(&self) -> CoreResult<usize> {
        let codec = self.codec()?;

        let mut index = self.index.write();
        let table = self.build_index(codec)?;
        self.save_index(&table, codec)?;
        *index = table;
        Ok(index.len())
    }

    /// Returns a summary of the collection.
    pub fn stats(&self) -> CoreResult<CollectionStats> {
        Ok(CollectionStats {
            name: self.name.clone(),
            records: self.count()?,
            index_entries: self.index_len(),
            indexed_fields: self.indexed_fields.clone(),
            rebuilt_on_open: self.rebuilt_on_open,
            operations: self.counters.snapshot(),
        })
    }

    /// Returns the codec, failing if the collection is not initialized.
    fn codec(&self) -> CoreResult<&dyn Codec> {
        if !self.initialized {
            return Err(CoreError::NotInitialized);
        }
        self.codec
            .as_deref()
            .ok_or_else(|| CoreError::config("no codec configured for collection"))
    }

    fn record_ids(&self) -> CoreResult<Vec<String>> {
        self.dir
            .record_ids()
            .map_err(|e| CoreError::storage("scanning collection", e))
    }

    fn load(&self, codec: &dyn Codec, id: &str) -> CoreResult<T> {
        let bytes = self
            .dir
            .read_record(id)
            .map_err(|e| not_found_or(e, "loading record"))?;
        let record = decode_record(codec, &bytes)?;
        self.counters.record_read();
        Ok(record)
    }

    /// Present indexed values of `record`, in field order.
    fn indexed_values(&self, record: &T) -> Vec<(String, Value)> {
        self.indexed_fields
            .iter()
            .filter_map(|field| {
                let value = record.field(field).filter(|v| !v.is_null())?;
                Some((field.clone(), value))
            })
            .collect()
    }

    /// Indexed values of a previously stored record.
    ///
    /// Uses the typed accessor when the old record still converts to `T`,
    /// so overridden accessors see the same values they indexed. Falls back
    /// to reading the fields from the dynamic form.
    fn prior_values(&self, old: &Value) -> Vec<(String, Value)> {
        match from_value::<T>(old) {
            Ok(typed) => self.indexed_values(&typed),
            Err(_) => self
                .indexed_fields
                .iter()
                .filter_map(|field| Some((field.clone(), field_of(old, field)?.clone())))
                .collect(),
        }
    }

    /// Scans every record file into a fresh index table.
    ///
    /// Best effort: undecodable records and records without an id are
    /// skipped. If two records hold the same indexed value, the later one
    /// in id order wins.
    fn build_index(&self, codec: &dyn Codec) -> CoreResult<IndexTable> {
        info!(collection = %self.name, "rebuilding index");
        let mut table = IndexTable::new(self.indexed_fields.clone());
        let mut scanned = 0usize;

        for file_id in self.record_ids()? {
            let bytes = match self.dir.read_record(&file_id) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(CoreError::storage("loading record", e)),
            };
            let record = match decode_record::<T>(codec, &bytes) {
                Ok(record) => record,
                Err(err) => {
                    self.counters.record_skipped();
                    warn!(collection = %self.name, id = %file_id, error = %err, "skipping undecodable record");
                    continue;
                }
            };
            let Some(id) = record.record_id() else {
                self.counters.record_skipped();
                warn!(collection = %self.name, file = %file_id, "skipping record without id");
                continue;
            };
            scanned += 1;

            for (field, value) in self.indexed_values(&record) {
                if let Some(previous) = table.insert(&field, &value, &id) {
                    if previous != id {
                        warn!(
                            collection = %self.name,
                            field = %field,
                            value = %value,
                            kept = %id,
                            dropped = %previous,
                            "duplicate indexed value"
                        );
                    }
                }
            }
        }

        self.counters.record_rebuild();
        info!(
            collection = %self.name,
            records = scanned,
            index_entries = table.len(),
            "index rebuilt"
        );
        Ok(table)
    }

    fn save_index(&self, table: &IndexTable, codec: &dyn Codec) -> CoreResult<()> {
        let bytes = encode_index(table, codec)?;
        self.dir
            .write_index(&bytes)
            .map_err(|e| CoreError::storage("saving index", e))?;
        debug!(collection = %self.name, index_entries = table.len(), "index saved");
        Ok(())
    }

    fn save_index_best_effort(&self, table: &IndexTable, codec: &dyn Codec) {
        if let Err(err) = self.save_index(table, codec) {
            warn!(collection = %self.name, error = %err, "failed to restore index file");
        }
    }
}

impl<T: Record> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("path", &self.dir.path())
            .field("indexed_fields", &self.indexed_fields)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

/// Converts a record to its dynamic form and encodes it.
fn encode_record<T: Record>(codec: &dyn Codec, record: &T) -> CoreResult<Vec<u8>> {
    let value = to_value(record).map_err(|e| CoreError::codec("encoding data", e))?;
    if !value.is_map() {
        return Err(CoreError::InvalidRecordType);
    }
    codec
        .encode(&value)
        .map_err(|e| CoreError::codec("encoding data", e))
}

fn decode_record<T: Record>(codec: &dyn Codec, bytes: &[u8]) -> CoreResult<T> {
    let value = codec
        .decode(bytes)
        .map_err(|e| CoreError::codec("decoding data", e))?;
    from_value(&value).map_err(|e| CoreError::codec("decoding data", e))
}

/// Undoes index changes made by a failed mutation.
fn restore(index: &mut IndexTable, id: &str, added: &[(String, Value)], removed: &[(String, Value)]) {
    for (field, value) in added {
        index.remove_if_owned(field, value, id);
    }
    for (field, value) in removed {
        index.insert(field, value, id);
    }
}

fn not_found_or(err: io::Error, context: &'static str) -> CoreError {
    if err.kind() == io::ErrorKind::NotFound {
        CoreError::NotFound
    } else {
        CoreError::storage(context, err)
    }
}
