//! Collection statistics.
//!
//! Each collection counts the operations it serves. Counters are atomic and
//! can be read while operations are in progress.
//!
//! # Usage
//!
//! ```rust,ignore
//! let users = store.collection::<User>("users", CollectionConfig::new())?;
//! users.create("1", &user)?;
//!
//! let stats = users.stats()?;
//! println!("records: {}", stats.records);
//! println!("writes: {}", stats.operations.writes);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters for one collection instance.
#[derive(Debug, Default)]
pub struct CollectionCounters {
    /// Records loaded through `get`/`get_indexed`.
    reads: AtomicU64,
    /// Records written through `create`/`update`.
    writes: AtomicU64,
    /// Records removed through `delete`.
    deletes: AtomicU64,
    /// Full collection scans.
    scans: AtomicU64,
    /// Index lookups through `get_indexed`.
    index_lookups: AtomicU64,
    /// Index rebuilds, including the one on open.
    rebuilds: AtomicU64,
    /// Records skipped by scans and rebuilds because they failed to decode.
    skipped: AtomicU64,
}

impl CollectionCounters {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_scan(&self) {
        self.scans.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_index_lookup(&self) {
        self.index_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rebuild(&self) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> OperationStats {
        OperationStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            scans: self.scans.load(Ordering::Relaxed),
            index_lookups: self.index_lookups.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`CollectionCounters`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationStats {
    /// Records loaded by id or index.
    pub reads: u64,
    /// Records created or updated.
    pub writes: u64,
    /// Records deleted.
    pub deletes: u64,
    /// Full collection scans.
    ///
    /// High scan counts may indicate a missing index.
    pub scans: u64,
    /// Index lookups.
    pub index_lookups: u64,
    /// Index rebuilds.
    pub rebuilds: u64,
    /// Undecodable records skipped by scans.
    pub skipped: u64,
}

/// Summary of a collection's on-disk and in-memory state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Number of record files.
    pub records: usize,
    /// Number of index entries.
    pub index_entries: usize,
    /// Configured indexed fields.
    pub indexed_fields: Vec<String>,
    /// Whether opening the collection triggered an index rebuild.
    pub rebuilt_on_open: bool,
    /// Operation counters since the collection was opened.
    pub operations: OperationStats,
}
