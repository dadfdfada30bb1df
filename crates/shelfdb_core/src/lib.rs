//! # ShelfDB Core
//!
//! Embedded file-per-record store with unique secondary indexes.
//!
//! This crate provides:
//! - [`Store`]: a named directory of collections
//! - [`Collection`]: typed CRUD over one record file per id
//! - [`IndexTable`]: equality indexes mirrored to an index file
//! - Closure queries with pagination
//!
//! Records are any serde type implementing [`Record`]. The byte format is
//! pluggable through [`Codec`](shelfdb_codec::Codec); CBOR is the default.
//!
//! ```rust,ignore
//! use serde::{Deserialize, Serialize};
//! use shelfdb_core::{CollectionConfig, Record, Store, StoreConfig};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     id: String,
//!     email: String,
//!     age: u32,
//! }
//!
//! impl Record for User {}
//!
//! let store = Store::open("/var/lib/app", "main", StoreConfig::default())?;
//! let users = store.collection::<User>(
//!     "users",
//!     CollectionConfig::new().indexed_fields(["email"]),
//! )?;
//!
//! users.create("1", &User { id: "1".into(), email: "a@x".into(), age: 30 })?;
//! let user = users.get_indexed("email", "a@x")?;
//! let adults = users.query(|u| u.age >= 18)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod dir;
mod error;
mod index;
mod stats;
mod store;

pub use collection::{field_of, id_of, paginate, Collection, Page, Record};
pub use config::{CollectionConfig, StoreConfig, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
pub use dir::{validate_id, CollectionDir, INDEX_EXTENSION, RECORD_EXTENSION};
pub use error::{CoreError, CoreResult};
pub use index::{decode_index, encode_index, index_key, validate_field, IndexTable};
pub use stats::{CollectionCounters, CollectionStats, OperationStats};
pub use store::Store;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
