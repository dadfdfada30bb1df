//! Secondary indexes over record fields.
//!
//! Every collection keeps a single [`IndexTable`] mapping composite keys
//! (`"<field>:<value>"`) to record ids. The table is derived data: it is
//! mirrored to the collection's index file after each mutation and can
//! always be rebuilt from the record files.
//!
//! Indexed values are unique per field. Two records may not share the
//! same value for an indexed field.

mod persistence;
mod table;

pub use persistence::{decode_index, encode_index};
pub use table::IndexTable;

use shelfdb_codec::Value;

/// Checks that `field` can be used as an indexed field name.
///
/// Field names end at the first `:` of a composite key, so they must not
/// contain one.
pub fn validate_field(field: &str) -> Result<(), String> {
    if field.is_empty() {
        return Err("indexed field name must not be empty".into());
    }
    if field.contains(':') {
        return Err(format!("indexed field {field:?} must not contain ':'"));
    }
    Ok(())
}

/// Builds the composite key for a field/value pair.
///
/// The value is rendered with its plain-text form, so the text `"42"` and
/// the integer `42` share a key.
pub fn index_key(field: &str, value: &Value) -> String {
    format!("{field}:{value}")
}
