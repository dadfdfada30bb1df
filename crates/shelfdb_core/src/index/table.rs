//! In-memory index table.

use crate::error::{CoreError, CoreResult};
use crate::index::index_key;
use shelfdb_codec::Value;
use std::collections::HashMap;

/// Unique hash index from `(field, value)` to record id.
///
/// `IndexTable` gives O(1) equality lookups for every indexed field of a
/// collection. The list of indexed fields travels with the table so a
/// persisted table can be checked against the configured fields on open.
///
/// # Example
///
/// ```rust,ignore
/// let mut table = IndexTable::new(vec!["email".into()]);
/// table.insert("email", &Value::from("a@x"), "1");
/// assert_eq!(table.lookup("email", &Value::from("a@x")), Some("1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTable {
    /// Indexed field names, in configuration order.
    fields: Vec<String>,
    /// Composite key to record id.
    entries: HashMap<String, String>,
}

impl IndexTable {
    /// Creates an empty table for the given fields.
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            entries: HashMap::new(),
        }
    }

    /// Creates a table from raw composite-key entries.
    pub fn from_entries<I>(fields: Vec<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            fields,
            entries: entries.into_iter().collect(),
        }
    }

    /// Returns the indexed field names.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the id stored under `(field, value)`.
    pub fn lookup(&self, field: &str, value: &Value) -> Option<&str> {
        self.entries.get(&index_key(field, value)).map(String::as_str)
    }

    /// Fails with `IndexedValueNotUnique` if `(field, value)` belongs to a
    /// record other than `id`.
    pub fn check_unique(&self, field: &str, value: &Value, id: &str) -> CoreResult<()> {
        match self.lookup(field, value) {
            Some(owner) if owner != id => Err(CoreError::IndexedValueNotUnique {
                field: field.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Maps `(field, value)` to `id`, returning the previous owner.
    pub fn insert(&mut self, field: &str, value: &Value, id: &str) -> Option<String> {
        self.entries.insert(index_key(field, value), id.to_string())
    }

    /// Removes `(field, value)` if it currently maps to `id`.
    ///
    /// Returns whether an entry was removed.
    pub fn remove_if_owned(&mut self, field: &str, value: &Value, id: &str) -> bool {
        let key = index_key(field, value);
        if self.entries.get(&key).map(String::as_str) == Some(id) {
            self.entries.remove(&key);
            true
        } else {
            false
        }
    }

    /// Removes every entry pointing at `id`. Returns the number removed.
    pub fn remove_id(&mut self, id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, owner| owner != id);
        before - self.entries.len()
    }

    /// Iterates over `(composite key, id)` pairs in arbitrary order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> IndexTable {
        IndexTable::new(vec!["email".into(), "name".into()])
    }

    #[test]
    fn insert_and_lookup() {
        let mut table = table();
        table.insert("email", &Value::from("a@x"), "1");

        assert_eq!(table.lookup("email", &Value::from("a@x")), Some("1"));
        assert_eq!(table.lookup("email", &Value::from("b@x")), None);
        assert_eq!(table.lookup("name", &Value::from("a@x")), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn unique_check_allows_same_owner() {
        let mut table = table();
        table.insert("email", &Value::from("a@x"), "1");

        table.check_unique("email", &Value::from("a@x"), "1").unwrap();
        table.check_unique("email", &Value::from("b@x"), "2").unwrap();

        let err = table
            .check_unique("email", &Value::from("a@x"), "2")
            .unwrap_err();
        assert!(matches!(err, CoreError::IndexedValueNotUnique { field } if field == "email"));
    }

    #[test]
    fn remove_if_owned_ignores_other_owners() {
        let mut table = table();
        table.insert("email", &Value::from("a@x"), "1");

        assert!(!table.remove_if_owned("email", &Value::from("a@x"), "2"));
        assert!(table.remove_if_owned("email", &Value::from("a@x"), "1"));
        assert!(table.is_empty());
    }

    #[test]
    fn remove_id_clears_all_fields() {
        let mut table = table();
        table.insert("email", &Value::from("a@x"), "1");
        table.insert("name", &Value::from("Ann"), "1");
        table.insert("email", &Value::from("b@x"), "2");

        assert_eq!(table.remove_id("1"), 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("email", &Value::from("b@x")), Some("2"));
    }

    #[test]
    fn from_entries_preserves_keys() {
        let table = IndexTable::from_entries(
            vec!["email".into()],
            vec![("email:a@x".to_string(), "1".to_string())],
        );
        assert_eq!(table.fields(), ["email".to_string()]);
        assert_eq!(table.lookup("email", &Value::from("a@x")), Some("1"));
    }
}
