//! Dump command implementation.

use crate::commands::open_collection;
use shelfdb_core::Store;
use tracing::warn;

/// Runs the dump command, printing one `<id>\t<json>` line per record.
pub fn run(store: &Store, collection: &str, limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    for line in dump(store, collection, limit)? {
        println!("{line}");
    }
    Ok(())
}

/// Renders the records of a collection in id order.
///
/// Records that fail to load are logged and skipped.
pub fn dump(
    store: &Store,
    collection: &str,
    limit: Option<usize>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let records = open_collection(store, collection)?;
    let limit = limit.unwrap_or(usize::MAX);

    let mut lines = Vec::new();
    for id in records.ids()? {
        if lines.len() >= limit {
            break;
        }
        match records.get(&id) {
            Ok(record) => lines.push(format!("{id}\t{}", serde_json::to_string(&record)?)),
            Err(e) => warn!(collection, id = %id, error = %e, "skipping record"),
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::seeded_store;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn dumps_records_as_json() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);

        let lines = dump(&store, "users", None).unwrap();
        assert_eq!(
            lines,
            vec![
                "1\t{\"id\":\"1\",\"email\":\"a@x\"}",
                "2\t{\"id\":\"2\",\"email\":\"b@x\"}",
            ]
        );
    }

    #[test]
    fn respects_limit_and_skips_corrupt_records() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);
        fs::write(store.path().join("users/0.sds"), b"").unwrap();

        let lines = dump(&store, "users", Some(1)).unwrap();
        assert_eq!(lines, vec!["1\t{\"id\":\"1\",\"email\":\"a@x\"}"]);
    }
}
