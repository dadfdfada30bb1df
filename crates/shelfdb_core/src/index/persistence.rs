//! Index persistence for saving/loading the index table to/from disk.
//!
//! ## Format
//!
//! The index file holds the collection codec's encoding of:
//! ```text
//! IndexFile {
//!     indexed_fields: [string]
//!     indexes: { "<field>:<value>" -> id }
//! }
//! ```
//!
//! ## Invariants
//!
//! - Index state **MUST** be derivable from the record files
//! - The file is rewritten in full after every mutation
//! - Entries are written in key order so identical tables encode identically

use crate::error::{CoreError, CoreResult};
use crate::index::IndexTable;
use serde::{Deserialize, Serialize};
use shelfdb_codec::{from_value, to_value, Codec};
use std::collections::BTreeMap;

/// On-disk shape of an index file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    #[serde(default)]
    indexed_fields: Vec<String>,
    #[serde(default)]
    indexes: BTreeMap<String, String>,
}

/// Encodes an index table with the given codec.
pub fn encode_index(table: &IndexTable, codec: &dyn Codec) -> CoreResult<Vec<u8>> {
    let file = IndexFile {
        indexed_fields: table.fields().to_vec(),
        indexes: table
            .entries()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    };

    let value = to_value(&file).map_err(|e| CoreError::codec("encoding indexes", e))?;
    codec
        .encode(&value)
        .map_err(|e| CoreError::codec("encoding indexes", e))
}

/// Decodes an index table previously written by [`encode_index`].
pub fn decode_index(bytes: &[u8], codec: &dyn Codec) -> CoreResult<IndexTable> {
    let value = codec
        .decode(bytes)
        .map_err(|e| CoreError::codec("decoding indexes", e))?;
    let file: IndexFile =
        from_value(&value).map_err(|e| CoreError::codec("decoding indexes", e))?;

    Ok(IndexTable::from_entries(file.indexed_fields, file.indexes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfdb_codec::{CborCodec, JsonCodec, MsgpackCodec, Value};

    fn sample() -> IndexTable {
        let mut table = IndexTable::new(vec!["email".into(), "age".into()]);
        table.insert("email", &Value::from("a@x"), "1");
        table.insert("email", &Value::from("b@x"), "2");
        table.insert("age", &Value::from(30), "1");
        table
    }

    #[test]
    fn persist_and_restore() {
        let codecs: [&dyn Codec; 3] = [&CborCodec, &JsonCodec::new(), &MsgpackCodec];
        for codec in codecs {
            let bytes = encode_index(&sample(), codec).unwrap();
            let restored = decode_index(&bytes, codec).unwrap();
            assert_eq!(restored, sample(), "codec {}", codec.name());
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = encode_index(&sample(), &CborCodec).unwrap();
        let b = encode_index(&sample(), &CborCodec).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn json_layout_is_readable() {
        let bytes = encode_index(&sample(), &JsonCodec::new()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"indexed_fields\":[\"email\",\"age\"]"));
        assert!(text.contains("\"email:a@x\":\"1\""));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let bytes = br#"{"indexed_fields":["email"]}"#;
        let table = decode_index(bytes, &JsonCodec::new()).unwrap();
        assert_eq!(table.fields(), ["email".to_string()]);
        assert!(table.is_empty());
    }

    #[test]
    fn corrupt_file_reports_context() {
        let err = decode_index(b"not an index", &JsonCodec::new()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Codec {
                context: "decoding indexes",
                ..
            }
        ));
    }
}
