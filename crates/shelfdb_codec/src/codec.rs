//! Pluggable byte codecs.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A serialize/deserialize pair for [`Value`]s.
///
/// Collections are agnostic to the byte format: records and index tables
/// are converted to `Value` first and handed to the configured codec.
/// The trait is object safe so a store can hold `Arc<dyn Codec>`.
pub trait Codec: Send + Sync + fmt::Debug {
    /// Short, stable name of the format (e.g. `"cbor"`).
    fn name(&self) -> &'static str;

    /// Encodes a value to bytes.
    fn encode(&self, value: &Value) -> CodecResult<Vec<u8>>;

    /// Decodes bytes back into a value.
    fn decode(&self, bytes: &[u8]) -> CodecResult<Value>;

    /// One-time registration of a record shape.
    ///
    /// Formats that need to know record types up front can hook in here.
    /// Collections call this with the record's type name before first use.
    fn register(&self, _shape: &str) -> CodecResult<()> {
        Ok(())
    }
}

/// CBOR codec backed by `ciborium`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl Codec for CborCodec {
    fn name(&self) -> &'static str {
        "cbor"
    }

    fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| CodecError::encoding_failed(self.name(), e.to_string()))?;
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Value> {
        ciborium::from_reader(bytes)
            .map_err(|e| CodecError::decoding_failed(self.name(), e.to_string()))
    }
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Creates a compact JSON codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a JSON codec that writes indented output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    /// Fails on maps with non-text keys. JSON would quote them and they
    /// could not be decoded back into their original type.
    fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
        if let Some(key) = non_text_key(value) {
            return Err(CodecError::encoding_failed(
                self.name(),
                format!("map key {key} is {}, JSON keys must be text", key.kind()),
            ));
        }
        let result = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        result.map_err(|e| CodecError::encoding_failed(self.name(), e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Value> {
        serde_json::from_slice(bytes)
            .map_err(|e| CodecError::decoding_failed(self.name(), e.to_string()))
    }
}

/// Finds the first map key anywhere in `value` that is not text.
fn non_text_key(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(non_text_key),
        Value::Map(pairs) => pairs.iter().find_map(|(k, v)| match k {
            Value::Text(_) => non_text_key(v),
            other => Some(other),
        }),
        _ => None,
    }
}

/// MessagePack codec backed by `rmp-serde`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgpackCodec;

impl Codec for MsgpackCodec {
    fn name(&self) -> &'static str {
        "msgpack"
    }

    fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
        rmp_serde::to_vec(value)
            .map_err(|e| CodecError::encoding_failed(self.name(), e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Value> {
        rmp_serde::from_slice(bytes)
            .map_err(|e| CodecError::decoding_failed(self.name(), e.to_string()))
    }
}

/// Looks up a built-in codec by name.
///
/// Accepts `cbor`, `json` and `msgpack` (also `messagepack`).
pub fn codec_by_name(name: &str) -> Option<Arc<dyn Codec>> {
    match name.to_ascii_lowercase().as_str() {
        "cbor" => Some(Arc::new(CborCodec)),
        "json" => Some(Arc::new(JsonCodec::new())),
        "msgpack" | "messagepack" => Some(Arc::new(MsgpackCodec)),
        _ => None,
    }
}
