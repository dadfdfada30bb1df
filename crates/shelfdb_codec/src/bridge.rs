//! Conversion between typed serde values and [`Value`].
//!
//! Conversions go through `ciborium`'s value model, which can both
//! serialize and deserialize arbitrary serde types without touching bytes.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Converts a serializable value into its dynamic form.
///
/// # Errors
///
/// Returns [`CodecError::Conversion`] if the value cannot be serialized.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> CodecResult<Value> {
    ciborium::Value::serialized(value)
        .and_then(|raw| raw.deserialized::<Value>())
        .map_err(|e| CodecError::conversion(e.to_string()))
}

/// Converts a dynamic value back into a typed value.
///
/// # Errors
///
/// Returns [`CodecError::Conversion`] if the value does not have the
/// shape `T` expects.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> CodecResult<T> {
    ciborium::Value::serialized(value)
        .and_then(|raw| raw.deserialized::<T>())
        .map_err(|e| CodecError::conversion(e.to_string()))
}
